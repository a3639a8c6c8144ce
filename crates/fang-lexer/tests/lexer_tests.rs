//! Lexer tests: keywords, operators, literals, comments, positions and
//! error recovery.

use fang_lexer::{Lexer, TokenKind};
use fang_types::{ErrorCode, SourceFile, Span};
use pretty_assertions::assert_eq;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return the token kinds without the final Eof.
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.fang", source);
    let result = Lexer::new(&sf).lex();
    result
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    let sf = SourceFile::new("test.fang", source);
    Lexer::new(&sf)
        .lex()
        .errors
        .errors
        .into_iter()
        .map(|e| e.code)
        .collect()
}

fn first_error(source: &str) -> String {
    let sf = SourceFile::new("test.fang", source);
    let result = Lexer::new(&sf).lex();
    result
        .errors
        .errors
        .first()
        .map(|e| e.message.clone())
        .unwrap_or_default()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

// ─────────────────────────────────────────────────────────────────────
// Keywords & identifiers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_declaration_statement() {
    assert_eq!(
        kinds("var x = 3;"),
        vec![
            TokenKind::Var,
            ident("x"),
            TokenKind::Eq,
            TokenKind::IntLit(3),
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_control_keywords() {
    assert_eq!(
        kinds("if else for while return break continue function const true false"),
        vec![
            TokenKind::If,
            TokenKind::Else,
            TokenKind::For,
            TokenKind::While,
            TokenKind::Return,
            TokenKind::Break,
            TokenKind::Continue,
            TokenKind::Function,
            TokenKind::Const,
            TokenKind::True,
            TokenKind::False,
        ]
    );
}

#[test]
fn test_type_names_are_plain_identifiers() {
    assert_eq!(
        kinds("int uint float string"),
        vec![ident("int"), ident("uint"), ident("float"), ident("string")]
    );
}

#[test]
fn test_identifiers_with_underscores_and_digits() {
    assert_eq!(
        kinds("_tmp point_2d __to_string"),
        vec![ident("_tmp"), ident("point_2d"), ident("__to_string")]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Operators & punctuation
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_operator_tokens() {
    assert_eq!(
        kinds("+ - * / = == != += -= *= /= < <= > >= && ||"),
        vec![
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Eq,
            TokenKind::EqEq,
            TokenKind::BangEq,
            TokenKind::PlusEq,
            TokenKind::MinusEq,
            TokenKind::StarEq,
            TokenKind::SlashEq,
            TokenKind::Less,
            TokenKind::LessEq,
            TokenKind::Greater,
            TokenKind::GreaterEq,
            TokenKind::AmpAmp,
            TokenKind::PipePipe,
        ]
    );
}

#[test]
fn test_punctuation_tokens() {
    assert_eq!(
        kinds("( ) { } ; , ."),
        vec![
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::Semicolon,
            TokenKind::Comma,
            TokenKind::Dot,
        ]
    );
}

#[test]
fn test_operators_without_spaces() {
    assert_eq!(
        kinds("i+=1;"),
        vec![
            ident("i"),
            TokenKind::PlusEq,
            TokenKind::IntLit(1),
            TokenKind::Semicolon,
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Number literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_integer_and_float_literals() {
    assert_eq!(
        kinds("0 42 1.5 2f 0.25f"),
        vec![
            TokenKind::IntLit(0),
            TokenKind::IntLit(42),
            TokenKind::FloatLit(1.5),
            TokenKind::FloatLit(2.0),
            TokenKind::FloatLit(0.25),
        ]
    );
}

#[test]
fn test_member_access_on_number_is_not_a_fraction() {
    assert_eq!(
        kinds("1.length"),
        vec![TokenKind::IntLit(1), TokenKind::Dot, ident("length")]
    );
}

#[test]
fn test_identifier_starting_with_digit_is_rejected() {
    assert_eq!(
        error_codes("var 3d = 1;"),
        vec![ErrorCode::DIGIT_LEADING_IDENTIFIER]
    );
    assert!(first_error("2foo").contains("should not start with a digit"));
}

#[test]
fn test_integer_out_of_range() {
    assert_eq!(
        error_codes("99999999999999999999"),
        vec![ErrorCode::INVALID_NUMBER]
    );
}

// ─────────────────────────────────────────────────────────────────────
// String literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_plain_string() {
    assert_eq!(
        kinds(r#""hello world""#),
        vec![TokenKind::StringLit("hello world".into())]
    );
}

#[test]
fn test_string_escape_sequences() {
    assert_eq!(
        kinds(r#""a\nb\tc\"d\\""#),
        vec![TokenKind::StringLit("a\nb\tc\"d\\".into())]
    );
}

#[test]
fn test_invalid_escape_is_reported() {
    assert_eq!(error_codes(r#""bad \q""#), vec![ErrorCode::INVALID_ESCAPE]);
    assert_eq!(first_error(r#""bad \q""#), "Invalid escape sequence '\\q'");
}

#[test]
fn test_escape_at_end_of_file() {
    let codes = error_codes("\"abc\\");
    assert_eq!(codes[0], ErrorCode::ESCAPE_AT_EOF);
}

#[test]
fn test_unterminated_string() {
    assert_eq!(
        error_codes("\"never closed"),
        vec![ErrorCode::UNTERMINATED_STRING]
    );
}

#[test]
fn test_non_ascii_string_content() {
    assert_eq!(
        kinds("\"héllo\""),
        vec![TokenKind::StringLit("héllo".into())]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Comments
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_line_comment_skipped() {
    assert_eq!(
        kinds("x; // trailing\ny;"),
        vec![
            ident("x"),
            TokenKind::Semicolon,
            ident("y"),
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_block_comment_skipped() {
    assert_eq!(
        kinds("a /* one\n two */ b"),
        vec![ident("a"), ident("b")]
    );
}

#[test]
fn test_unterminated_block_comment() {
    assert_eq!(
        error_codes("a /* open"),
        vec![ErrorCode::UNTERMINATED_COMMENT]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Positions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_token_spans() {
    let sf = SourceFile::new("test.fang", "var x\n  = 10;");
    let tokens = Lexer::new(&sf).lex().tokens;
    assert_eq!(tokens[0].span, Span::new(1, 1, 1, 3));
    assert_eq!(tokens[1].span, Span::new(1, 5, 1, 5));
    assert_eq!(tokens[2].span, Span::new(2, 3, 2, 3));
    assert_eq!(tokens[3].span, Span::new(2, 5, 2, 6));
    assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
}

// ─────────────────────────────────────────────────────────────────────
// Error recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_character_is_skipped() {
    let sf = SourceFile::new("test.fang", "x # y");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.total_errors, 1);
    assert_eq!(result.errors.errors[0].message, "Unknown character '#'");
    assert_eq!(result.errors.errors[0].span, Span::new(1, 3, 1, 3));
    let kinds: Vec<_> = result.tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![ident("x"), ident("y"), TokenKind::Eof]);
}

#[test]
fn test_lone_bang_and_ampersand_are_unknown() {
    assert_eq!(
        error_codes("!a & b"),
        vec![ErrorCode::UNKNOWN_CHARACTER, ErrorCode::UNKNOWN_CHARACTER]
    );
}

#[test]
fn test_error_cap() {
    let source = "#".repeat(50);
    let sf = SourceFile::new("test.fang", source);
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.errors.len(), fang_types::MAX_ERRORS);
    assert_eq!(result.tokens.last().unwrap().kind, TokenKind::Eof);
}

#[test]
fn test_empty_source() {
    assert!(kinds("").is_empty());
    assert!(kinds("  \n\t// only a comment").is_empty());
}
