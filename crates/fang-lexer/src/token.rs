//! Token types for the Fang lexer.

use fang_types::Span;
use std::fmt;

/// Reserved words. None of them can name a variable or function.
pub const ALL_KEYWORDS: &[&str] = &[
    "var", "const", "if", "else", "for", "while", "function", "return", "break", "continue",
    "true", "false",
];

/// A token with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────
    /// `42`
    IntLit(i64),
    /// `1.5`, `2f`
    FloatLit(f64),
    /// `"text"` with escapes resolved.
    StringLit(String),

    Identifier(String),

    // ── Keywords ──────────────────────────────────────────────
    Var,
    Const,
    If,
    Else,
    For,
    While,
    Function,
    Return,
    Break,
    Continue,
    True,
    False,

    // ── Operators ─────────────────────────────────────────────
    Plus,
    Minus,
    Star,
    Slash,
    /// `=`
    Eq,
    /// `==`
    EqEq,
    /// `!=`
    BangEq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,

    // ── Punctuation ───────────────────────────────────────────
    LParen,
    RParen,
    LBrace,
    RBrace,
    Semicolon,
    Comma,
    Dot,

    Eof,
}

impl TokenKind {
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        let kind = match s {
            "var" => TokenKind::Var,
            "const" => TokenKind::Const,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "while" => TokenKind::While,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Var
                | TokenKind::Const
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Function
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::True
                | TokenKind::False
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::IntLit(n) => return write!(f, "{n}"),
            TokenKind::FloatLit(n) => return write!(f, "{n:?}"),
            TokenKind::StringLit(s) => return write!(f, "\"{s}\""),
            TokenKind::Identifier(name) => return f.write_str(name),

            TokenKind::Var => "var",
            TokenKind::Const => "const",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::While => "while",
            TokenKind::Function => "function",
            TokenKind::Return => "return",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::True => "true",
            TokenKind::False => "false",

            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::BangEq => "!=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::Less => "<",
            TokenKind::LessEq => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEq => ">=",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",

            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",

            TokenKind::Eof => "end of file",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keyword_round_trips_through_display() {
        for &kw in ALL_KEYWORDS {
            let kind = TokenKind::from_keyword(kw).unwrap();
            assert!(kind.is_keyword());
            assert_eq!(kind.to_string(), kw);
        }
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(TokenKind::from_keyword("Var"), None);
        assert_eq!(TokenKind::from_keyword("FUNCTION"), None);
        assert_eq!(TokenKind::from_keyword("int"), None);
    }

    #[test]
    fn test_display_literals() {
        assert_eq!(TokenKind::IntLit(7).to_string(), "7");
        assert_eq!(TokenKind::FloatLit(2.0).to_string(), "2.0");
        assert_eq!(TokenKind::StringLit("hi".into()).to_string(), "\"hi\"");
        assert_eq!(TokenKind::Identifier("x".into()).to_string(), "x");
        assert_eq!(TokenKind::PlusEq.to_string(), "+=");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }
}
