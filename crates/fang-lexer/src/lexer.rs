//! Core Fang lexer: converts source text to a token stream.
//!
//! - `//` line comments and `/* */` block comments are skipped
//! - statements are `;`-terminated, so whitespace including newlines is
//!   insignificant
//! - error recovery: a bad lexeme is reported and skipped, collecting up to
//!   [`fang_types::MAX_ERRORS`] errors

use fang_types::{CompileErrors, ErrorCode, FangError, SourceFile, Span};

use crate::token::{Token, TokenKind};

/// The Fang lexer.
pub struct Lexer<'src> {
    source: &'src [u8],
    source_file: &'src SourceFile,
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    errors: CompileErrors,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: CompileErrors::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        while !self.errors.is_full() {
            match self.scan_token() {
                Some(token) => tokens.push(token),
                None => break,
            }
        }
        tokens.push(Token::new(TokenKind::Eof, self.current_span()));

        tracing::trace!(
            file = %self.source_file.name,
            tokens = tokens.len(),
            errors = self.errors.total_errors,
            "lexed"
        );
        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn text_from(&self, start: usize) -> &'src str {
        std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("")
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = FangError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip whitespace and comments until the next lexeme or EOF.
    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b' ' | b'\t' | b'\r' | b'\n'), _) => {
                    self.advance();
                }
                (Some(b'/'), Some(b'/')) => {
                    while self.peek().is_some_and(|ch| ch != b'\n') {
                        self.advance();
                    }
                }
                (Some(b'/'), Some(b'*')) => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let (start_line, start_col) = (self.line, self.col);
        self.advance();
        self.advance();
        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_COMMENT,
                        "Unterminated block comment",
                        span,
                    );
                    return;
                }
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.advance();
                    self.advance();
                    return;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan one token. `None` at end of input.
    fn scan_token(&mut self) -> Option<Token> {
        loop {
            self.skip_trivia();
            let start = self.pos;
            let (start_line, start_col) = (self.line, self.col);
            let ch = self.advance()?;

            let kind = match ch {
                b'"' => self.scan_string(start_line, start_col),
                b'0'..=b'9' => self.scan_number(start, start_line, start_col),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => Some(self.scan_identifier(start)),

                b'+' => Some(self.with_eq(TokenKind::Plus, TokenKind::PlusEq)),
                b'-' => Some(self.with_eq(TokenKind::Minus, TokenKind::MinusEq)),
                b'*' => Some(self.with_eq(TokenKind::Star, TokenKind::StarEq)),
                b'/' => Some(self.with_eq(TokenKind::Slash, TokenKind::SlashEq)),
                b'=' => Some(self.with_eq(TokenKind::Eq, TokenKind::EqEq)),
                b'<' => Some(self.with_eq(TokenKind::Less, TokenKind::LessEq)),
                b'>' => Some(self.with_eq(TokenKind::Greater, TokenKind::GreaterEq)),
                b'!' if self.eat(b'=') => Some(TokenKind::BangEq),
                b'&' if self.eat(b'&') => Some(TokenKind::AmpAmp),
                b'|' if self.eat(b'|') => Some(TokenKind::PipePipe),

                b'(' => Some(TokenKind::LParen),
                b')' => Some(TokenKind::RParen),
                b'{' => Some(TokenKind::LBrace),
                b'}' => Some(TokenKind::RBrace),
                b';' => Some(TokenKind::Semicolon),
                b',' => Some(TokenKind::Comma),
                b'.' => Some(TokenKind::Dot),

                _ => {
                    // Swallow the rest of a multi-byte character.
                    while self.peek().is_some_and(|b| b & 0xC0 == 0x80) {
                        self.advance();
                    }
                    let span = self.span_from(start_line, start_col);
                    let text = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
                    self.emit_error(
                        ErrorCode::UNKNOWN_CHARACTER,
                        format!("Unknown character '{text}'"),
                        span,
                    );
                    None
                }
            };

            if let Some(kind) = kind {
                return Some(Token::new(kind, self.span_from(start_line, start_col)));
            }
            if self.errors.is_full() {
                return None;
            }
        }
    }

    /// `op` or `op=` depending on the next byte.
    fn with_eq(&mut self, bare: TokenKind, with_eq: TokenKind) -> TokenKind {
        if self.eat(b'=') {
            with_eq
        } else {
            bare
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self, start: usize, start_line: u32, start_col: u32) -> Option<TokenKind> {
        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }

        let mut is_float = false;
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            is_float = true;
            self.advance();
            while let Some(b'0'..=b'9') = self.peek() {
                self.advance();
            }
        }
        let digits_end = self.pos;

        // `f` suffix, unless it starts a longer word like `2foo`.
        if self.peek() == Some(b'f') && !matches!(self.peek_at(1), Some(ch) if is_ident_byte(ch))
        {
            is_float = true;
            self.advance();
        }

        if self.peek().is_some_and(is_ident_byte) {
            while self.peek().is_some_and(is_ident_byte) {
                self.advance();
            }
            let span = self.span_from(start_line, start_col);
            self.emit_error(
                ErrorCode::DIGIT_LEADING_IDENTIFIER,
                format!(
                    "This identifier should not start with a digit: '{}'",
                    self.text_from(start)
                ),
                span,
            );
            return None;
        }

        let text = std::str::from_utf8(&self.source[start..digits_end]).unwrap_or("0");
        let kind = if is_float {
            text.parse().ok().map(TokenKind::FloatLit)
        } else {
            text.parse().ok().map(TokenKind::IntLit)
        };
        if kind.is_none() {
            let span = self.span_from(start_line, start_col);
            self.emit_error(
                ErrorCode::INVALID_NUMBER,
                format!("Number literal '{text}' is out of range"),
                span,
            );
        }
        kind
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        while self.peek().is_some_and(is_ident_byte) {
            self.advance();
        }
        let text = self.text_from(start);
        TokenKind::from_keyword(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()))
    }

    // ─────────────────────────────────────────────────────────────
    // String literals
    // ─────────────────────────────────────────────────────────────

    /// Scan a string literal after the opening `"`.
    fn scan_string(&mut self, start_line: u32, start_col: u32) -> Option<TokenKind> {
        let mut buf = Vec::new();
        let mut valid = true;

        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_STRING,
                        "Unterminated string literal",
                        span,
                    );
                    return None;
                }
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(b'\\') => match self.scan_escape_sequence() {
                    Some(escaped) => buf.push(escaped),
                    None => valid = false,
                },
                Some(ch) => {
                    self.advance();
                    buf.push(ch);
                }
            }
        }

        valid.then(|| TokenKind::StringLit(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Resolve the escape at the cursor. `None` after reporting an error.
    fn scan_escape_sequence(&mut self) -> Option<u8> {
        let (start_line, start_col) = (self.line, self.col);
        self.advance();

        match self.advance() {
            Some(b'n') => Some(b'\n'),
            Some(b't') => Some(b'\t'),
            Some(b'r') => Some(b'\r'),
            Some(b'"') => Some(b'"'),
            Some(b'\\') => Some(b'\\'),
            Some(ch) => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::INVALID_ESCAPE,
                    format!("Invalid escape sequence '\\{}'", ch as char),
                    span,
                );
                None
            }
            None => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::ESCAPE_AT_EOF,
                    "Escape sequence at end of file",
                    span,
                );
                None
            }
        }
    }
}

fn is_ident_byte(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}
