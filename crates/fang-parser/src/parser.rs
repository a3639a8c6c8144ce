//! Core parser infrastructure: token cursor, error reporting, helpers.

use fang_lexer::token::{Token, TokenKind};
use fang_types::ast::{Ident, Node, NodeKind};
use fang_types::{CompileErrors, ErrorCode, FangError, SourceFile, Span};

/// The Fang parser.
///
/// Consumes the lexer's token stream and builds one root
/// [`NodeKind::Block`]. Errors are collected and parsing resumes at the
/// next statement boundary.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source_file: &'src SourceFile,
    errors: CompileErrors,
    /// Returned by the cursor once `tokens` is exhausted.
    eof: Token,
}

/// Result of parsing.
pub struct ParseResult {
    /// The root block, absent only if the error cap stopped parsing.
    pub program: Option<Node>,
    pub errors: CompileErrors,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        let eof_span = tokens.last().map(|t| t.span).unwrap_or_default();
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: CompileErrors::empty(),
            eof: Token::new(TokenKind::Eof, eof_span),
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span)
            .unwrap_or_default()
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Consume `expected` or report what was found instead.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check(expected) {
            return Some(self.advance());
        }
        let code = match expected {
            _ if self.at_end() => ErrorCode::UNEXPECTED_EOF,
            TokenKind::Semicolon => ErrorCode::EXPECTED_SEMICOLON,
            TokenKind::RParen => ErrorCode::EXPECTED_CLOSING_PAREN,
            _ => ErrorCode::UNEXPECTED_TOKEN,
        };
        let message = if self.at_end() {
            format!("Unexpected end of file, expected '{expected}'")
        } else {
            format!("Expected '{expected}', got '{}'", self.peek_kind())
        };
        self.error_at_current(code, message);
        None
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            _ => {
                let code = if self.at_end() {
                    ErrorCode::UNEXPECTED_EOF
                } else {
                    ErrorCode::EXPECTED_IDENTIFIER
                };
                self.error_at_current(
                    code,
                    format!("Expected identifier, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// An optional type name: an identifier in a position where one is
    /// allowed but not required.
    pub(crate) fn eat_type_name(&mut self) -> Option<Ident> {
        match self.peek_kind() {
            TokenKind::Identifier(_) => self.expect_identifier(),
            _ => None,
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let error = FangError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(error);
    }

    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.is_full()
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip to the next statement boundary after an error.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::Var
                | TokenKind::Const
                | TokenKind::If
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Function
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::LBrace
                | TokenKind::RBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the whole token stream into a root block.
    pub fn parse(mut self) -> ParseResult {
        let start = self.current_span();
        let mut stmts = Vec::new();
        while !self.at_end() && !self.too_many_errors() {
            let before = self.pos;
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => {
                    self.synchronize();
                    // A stray `}` at top level would otherwise stall here.
                    if self.pos == before {
                        self.advance();
                    }
                }
            }
        }

        let program = (!self.too_many_errors()).then(|| {
            let span = start.merge(self.previous_span());
            Node::new(NodeKind::Block(stmts), span)
        });
        tracing::trace!(
            file = %self.source_file.name,
            errors = self.errors.total_errors,
            "parsed"
        );
        ParseResult {
            program,
            errors: self.errors,
        }
    }
}
