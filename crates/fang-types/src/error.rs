use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostics kept per phase; later ones are only counted.
pub const MAX_ERRORS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Phase that produced a diagnostic, derived from its code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Lexical,
    Syntax,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical"),
            Self::Syntax => write!(f, "syntax"),
        }
    }
}

/// Numeric diagnostic code (E100–E299).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Lexical errors (E100–E199) ──
    pub const UNKNOWN_CHARACTER: Self = Self(100);
    pub const INVALID_ESCAPE: Self = Self(101);
    pub const ESCAPE_AT_EOF: Self = Self(102);
    pub const UNTERMINATED_STRING: Self = Self(103);
    pub const DIGIT_LEADING_IDENTIFIER: Self = Self(104);
    pub const UNTERMINATED_COMMENT: Self = Self(105);
    pub const INVALID_NUMBER: Self = Self(106);

    // ── Syntax errors (E200–E299) ──
    pub const UNEXPECTED_TOKEN: Self = Self(200);
    pub const UNEXPECTED_EOF: Self = Self(201);
    pub const EXPECTED_SEMICOLON: Self = Self(202);
    pub const EXPECTED_CLOSING_PAREN: Self = Self(203);
    pub const EXPECTED_IDENTIFIER: Self = Self(204);
    pub const INVALID_ASSIGNMENT_TARGET: Self = Self(205);

    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Lexical,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A positioned lexer or parser diagnostic.
///
/// Serializes flat, with the span fields inlined, so hosts can forward it
/// as JSON without reshaping.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("{span}: {code} [{category}] {message}")]
pub struct FangError {
    pub file: String,
    pub code: ErrorCode,
    pub severity: Severity,
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The source line the span starts on.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl FangError {
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Diagnostics collected by one phase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<FangError>,
    pub warnings: Vec<FangError>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl CompileErrors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// True once the error cap is reached and the phase should stop.
    pub fn is_full(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }

    pub fn push_error(&mut self, error: FangError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    pub fn push_warning(&mut self, warning: FangError) {
        self.warnings.push(warning);
        self.total_warnings += 1;
    }

    /// Append another phase's diagnostics, keeping the cap.
    pub fn extend(&mut self, other: CompileErrors) {
        let dropped = other.total_errors - other.errors.len();
        for error in other.errors {
            self.push_error(error);
        }
        self.total_errors += dropped;
        for warning in other.warnings {
            self.push_warning(warning);
        }
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {error}", error.file)?;
        }
        if self.total_errors > self.errors.len() {
            write!(
                f,
                "\n... and {} more",
                self.total_errors - self.errors.len()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(code: ErrorCode) -> FangError {
        FangError::new(
            "main.fang",
            code,
            "expected ';'",
            Span::new(3, 10, 3, 11),
            "var x = 1",
        )
    }

    #[test]
    fn test_code_ranges() {
        assert_eq!(
            ErrorCode::INVALID_ESCAPE.category(),
            ErrorCategory::Lexical
        );
        assert_eq!(
            ErrorCode::EXPECTED_SEMICOLON.category(),
            ErrorCategory::Syntax
        );
        assert_eq!(ErrorCode::EXPECTED_SEMICOLON.to_string(), "E202");
    }

    #[test]
    fn test_error_display() {
        let err = sample(ErrorCode::EXPECTED_SEMICOLON);
        assert_eq!(err.to_string(), "3:10: E202 [syntax] expected ';'");
    }

    #[test]
    fn test_error_json_is_flat() {
        let err = sample(ErrorCode::EXPECTED_SEMICOLON).with_suggestion("add ';'");
        let json: serde_json::Value = serde_json::to_value(&err).unwrap();
        assert_eq!(json["line"], 3);
        assert_eq!(json["column"], 10);
        assert_eq!(json["end_column"], 11);
        assert_eq!(json["category"], "syntax");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["suggestion"], "add ';'");

        let back: FangError = serde_json::from_value(json).unwrap();
        assert_eq!(back.span, err.span);
    }

    #[test]
    fn test_suggestion_omitted_when_absent() {
        let json = serde_json::to_string(&sample(ErrorCode::UNEXPECTED_EOF)).unwrap();
        assert!(!json.contains("suggestion"));
    }

    #[test]
    fn test_cap_counts_everything() {
        let mut errs = CompileErrors::empty();
        for _ in 0..MAX_ERRORS + 4 {
            errs.push_error(sample(ErrorCode::UNKNOWN_CHARACTER));
        }
        assert!(errs.is_full());
        assert_eq!(errs.errors.len(), MAX_ERRORS);
        assert_eq!(errs.total_errors, MAX_ERRORS + 4);
        assert!(errs.to_string().ends_with("... and 4 more"));
    }

    #[test]
    fn test_extend_keeps_totals() {
        let mut lex = CompileErrors::empty();
        lex.push_error(sample(ErrorCode::UNKNOWN_CHARACTER));
        let mut parse = CompileErrors::empty();
        parse.push_error(sample(ErrorCode::UNEXPECTED_TOKEN));
        parse.push_error(sample(ErrorCode::EXPECTED_SEMICOLON));
        lex.extend(parse);
        assert_eq!(lex.total_errors, 3);
        assert_eq!(lex.errors[2].code, ErrorCode::EXPECTED_SEMICOLON);
    }
}
