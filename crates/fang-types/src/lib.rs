//! Shared types for Fang.
//!
//! Source spans, lexer and parser diagnostics, and the AST handed from the
//! parser to the interpreter.

mod error;
mod span;
pub mod ast;

pub use error::{CompileErrors, ErrorCategory, ErrorCode, FangError, Severity, MAX_ERRORS};
pub use span::{SourceFile, Span};

/// Result type for single-diagnostic operations.
pub type Result<T> = std::result::Result<T, FangError>;
