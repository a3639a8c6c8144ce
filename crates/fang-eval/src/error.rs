//! Runtime error types for the Fang interpreter.

/// A fatal evaluation error. Nothing inside the interpreter catches these;
/// they unwind to the host.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("Divide by 0")]
    DivideByZero,

    #[error("Cannot assign to a constant value")]
    ConstAssignment,

    #[error("Variable does not exist: {0}")]
    UndefinedVariable(String),

    /// An Object lacks the behavior an operator or protocol needs.
    #[error("Missing behavior '{behavior}' on {type_name}")]
    MissingBehavior {
        behavior: &'static str,
        type_name: String,
    },

    #[error("Cannot find overload for {name}({args})")]
    NoMatchingOverload { name: String, args: String },

    #[error("Ambiguous call to {name}({args})")]
    AmbiguousCall { name: String, args: String },

    /// A member or behavior name resolved to no callable at all.
    #[error("No function matches '{0}'")]
    NoFunctionMatches(String),

    #[error("Invalid argument count: expected {expected}, got {found}")]
    ArgumentCount { expected: usize, found: usize },

    #[error("Unsupported constant type: {0}")]
    UnsupportedConstant(String),

    #[error("Cannot cast type {from} to {to}")]
    CannotCast { from: String, to: String },

    #[error("Value {value} is out of range for {to}")]
    OutOfRange { value: String, to: &'static str },

    #[error("Cannot copy value of type {0}")]
    CannotCopy(String),

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A declared type name that was never registered with the interpreter.
    #[error("Invalid {role} type: {name}")]
    UnknownType { role: &'static str, name: String },

    #[error("Arithmetic overflow in '{0}'")]
    ArithmeticOverflow(&'static str),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Value of type {0} is not callable")]
    NotCallable(String),

    #[error("No string factory installed")]
    NoStringFactory,

    /// A value's storage was already mutably borrowed further up the stack.
    #[error("Value of type {0} is already borrowed")]
    BorrowConflict(String),

    /// Raised by host functions.
    #[error("{0}")]
    Runtime(String),
}

/// Result alias for interpreter operations.
pub type EvalResult<T> = Result<T, EvalError>;
