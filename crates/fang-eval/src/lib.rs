//! Fang tree-walking interpreter.
//!
//! Evaluates the AST produced by `fang-parser` over dynamically typed
//! [`Value`] handles. Hosts register types, functions, casts and a string
//! factory on an [`Interpreter`], then run scripts against it:
//!
//! ```no_run
//! use fang_eval::{Interpreter, Script};
//!
//! let mut interp = Interpreter::with_prelude();
//! let mut script = Script::new("hello.fang", "print(\"hello\", 1 + 2);");
//! script.run(&mut interp).unwrap();
//! assert_eq!(interp.take_output(), vec!["hello 3"]);
//! ```

pub mod arithmetic;
mod builtins;
pub mod callable;
pub mod cast;
pub mod error;
pub mod interpreter;
pub mod object;
pub mod script;
pub mod symbols;
pub mod type_info;
pub mod value;

pub use arithmetic::{ArithmeticKind, Scalar};
pub use callable::{Callable, CallableOverloader, FromValue, IntoValue};
pub use cast::CastList;
pub use error::{EvalError, EvalResult};
pub use interpreter::{Interpreter, Signal};
pub use object::{Behavior, Behaviors, Object};
pub use script::{run, Script, ScriptError};
pub use symbols::SymbolTable;
pub use type_info::TypeInfo;
pub use value::Value;
