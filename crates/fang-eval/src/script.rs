//! Source-to-result pipeline: lex, parse, interpret.

use fang_lexer::Lexer;
use fang_parser::Parser;
use fang_types::ast::Node;
use fang_types::{CompileErrors, SourceFile};

use crate::error::EvalError;
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Anything that can stop a script from producing a value.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("{0}")]
    Compile(CompileErrors),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl ScriptError {
    /// Compile diagnostics as a JSON array; runtime errors as a one-element
    /// array holding the message.
    pub fn to_json(&self) -> String {
        match self {
            Self::Compile(errors) => {
                serde_json::to_string(&errors.errors).unwrap_or_else(|_| "[]".to_string())
            }
            Self::Eval(err) => serde_json::json!([{ "message": err.to_string() }]).to_string(),
        }
    }
}

/// A named source file and, once compiled, its syntax tree.
pub struct Script {
    source: SourceFile,
    program: Option<Node>,
}

impl Script {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            source: SourceFile::new(name, source),
            program: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.source.name
    }

    /// Lex and parse. The tree is cached, so compiling twice is free.
    pub fn compile(&mut self) -> Result<&Node, CompileErrors> {
        if self.program.is_none() {
            self.program = Some(self.build()?);
        }
        self.program.as_ref().ok_or_else(CompileErrors::empty)
    }

    fn build(&self) -> Result<Node, CompileErrors> {
        let lexed = Lexer::new(&self.source).lex();
        if lexed.errors.has_errors() {
            tracing::debug!(file = %self.source.name, errors = lexed.errors.total_errors, "lex failed");
            return Err(lexed.errors);
        }
        let parsed = Parser::new(lexed.tokens, &self.source).parse();
        if parsed.errors.has_errors() {
            tracing::debug!(file = %self.source.name, errors = parsed.errors.total_errors, "parse failed");
            return Err(parsed.errors);
        }
        parsed.program.ok_or_else(CompileErrors::empty)
    }

    /// Compile if needed, then run against `interp`.
    #[tracing::instrument(level = "debug", skip_all, fields(file = %self.source.name))]
    pub fn run(&mut self, interp: &mut Interpreter) -> Result<Value, ScriptError> {
        let program = self.compile().map_err(ScriptError::Compile)?;
        Ok(interp.interpret(program)?)
    }
}

/// Run `source` on a fresh interpreter with the prelude installed.
pub fn run(source: &str) -> Result<Value, ScriptError> {
    let mut interp = Interpreter::with_prelude();
    Script::new("<script>", source).run(&mut interp)
}
