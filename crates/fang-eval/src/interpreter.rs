//! Tree-walking interpreter over the Fang AST.

use std::collections::BTreeMap;
use std::rc::Rc;

use fang_types::ast::{FunctionDecl, Ident, IfBranch, Literal, Node, NodeKind, Operator};

use crate::builtins;
use crate::callable::{describe_args, Body, Callable, CallableOverloader};
use crate::cast::CastList;
use crate::error::{EvalError, EvalResult};
use crate::object::{Behavior, Behaviors, Object};
use crate::symbols::SymbolTable;
use crate::type_info::TypeInfo;
use crate::value::Value;

/// How a statement finished. Loops consume `Break` and `Continue`; calls
/// consume `Return`.
#[derive(Debug, Clone)]
pub enum Signal {
    None,
    Return(Value),
    Break,
    Continue,
}

/// Builds the value a string literal evaluates to.
pub type StringFactory = Rc<dyn Fn(String) -> Value>;

/// The evaluator together with everything a host registers into it.
pub struct Interpreter {
    /// Value of the most recent expression statement.
    result: Value,
    symbols: SymbolTable,
    casts: CastList,
    types: BTreeMap<String, TypeInfo>,
    string_factory: Option<StringFactory>,
    /// Lines written by `print`.
    output: Vec<String>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An empty interpreter: no types, no functions, no string factory.
    pub fn new() -> Self {
        Self {
            result: Value::void(),
            symbols: SymbolTable::new(),
            casts: CastList::new(),
            types: BTreeMap::new(),
            string_factory: None,
            output: Vec::new(),
        }
    }

    /// An interpreter with the standard types, string support and `print`.
    pub fn with_prelude() -> Self {
        let mut interp = Self::new();
        builtins::install(&mut interp);
        interp
    }

    // ══════════════════════════════════════════════════════════════════════
    // Host surface
    // ══════════════════════════════════════════════════════════════════════

    pub fn add_type<T: 'static>(&mut self, name: &str) {
        self.add_type_info(name, TypeInfo::create::<T>());
    }

    pub fn add_type_info(&mut self, name: &str, info: TypeInfo) {
        self.types.insert(name.to_string(), info);
    }

    pub fn type_named(&self, name: &str) -> Option<TypeInfo> {
        self.types.get(name).copied()
    }

    /// Bind a global, overload-merging functions of the same name.
    pub fn add(&mut self, name: &str, value: Value) {
        self.symbols.add_global(name, value);
    }

    pub fn add_function(&mut self, name: &str, callable: Callable) {
        self.add(name, Value::new_const(callable));
    }

    pub fn add_cast(
        &mut self,
        to: TypeInfo,
        from: TypeInfo,
        explicit: bool,
        converter: impl Fn(&Value) -> EvalResult<Value> + 'static,
    ) {
        self.casts.add(to, from, explicit, converter);
    }

    pub fn set_string_factory(&mut self, factory: impl Fn(String) -> Value + 'static) {
        tracing::debug!("string factory installed");
        self.string_factory = Some(Rc::new(factory));
    }

    /// Realize `text` through the string factory.
    pub fn string(&self, text: impl Into<String>) -> EvalResult<Value> {
        let factory = self.string_factory.as_ref().ok_or(EvalError::NoStringFactory)?;
        Ok(factory(text.into()))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.symbols.lookup(name).cloned()
    }

    /// Rebind `name` where it is defined, or bind it globally.
    pub fn set(&mut self, name: &str, value: Value) {
        self.symbols.set(name, value);
    }

    /// Mutable global slot, created as void when absent.
    pub fn global(&mut self, name: &str) -> &mut Value {
        self.symbols.global_entry(name)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn casts(&self) -> &CastList {
        &self.casts
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    pub fn write_output(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    // ══════════════════════════════════════════════════════════════════════
    // Entry point
    // ══════════════════════════════════════════════════════════════════════

    /// Run a program and return its completion value: the value of the last
    /// statement, or the operand of a top-level `return`.
    ///
    /// A root block runs directly in the global scope, so its declarations
    /// stay visible to the host and to later programs.
    #[tracing::instrument(level = "debug", skip_all, fields(depth = self.symbols.depth()))]
    pub fn interpret(&mut self, root: &Node) -> EvalResult<Value> {
        let depth = self.symbols.depth();
        self.result = Value::void();
        let outcome = match &root.kind {
            NodeKind::Block(children) => self.exec_sequence(children),
            _ => self.exec(root),
        };
        let result = std::mem::take(&mut self.result);
        self.symbols.truncate(depth);
        match outcome {
            Ok(Signal::Return(value)) => Ok(value),
            Ok(_) => Ok(result),
            Err(err) => {
                tracing::debug!(%err, "evaluation failed");
                Err(err)
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    fn exec(&mut self, node: &Node) -> EvalResult<Signal> {
        match &node.kind {
            NodeKind::Block(children) => self.exec_block(children),
            NodeKind::VariableDecl {
                name,
                is_const,
                type_name,
                initializer,
            } => {
                self.exec_var_decl(&name.name, *is_const, type_name.as_ref(), initializer)?;
                self.result = Value::void();
                Ok(Signal::None)
            }
            NodeKind::If {
                branches,
                else_body,
            } => self.exec_if(branches, else_body.as_deref()),
            NodeKind::For {
                init,
                condition,
                step,
                body,
            } => {
                self.symbols.push_scope();
                let signal = self.exec_for(init, condition, step, body);
                self.symbols.pop_scope();
                signal
            }
            NodeKind::While { condition, body } => self.exec_while(condition, body),
            NodeKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::void(),
                };
                self.result = value.clone();
                Ok(Signal::Return(value))
            }
            NodeKind::Break => Ok(Signal::Break),
            NodeKind::Continue => Ok(Signal::Continue),
            NodeKind::Empty => Ok(Signal::None),
            _ => {
                self.result = self.eval(node)?;
                Ok(Signal::None)
            }
        }
    }

    fn exec_block(&mut self, children: &[Node]) -> EvalResult<Signal> {
        self.symbols.push_scope();
        let signal = self.exec_sequence(children);
        self.symbols.pop_scope();
        signal
    }

    /// Run statements in the current scope until one signals.
    fn exec_sequence(&mut self, children: &[Node]) -> EvalResult<Signal> {
        for child in children {
            self.result = Value::void();
            match self.exec(child)? {
                Signal::None => {}
                signal => return Ok(signal),
            }
        }
        Ok(Signal::None)
    }

    /// Loop bodies get a scope per iteration.
    fn exec_iteration(&mut self, body: &Node) -> EvalResult<Signal> {
        self.symbols.push_scope();
        let signal = self.exec(body);
        self.symbols.pop_scope();
        signal
    }

    fn exec_var_decl(
        &mut self,
        name: &str,
        is_const: bool,
        type_name: Option<&Ident>,
        initializer: &Node,
    ) -> EvalResult<()> {
        let initial = self.eval(initializer)?;
        let mut value = initial.copy(self)?;
        if let Some(type_name) = type_name {
            let declared = self.resolve_type(type_name, "variable")?;
            value = self.cast_declared(&declared, &value)?;
        }
        if is_const {
            value = value.const_value();
        }
        tracing::trace!(name, ty = %value.type_info(), "declare");
        self.symbols.add(name, value);
        Ok(())
    }

    fn exec_if(&mut self, branches: &[IfBranch], else_body: Option<&Node>) -> EvalResult<Signal> {
        for branch in branches {
            if self.condition(&branch.condition)? {
                return self.exec(&branch.body);
            }
        }
        match else_body {
            Some(body) => self.exec(body),
            None => Ok(Signal::None),
        }
    }

    /// Runs inside the header scope pushed by the caller.
    fn exec_for(&mut self, init: &Node, condition: &Node, step: &Node, body: &Node) -> EvalResult<Signal> {
        self.exec(init)?;
        loop {
            if !condition.is_empty() && !self.condition(condition)? {
                break;
            }
            match self.exec_iteration(body)? {
                Signal::Break => break,
                Signal::Return(value) => return Ok(Signal::Return(value)),
                Signal::None | Signal::Continue => {}
            }
            if !step.is_empty() {
                self.eval(step)?;
            }
        }
        Ok(Signal::None)
    }

    fn exec_while(&mut self, condition: &Node, body: &Node) -> EvalResult<Signal> {
        while self.condition(condition)? {
            match self.exec_iteration(body)? {
                Signal::Break => break,
                Signal::Return(value) => return Ok(Signal::Return(value)),
                Signal::None | Signal::Continue => {}
            }
        }
        Ok(Signal::None)
    }

    /// Evaluate `node` and cast it to bool.
    fn condition(&mut self, node: &Node) -> EvalResult<bool> {
        let value = self.eval(node)?;
        let flag = self.casts.cast(&TypeInfo::create::<bool>(), &value)?;
        Ok(flag.scalar()?.to_bool())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    fn eval(&mut self, node: &Node) -> EvalResult<Value> {
        match &node.kind {
            NodeKind::Constant(literal) => self.eval_constant(literal),
            NodeKind::Identifier(name) => self
                .symbols
                .lookup(name)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),
            NodeKind::UnaryOp { op, operand } => {
                let operand = self.eval(operand)?;
                Value::unary_operation(self, *op, &operand)
            }
            NodeKind::BinaryOp {
                op: Operator::And,
                left,
                right,
            } => Ok(Value::new(self.condition(left)? && self.condition(right)?)),
            NodeKind::BinaryOp {
                op: Operator::Or,
                left,
                right,
            } => Ok(Value::new(self.condition(left)? || self.condition(right)?)),
            NodeKind::BinaryOp { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Value::binary_operation(self, *op, &left, &right)
            }
            NodeKind::MemberAccessor { object, member } => self.eval_member(object, &member.name),
            NodeKind::FunctionCall { callee, args } => self.eval_call(callee, args),
            NodeKind::FunctionDeclaration(decl) => self.eval_function_decl(decl),
            _ => Err(EvalError::InvalidOperation(
                "statement used as an expression".to_string(),
            )),
        }
    }

    fn eval_constant(&mut self, literal: &Literal) -> EvalResult<Value> {
        match literal {
            Literal::Int(n) => Ok(Value::new_const(*n)),
            Literal::Float(n) => Ok(Value::new_const(*n)),
            Literal::Bool(b) => Ok(Value::new_const(*b)),
            Literal::Str(text) => Ok(self.string(text.as_str())?.const_value()),
            other => Err(EvalError::UnsupportedConstant(format!("{other:?}"))),
        }
    }

    fn eval_args(&mut self, args: &[Node]) -> EvalResult<Vec<Value>> {
        args.iter().map(|arg| self.eval(arg)).collect()
    }

    /// `a.m` is `m(a)`. A data member of object `a` is only reached when
    /// no function named `m` is in sight.
    fn eval_member(&mut self, object: &Node, member: &str) -> EvalResult<Value> {
        let receiver = self.eval(object)?;
        let candidates = self.method_candidates(&receiver, member);
        if candidates.is_empty() {
            return receiver
                .member(member)
                .ok_or_else(|| EvalError::NoFunctionMatches(member.to_string()));
        }
        self.call_candidates(member, candidates, vec![receiver])
    }

    fn eval_call(&mut self, callee: &Node, args: &[Node]) -> EvalResult<Value> {
        if let NodeKind::MemberAccessor { object, member } = &callee.kind {
            let receiver = self.eval(object)?;
            let mut values = Vec::with_capacity(args.len() + 1);
            values.push(receiver.clone());
            values.extend(self.eval_args(args)?);
            return self.call_method(&receiver, &member.name, values);
        }
        let name = match &callee.kind {
            NodeKind::Identifier(name) => name.as_str(),
            _ => "<anonymous>",
        };
        let target = self.eval(callee)?;
        let values = self.eval_args(args)?;
        self.call_value(name, &target, values)
    }

    fn eval_function_decl(&mut self, decl: &Rc<FunctionDecl>) -> EvalResult<Value> {
        let mut params = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let ty = match &param.type_name {
                Some(name) => self.resolve_type(name, "parameter")?,
                None => TypeInfo::any(),
            };
            params.push(if param.is_const { ty.as_const() } else { ty });
        }
        let return_type = match &decl.return_type {
            Some(name) => self.resolve_type(name, "return")?,
            None => TypeInfo::any(),
        };
        let value = Value::new_const(Callable::script(Rc::clone(decl), params, return_type));
        if let Some(name) = &decl.name {
            tracing::trace!(name = %name.name, "declare function");
            self.symbols.add(&name.name, value.clone());
        }
        Ok(value)
    }

    fn resolve_type(&self, name: &Ident, role: &'static str) -> EvalResult<TypeInfo> {
        self.type_named(&name.name).ok_or_else(|| EvalError::UnknownType {
            role,
            name: name.name.clone(),
        })
    }

    // ══════════════════════════════════════════════════════════════════════
    // Calls
    // ══════════════════════════════════════════════════════════════════════

    /// Call a global (or in-scope) function by name.
    pub fn call_function(&mut self, name: &str, args: Vec<Value>) -> EvalResult<Value> {
        let target = self
            .symbols
            .lookup(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedVariable(name.to_string()))?;
        self.call_value(name, &target, args)
    }

    /// Call a function value; overloaded values are resolved against `args`.
    pub fn call_value(&mut self, name: &str, callee: &Value, args: Vec<Value>) -> EvalResult<Value> {
        let direct = callee.get::<Callable>().map(|c| c.clone());
        if let Some(callable) = direct {
            if callable.score(&args, &self.casts) == 0 {
                return Err(self.rejected_call(name, &callable, &args));
            }
            return self.invoke(&callable, args);
        }
        let overloads = callee.get::<CallableOverloader>().map(|o| o.clone());
        match overloads {
            Some(overloads) => {
                let callable = overloads.find(name, &args, &self.casts)?;
                self.invoke(&callable, args)
            }
            None => Err(EvalError::NotCallable(callee.type_info().to_string())),
        }
    }

    /// Run `behavior` with `args[0]` as the receiver. Candidates are the
    /// receiver's own behavior member and every binding of the behavior key.
    pub fn dispatch_behavior(&mut self, behavior: Behavior, args: Vec<Value>) -> EvalResult<Value> {
        let key = behavior.key();
        let receiver = args.first().cloned().unwrap_or_default();
        let mut candidates: Vec<Value> = receiver
            .get::<Object>()
            .and_then(|object| object.behavior(behavior))
            .into_iter()
            .collect();
        candidates.extend(self.symbols.get_all_matches(key).into_iter().filter(Value::is_callable));
        if candidates.is_empty() {
            let type_name = receiver.type_info().to_string();
            return Err(if receiver.is_object() {
                EvalError::MissingBehavior {
                    behavior: key,
                    type_name,
                }
            } else {
                EvalError::InvalidOperation(format!("'{key}' on non-object value of type {type_name}"))
            });
        }
        self.call_candidates(key, candidates, args)
    }

    /// Why a lone callable refused `args`.
    fn rejected_call(&self, name: &str, callable: &Callable, args: &[Value]) -> EvalError {
        let expected = callable.parameter_types().len();
        if !callable.is_variadic() && expected != args.len() {
            return EvalError::ArgumentCount {
                expected,
                found: args.len(),
            };
        }
        EvalError::NoMatchingOverload {
            name: name.to_string(),
            args: describe_args(args),
        }
    }

    /// The receiver's own callable member `name`, then every callable
    /// binding of `name`, innermost first.
    fn method_candidates(&self, receiver: &Value, name: &str) -> Vec<Value> {
        let mut candidates: Vec<Value> = receiver
            .member(name)
            .filter(Value::is_callable)
            .into_iter()
            .collect();
        candidates.extend(self.symbols.get_all_matches(name).into_iter().filter(Value::is_callable));
        candidates
    }

    fn call_method(&mut self, receiver: &Value, name: &str, args: Vec<Value>) -> EvalResult<Value> {
        let candidates = self.method_candidates(receiver, name);
        if candidates.is_empty() {
            return Err(EvalError::NoFunctionMatches(name.to_string()));
        }
        self.call_candidates(name, candidates, args)
    }

    fn call_candidates(&mut self, name: &str, candidates: Vec<Value>, args: Vec<Value>) -> EvalResult<Value> {
        let overloads: CallableOverloader = candidates.into_iter().collect();
        let callable = overloads.find(name, &args, &self.casts)?;
        tracing::debug!(name, args = %describe_args(&args), overloads = overloads.len(), "resolved call");
        self.invoke(&callable, args)
    }

    /// Bind `args` to the callable's parameters and run its body.
    #[tracing::instrument(level = "debug", skip_all, fields(arity = args.len()))]
    pub fn invoke(&mut self, callable: &Callable, args: Vec<Value>) -> EvalResult<Value> {
        let args = self.bind_arguments(callable, args)?;
        match callable.body() {
            Body::Native(f) => {
                let value = f(self, &args)?;
                self.realize_string(value)
            }
            Body::Script(decl) => {
                self.symbols.push_scope();
                let outcome = self.run_function_body(decl, args);
                self.symbols.pop_scope();
                let value = outcome?;
                let return_type = callable.return_type();
                if return_type.is_any() {
                    Ok(value)
                } else {
                    self.cast_declared(&return_type.with_const(value.is_const()), &value)
                }
            }
        }
    }

    /// Cast each argument to its parameter type; const parameters see a
    /// const view.
    fn bind_arguments(&self, callable: &Callable, args: Vec<Value>) -> EvalResult<Vec<Value>> {
        if callable.is_variadic() {
            return Ok(args);
        }
        let params = callable.parameter_types();
        if params.len() != args.len() {
            return Err(EvalError::ArgumentCount {
                expected: params.len(),
                found: args.len(),
            });
        }
        let script = matches!(callable.body(), Body::Script(_));
        params
            .iter()
            .zip(&args)
            .map(|(param, arg)| {
                let bound = if script {
                    self.cast_declared(param, arg)?
                } else {
                    self.casts.cast(param, arg)?
                };
                Ok(bound.create_unique_reference(param.is_const()))
            })
            .collect()
    }

    /// Cast to a type named in script source. A `string` result becomes a
    /// string object again, keeping the cast's constness.
    fn cast_declared(&self, to: &TypeInfo, value: &Value) -> EvalResult<Value> {
        let cast = self.casts.cast(to, value)?;
        let is_const = cast.is_const();
        let realized = self.realize_string(cast)?;
        Ok(realized.create_unique_reference(is_const))
    }

    fn run_function_body(&mut self, decl: &FunctionDecl, args: Vec<Value>) -> EvalResult<Value> {
        for (param, arg) in decl.params.iter().zip(args) {
            self.symbols.define(&param.name.name, arg);
        }
        match self.exec(&decl.body)? {
            Signal::Return(value) => Ok(value),
            Signal::None | Signal::Break | Signal::Continue => Ok(Value::void()),
        }
    }

    /// Host functions return plain `String`s; scripts see string objects.
    fn realize_string(&self, value: Value) -> EvalResult<Value> {
        let text = value.get::<String>().map(|text| text.clone());
        match (text, &self.string_factory) {
            (Some(text), Some(factory)) => Ok(factory(text)),
            _ => Ok(value),
        }
    }
}
