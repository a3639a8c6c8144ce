//! Callables, typed native adapters, and overload resolution.

use std::fmt;
use std::rc::Rc;

use fang_types::ast::FunctionDecl;

use crate::cast::CastList;
use crate::error::{EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::type_info::TypeInfo;
use crate::value::Value;

pub type NativeFn = dyn Fn(&mut Interpreter, &[Value]) -> EvalResult<Value>;

#[derive(Clone)]
pub enum Body {
    Native(Rc<NativeFn>),
    Script(Rc<FunctionDecl>),
}

/// A function value: declared signature plus a native or script body.
#[derive(Clone)]
pub struct Callable {
    return_type: TypeInfo,
    parameter_types: Vec<TypeInfo>,
    /// Accepts any number of arguments of any type.
    generic_arity: bool,
    body: Body,
}

impl Callable {
    pub fn native(
        parameter_types: Vec<TypeInfo>,
        return_type: TypeInfo,
        f: impl Fn(&mut Interpreter, &[Value]) -> EvalResult<Value> + 'static,
    ) -> Self {
        Self {
            return_type,
            parameter_types,
            generic_arity: false,
            body: Body::Native(Rc::new(f)),
        }
    }

    pub fn variadic(f: impl Fn(&mut Interpreter, &[Value]) -> EvalResult<Value> + 'static) -> Self {
        Self {
            return_type: TypeInfo::any(),
            parameter_types: Vec::new(),
            generic_arity: true,
            body: Body::Native(Rc::new(f)),
        }
    }

    pub fn script(decl: Rc<FunctionDecl>, parameter_types: Vec<TypeInfo>, return_type: TypeInfo) -> Self {
        Self {
            return_type,
            parameter_types,
            generic_arity: false,
            body: Body::Script(decl),
        }
    }

    /// Wrap a one-argument Rust function; parameter and return types come
    /// from the signature.
    pub fn unary<A, R>(f: impl Fn(A) -> R + 'static) -> Self
    where
        A: FromValue,
        R: IntoValue,
    {
        Self::native(vec![A::type_info()], R::type_info(), move |_, args| {
            let [a] = args else {
                return Err(arity_error(1, args));
            };
            f(A::from_value(a)?).into_value()
        })
    }

    pub fn binary<A, B, R>(f: impl Fn(A, B) -> R + 'static) -> Self
    where
        A: FromValue,
        B: FromValue,
        R: IntoValue,
    {
        Self::native(vec![A::type_info(), B::type_info()], R::type_info(), move |_, args| {
            let [a, b] = args else {
                return Err(arity_error(2, args));
            };
            f(A::from_value(a)?, B::from_value(b)?).into_value()
        })
    }

    pub fn return_type(&self) -> TypeInfo {
        self.return_type
    }

    pub fn parameter_types(&self) -> &[TypeInfo] {
        &self.parameter_types
    }

    pub fn is_variadic(&self) -> bool {
        self.generic_arity
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// How well this callable matches `args`; zero means it cannot be
    /// called with them.
    pub fn score(&self, args: &[Value], casts: &CastList) -> u32 {
        if self.generic_arity {
            return 1;
        }
        if args.len() != self.parameter_types.len() {
            return 0;
        }
        let mut score = 1;
        for (param, arg) in self.parameter_types.iter().zip(args) {
            if !casts.can_cast(param, &arg.type_info()) {
                return 0;
            }
            if !param.is_any() {
                score += 1;
            }
        }
        score
    }

    pub fn invoke(&self, interp: &mut Interpreter, args: Vec<Value>) -> EvalResult<Value> {
        interp.invoke(self, args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.body {
            Body::Native(_) => "native",
            Body::Script(_) => "script",
        };
        if self.generic_arity {
            return write!(f, "Callable({kind}, ...)");
        }
        write!(
            f,
            "Callable({kind}, ({}) -> {})",
            type_list(&self.parameter_types),
            self.return_type
        )
    }
}

fn arity_error(expected: usize, args: &[Value]) -> EvalError {
    EvalError::ArgumentCount {
        expected,
        found: args.len(),
    }
}

fn type_list(types: &[TypeInfo]) -> String {
    types.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

pub(crate) fn describe_args(args: &[Value]) -> String {
    let types: Vec<TypeInfo> = args.iter().map(Value::type_info).collect();
    type_list(&types)
}

// ══════════════════════════════════════════════════════════════════════════
// Overloads
// ══════════════════════════════════════════════════════════════════════════

/// Several callables bound under one name.
#[derive(Debug, Clone, Default)]
pub struct CallableOverloader {
    callables: Vec<Value>,
}

impl CallableOverloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a callable; a nested overloader is flattened into this one.
    pub fn push(&mut self, value: Value) {
        let nested = value.get::<CallableOverloader>().map(|o| o.callables.clone());
        match nested {
            Some(callables) => self.callables.extend(callables),
            None => self.callables.push(value),
        }
    }

    pub fn len(&self) -> usize {
        self.callables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.callables.iter()
    }

    /// Pick the single highest-scoring callable for `args`.
    pub fn find(&self, name: &str, args: &[Value], casts: &CastList) -> EvalResult<Callable> {
        let mut best: Option<Callable> = None;
        let mut best_score = 0;
        let mut tied = false;
        for value in &self.callables {
            let Some(callable) = value.get::<Callable>() else {
                continue;
            };
            let score = callable.score(args, casts);
            if score == 0 {
                continue;
            }
            if score > best_score {
                best_score = score;
                best = Some(callable.clone());
                tied = false;
            } else if score == best_score {
                tied = true;
            }
        }
        tracing::trace!(name, best_score, tied, candidates = self.callables.len(), "overload scores");
        match best {
            Some(_) if tied => Err(EvalError::AmbiguousCall {
                name: name.to_string(),
                args: describe_args(args),
            }),
            Some(callable) => Ok(callable),
            None => Err(EvalError::NoMatchingOverload {
                name: name.to_string(),
                args: describe_args(args),
            }),
        }
    }
}

impl FromIterator<Value> for CallableOverloader {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut overloader = Self::new();
        for value in iter {
            overloader.push(value);
        }
        overloader
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Typed adapters
// ══════════════════════════════════════════════════════════════════════════

/// A Rust type a native function can take as a parameter.
pub trait FromValue: Sized {
    fn type_info() -> TypeInfo;
    fn from_value(value: &Value) -> EvalResult<Self>;
}

/// A Rust type a native function can return.
pub trait IntoValue {
    fn type_info() -> TypeInfo;
    fn into_value(self) -> EvalResult<Value>;
}

macro_rules! arithmetic_adapters {
    ($($ty:ty => |$s:ident| $read:expr),* $(,)?) => {$(
        impl FromValue for $ty {
            fn type_info() -> TypeInfo {
                TypeInfo::create::<$ty>().as_const()
            }
            fn from_value(value: &Value) -> EvalResult<Self> {
                let $s = value.scalar()?;
                $read
            }
        }

        impl IntoValue for $ty {
            fn type_info() -> TypeInfo {
                TypeInfo::create::<$ty>()
            }
            fn into_value(self) -> EvalResult<Value> {
                Ok(Value::new(self))
            }
        }
    )*};
}

arithmetic_adapters! {
    bool => |s| Ok(s.to_bool()),
    i64 => |s| s.to_i64(),
    u64 => |s| s.to_u64(),
    f64 => |s| Ok(s.to_f64()),
}

impl FromValue for String {
    fn type_info() -> TypeInfo {
        TypeInfo::create::<String>().as_const()
    }
    fn from_value(value: &Value) -> EvalResult<Self> {
        value.as_string().ok_or_else(|| EvalError::TypeMismatch {
            expected: "string".to_string(),
            found: value.type_info().to_string(),
        })
    }
}

impl IntoValue for String {
    fn type_info() -> TypeInfo {
        TypeInfo::create::<String>()
    }
    fn into_value(self) -> EvalResult<Value> {
        Ok(Value::new(self))
    }
}

impl FromValue for Value {
    fn type_info() -> TypeInfo {
        TypeInfo::any()
    }
    fn from_value(value: &Value) -> EvalResult<Self> {
        Ok(value.clone())
    }
}

impl IntoValue for Value {
    fn type_info() -> TypeInfo {
        TypeInfo::any()
    }
    fn into_value(self) -> EvalResult<Value> {
        Ok(self)
    }
}

impl IntoValue for () {
    fn type_info() -> TypeInfo {
        TypeInfo::void()
    }
    fn into_value(self) -> EvalResult<Value> {
        Ok(Value::void())
    }
}

impl<T: IntoValue> IntoValue for EvalResult<T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }
    fn into_value(self) -> EvalResult<Value> {
        self?.into_value()
    }
}
