//! Dynamically typed value handles.
//!
//! A [`Value`] pairs a [`TypeInfo`] with shared, interior-mutable storage.
//! Cloning a `Value` clones the handle, never the payload: two clones alias
//! the same storage, which is how assignment through a variable reaches the
//! binding it came from. Use [`Value::copy`] for an independent payload.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use fang_types::ast::Operator;

use crate::arithmetic::{self, ArithmeticKind, Scalar};
use crate::callable::{Callable, CallableOverloader};
use crate::error::{EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::object::{Behavior, Behaviors, Object};
use crate::type_info::TypeInfo;

type Cell = Rc<RefCell<dyn Any>>;

#[derive(Clone)]
enum Storage {
    Void,
    /// Payload created by the interpreter.
    Owned(Cell),
    /// Payload the host handed over to share with scripts.
    Shared(Cell),
    /// Reference or pointer to host storage.
    Borrowed(Cell),
}

impl Storage {
    fn cell(&self) -> Option<&Cell> {
        match self {
            Self::Void => None,
            Self::Owned(cell) | Self::Shared(cell) | Self::Borrowed(cell) => Some(cell),
        }
    }
}

#[derive(Clone)]
pub struct Value {
    type_info: TypeInfo,
    storage: Storage,
}

impl Default for Value {
    fn default() -> Self {
        Self::void()
    }
}

impl Value {
    // ══════════════════════════════════════════════════════════════════════
    // Construction
    // ══════════════════════════════════════════════════════════════════════

    pub fn void() -> Self {
        Self {
            type_info: TypeInfo::void(),
            storage: Storage::Void,
        }
    }

    pub fn new<T: 'static>(payload: T) -> Self {
        Self {
            type_info: TypeInfo::create::<T>(),
            storage: Storage::Owned(Rc::new(RefCell::new(payload))),
        }
    }

    pub fn new_const<T: 'static>(payload: T) -> Self {
        Self::new(payload).const_value()
    }

    /// Share a host-owned cell. Writes from either side are visible to both.
    pub fn shared<T: 'static>(cell: Rc<RefCell<T>>) -> Self {
        Self {
            type_info: TypeInfo::create::<T>(),
            storage: Storage::Shared(cell),
        }
    }

    /// A reference-qualified handle onto host storage.
    pub fn reference<T: 'static>(cell: &Rc<RefCell<T>>) -> Self {
        let cell: Cell = cell.clone();
        Self {
            type_info: TypeInfo::create::<T>().as_reference(),
            storage: Storage::Borrowed(cell),
        }
    }

    /// A pointer-qualified handle onto host storage.
    pub fn pointer<T: 'static>(cell: &Rc<RefCell<T>>) -> Self {
        let cell: Cell = cell.clone();
        Self {
            type_info: TypeInfo::create::<T>().as_pointer(),
            storage: Storage::Borrowed(cell),
        }
    }

    pub fn from_scalar(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Bool(b) => Self::new(b),
            Scalar::Int(n) => Self::new(n),
            Scalar::UInt(n) => Self::new(n),
            Scalar::Float(n) => Self::new(n),
        }
    }

    /// Same storage, with the const qualifier OR-ed in.
    pub fn create_unique_reference(&self, make_const: bool) -> Self {
        let is_const = self.type_info.is_const() || make_const;
        Self {
            type_info: self.type_info.with_const(is_const),
            storage: self.storage.clone(),
        }
    }

    pub fn const_value(&self) -> Self {
        self.create_unique_reference(true)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Inspection
    // ══════════════════════════════════════════════════════════════════════

    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.type_info.is::<T>()
    }

    pub fn is_void(&self) -> bool {
        matches!(self.storage, Storage::Void)
    }

    pub fn is_const(&self) -> bool {
        self.type_info.is_const()
    }

    pub fn is_arithmetic(&self) -> bool {
        self.type_info.is_arithmetic()
    }

    pub fn is_object(&self) -> bool {
        self.is::<Object>()
    }

    pub fn is_callable(&self) -> bool {
        self.is::<Callable>() || self.is::<CallableOverloader>()
    }

    /// Whether the host shared this storage rather than the interpreter
    /// allocating it.
    pub fn is_host_owned(&self) -> bool {
        matches!(self.storage, Storage::Shared(_) | Storage::Borrowed(_))
    }

    /// Whether two handles alias the same payload.
    pub fn same_storage(&self, other: &Value) -> bool {
        match (self.storage.cell(), other.storage.cell()) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn get<T: 'static>(&self) -> Option<Ref<'_, T>> {
        if !self.is::<T>() {
            return None;
        }
        let borrowed = self.storage.cell()?.try_borrow().ok()?;
        Ref::filter_map(borrowed, |payload| payload.downcast_ref::<T>()).ok()
    }

    /// Mutable access to the payload; `None` for const handles.
    pub fn get_mut<T: 'static>(&self) -> Option<RefMut<'_, T>> {
        if self.is_const() || !self.is::<T>() {
            return None;
        }
        let borrowed = self.storage.cell()?.try_borrow_mut().ok()?;
        RefMut::filter_map(borrowed, |payload| payload.downcast_mut::<T>()).ok()
    }

    /// A data member of an Object payload. Members of a const object come
    /// back const.
    pub fn member(&self, name: &str) -> Option<Value> {
        let object = self.get::<Object>()?;
        let member = object.get(name)?;
        Some(member.create_unique_reference(self.is_const()))
    }

    /// Text of a `String` payload or of a string object's `__object` payload.
    pub fn as_string(&self) -> Option<String> {
        if let Some(text) = self.get::<String>() {
            return Some(text.clone());
        }
        let payload = self.member(Behavior::Object.key())?;
        let text = payload.get::<String>()?;
        Some(text.clone())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Arithmetic payloads
    // ══════════════════════════════════════════════════════════════════════

    pub fn scalar(&self) -> EvalResult<Scalar> {
        let kind = self.type_info.arithmetic_kind().ok_or_else(|| {
            EvalError::InvalidOperation(format!(
                "arithmetic on non-arithmetic value of type {}",
                self.type_info
            ))
        })?;
        let conflict = || EvalError::BorrowConflict(self.type_info.to_string());
        Ok(match kind {
            ArithmeticKind::Bool => Scalar::Bool(*self.get::<bool>().ok_or_else(conflict)?),
            ArithmeticKind::Int => Scalar::Int(*self.get::<i64>().ok_or_else(conflict)?),
            ArithmeticKind::UInt => Scalar::UInt(*self.get::<u64>().ok_or_else(conflict)?),
            ArithmeticKind::Float => Scalar::Float(*self.get::<f64>().ok_or_else(conflict)?),
        })
    }

    pub fn visit_arithmetic<R>(&self, visit: impl FnOnce(Scalar) -> R) -> EvalResult<R> {
        Ok(visit(self.scalar()?))
    }

    /// Overwrite an arithmetic payload in place, converting to its own kind.
    pub fn store_scalar(&self, scalar: Scalar) -> EvalResult<()> {
        if self.is_const() {
            return Err(EvalError::ConstAssignment);
        }
        let current = self.scalar()?;
        let conflict = || EvalError::BorrowConflict(self.type_info.to_string());
        match scalar.convert(current.kind())? {
            Scalar::Bool(b) => *self.get_mut::<bool>().ok_or_else(conflict)? = b,
            Scalar::Int(n) => *self.get_mut::<i64>().ok_or_else(conflict)? = n,
            Scalar::UInt(n) => *self.get_mut::<u64>().ok_or_else(conflict)? = n,
            Scalar::Float(n) => *self.get_mut::<f64>().ok_or_else(conflict)? = n,
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Protocols
    // ══════════════════════════════════════════════════════════════════════

    /// Text form of the value. Objects must provide `__to_string`.
    pub fn to_string(&self, interp: &mut Interpreter) -> EvalResult<String> {
        if self.is_arithmetic() {
            return Ok(self.scalar()?.to_string());
        }
        if let Some(text) = self.get::<String>() {
            return Ok(text.clone());
        }
        if self.is_object() {
            let rendered = interp.dispatch_behavior(Behavior::ToString, vec![self.clone()])?;
            return rendered.as_string().ok_or_else(|| EvalError::TypeMismatch {
                expected: "string".to_string(),
                found: rendered.type_info().to_string(),
            });
        }
        Ok(String::new())
    }

    /// An independent value with the same contents.
    ///
    /// Objects use their `__copy` behavior when present and otherwise copy
    /// each member. Functions are copied shallowly.
    pub fn copy(&self, interp: &mut Interpreter) -> EvalResult<Value> {
        if self.is_void() {
            return Ok(Value::void());
        }
        if self.is_arithmetic() {
            return Ok(Value::from_scalar(self.scalar()?));
        }
        let object = self.get::<Object>().map(|object| object.clone());
        if let Some(object) = object {
            if let Some(copier) = object.behavior(Behavior::Copy) {
                return interp.call_value(Behavior::Copy.key(), &copier, vec![self.clone()]);
            }
            let mut fresh = Object::new();
            for (name, member) in object.iter() {
                let copied = member.copy(interp)?;
                fresh.insert(name, copied.create_unique_reference(member.is_const()));
            }
            return Ok(Value::new(fresh));
        }
        if let Some(text) = self.get::<String>() {
            return Ok(Value::new(text.clone()));
        }
        if let Some(callable) = self.get::<Callable>() {
            return Ok(Value::new(callable.clone()));
        }
        if let Some(overloader) = self.get::<CallableOverloader>() {
            return Ok(Value::new(overloader.clone()));
        }
        Err(EvalError::CannotCopy(self.type_info.to_string()))
    }

    /// Binary operator dispatch: arithmetic pairs compute directly, anything
    /// else goes through the left operand's behaviors.
    pub fn binary_operation(
        interp: &mut Interpreter,
        op: Operator,
        left: &Value,
        right: &Value,
    ) -> EvalResult<Value> {
        if left.is_arithmetic() && right.is_arithmetic() {
            return arithmetic::binary_operation(op, left, right);
        }
        let behavior = Behavior::binary(op).ok_or_else(|| {
            EvalError::InvalidOperation(format!(
                "operator '{op}' on {} and {}",
                left.type_info, right.type_info
            ))
        })?;
        interp.dispatch_behavior(behavior, vec![left.clone(), right.clone()])
    }

    pub fn unary_operation(interp: &mut Interpreter, op: Operator, operand: &Value) -> EvalResult<Value> {
        if operand.is_arithmetic() {
            return arithmetic::unary_operation(op, operand);
        }
        let behavior = Behavior::unary(op).ok_or_else(|| {
            EvalError::InvalidOperation(format!("unary '{op}' on {}", operand.type_info))
        })?;
        interp.dispatch_behavior(behavior, vec![operand.clone()])
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Ok(scalar) = self.scalar() {
            return write!(f, "Value({} = {scalar})", self.type_info);
        }
        if let Some(text) = self.get::<String>() {
            return write!(f, "Value({} = {:?})", self.type_info, *text);
        }
        if let Some(object) = self.get::<Object>() {
            return write!(f, "Value({} = {object:?})", self.type_info);
        }
        write!(f, "Value({})", self.type_info)
    }
}
