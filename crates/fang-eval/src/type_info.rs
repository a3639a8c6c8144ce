//! Runtime type descriptors.

use std::any::TypeId;
use std::fmt;

use crate::arithmetic::ArithmeticKind;
use crate::callable::{Callable, CallableOverloader};
use crate::object::Object;
use crate::value::Value;

/// Identity of a host type plus the qualifiers a [`Value`] handle carries.
///
/// Identity comes from [`TypeId`], so two descriptors built from the same
/// Rust type always agree. Qualifiers are set with the `as_*` builders and
/// never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    is_const: bool,
    is_reference: bool,
    is_pointer: bool,
    is_arithmetic: bool,
}

impl TypeInfo {
    pub fn create<T: ?Sized + 'static>() -> Self {
        let id = TypeId::of::<T>();
        Self {
            id,
            name: std::any::type_name::<T>(),
            is_const: false,
            is_reference: false,
            is_pointer: false,
            is_arithmetic: ArithmeticKind::from_type_id(id).is_some(),
        }
    }

    /// The generic type every parameter check accepts.
    pub fn any() -> Self {
        Self::create::<Value>()
    }

    pub fn void() -> Self {
        Self::create::<()>()
    }

    pub fn as_const(self) -> Self {
        self.with_const(true)
    }

    pub fn with_const(mut self, is_const: bool) -> Self {
        self.is_const = is_const;
        self
    }

    pub fn as_reference(mut self) -> Self {
        self.is_reference = true;
        self
    }

    pub fn as_pointer(mut self) -> Self {
        self.is_pointer = true;
        self
    }

    /// Same identity, qualifiers ignored.
    pub fn bare_equal(&self, other: &TypeInfo) -> bool {
        self.id == other.id
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Neither a reference nor a pointer.
    pub fn owning(&self) -> bool {
        !self.is_reference && !self.is_pointer
    }

    pub fn is_any(&self) -> bool {
        self.is::<Value>()
    }

    pub fn is_void(&self) -> bool {
        self.is::<()>()
    }

    pub fn is_const(&self) -> bool {
        self.is_const
    }

    pub fn is_reference(&self) -> bool {
        self.is_reference
    }

    pub fn is_pointer(&self) -> bool {
        self.is_pointer
    }

    pub fn is_arithmetic(&self) -> bool {
        self.is_arithmetic
    }

    pub fn arithmetic_kind(&self) -> Option<ArithmeticKind> {
        ArithmeticKind::from_type_id(self.id)
    }

    /// Script-facing name of the bare type.
    pub fn name(&self) -> &'static str {
        if let Some(kind) = self.arithmetic_kind() {
            return kind.name();
        }
        let known: [(TypeId, &'static str); 6] = [
            (TypeId::of::<String>(), "string"),
            (TypeId::of::<Object>(), "object"),
            (TypeId::of::<Callable>(), "function"),
            (TypeId::of::<CallableOverloader>(), "overloaded function"),
            (TypeId::of::<Value>(), "any"),
            (TypeId::of::<()>(), "void"),
        ];
        known
            .iter()
            .find(|(id, _)| *id == self.id)
            .map(|(_, name)| *name)
            .unwrap_or(self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            f.write_str("const ")?;
        }
        f.write_str(self.name())?;
        if self.is_reference {
            f.write_str("&")?;
        }
        if self.is_pointer {
            f.write_str("*")?;
        }
        Ok(())
    }
}
