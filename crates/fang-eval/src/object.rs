//! Script objects and the behaviors they opt into.

use std::collections::BTreeMap;
use std::fmt;

use fang_types::ast::Operator;

use crate::value::Value;

/// A bag of named members. Members whose names match a [`Behavior`] key
/// customize how operators and protocols treat the object.
#[derive(Clone, Default)]
pub struct Object {
    members: BTreeMap<String, Value>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Object::insert`].
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.members.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.members.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.members.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.members.keys()).finish()
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Behaviors
// ══════════════════════════════════════════════════════════════════════════

/// Operations an object may customize by defining a member under
/// [`Behavior::key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Behavior {
    Copy,
    /// Wrapped host payload, e.g. the text of a string object.
    Object,
    ToString,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    Add,
    Sub,
    Mul,
    Div,
    Negate,
    Positive,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Behavior {
    pub const ALL: [Behavior; 20] = [
        Self::Copy,
        Self::Object,
        Self::ToString,
        Self::Assign,
        Self::AddAssign,
        Self::SubAssign,
        Self::MulAssign,
        Self::DivAssign,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Negate,
        Self::Positive,
        Self::Eq,
        Self::Ne,
        Self::Lt,
        Self::Le,
        Self::Gt,
        Self::Ge,
    ];

    /// Member name under which an object registers this behavior.
    pub fn key(self) -> &'static str {
        match self {
            Self::Copy => "__copy",
            Self::Object => "__object",
            Self::ToString => "__to_string",
            Self::Assign => "__assign",
            Self::AddAssign => "__add_assign",
            Self::SubAssign => "__sub_assign",
            Self::MulAssign => "__mul_assign",
            Self::DivAssign => "__div_assign",
            Self::Add => "__add",
            Self::Sub => "__sub",
            Self::Mul => "__mul",
            Self::Div => "__div",
            Self::Negate => "__negate",
            Self::Positive => "__positive",
            Self::Eq => "__eq",
            Self::Ne => "__ne",
            Self::Lt => "__lt",
            Self::Le => "__le",
            Self::Gt => "__gt",
            Self::Ge => "__ge",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.key() == key)
    }

    /// Behavior backing a binary operator. `&&` and `||` have none; they
    /// short-circuit on truthiness instead.
    pub fn binary(op: Operator) -> Option<Self> {
        Some(match op {
            Operator::Assign => Self::Assign,
            Operator::AddAssign => Self::AddAssign,
            Operator::SubAssign => Self::SubAssign,
            Operator::MulAssign => Self::MulAssign,
            Operator::DivAssign => Self::DivAssign,
            Operator::Add => Self::Add,
            Operator::Sub => Self::Sub,
            Operator::Mul => Self::Mul,
            Operator::Div => Self::Div,
            Operator::Eq => Self::Eq,
            Operator::NotEq => Self::Ne,
            Operator::Less => Self::Lt,
            Operator::LessEq => Self::Le,
            Operator::Greater => Self::Gt,
            Operator::GreaterEq => Self::Ge,
            Operator::And | Operator::Or => return None,
        })
    }

    pub fn unary(op: Operator) -> Option<Self> {
        match op {
            Operator::Sub => Some(Self::Negate),
            Operator::Add => Some(Self::Positive),
            _ => None,
        }
    }
}

/// Lookup of behavior implementations.
pub trait Behaviors {
    fn behavior(&self, behavior: Behavior) -> Option<Value>;

    fn has_behavior(&self, behavior: Behavior) -> bool {
        self.behavior(behavior).is_some()
    }
}

impl Behaviors for Object {
    fn behavior(&self, behavior: Behavior) -> Option<Value> {
        self.members
            .get(behavior.key())
            .filter(|member| behavior == Behavior::Object || member.is_callable())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::Callable;
    use crate::type_info::TypeInfo;

    #[test]
    fn test_keys_round_trip() {
        for behavior in Behavior::ALL {
            assert_eq!(Behavior::from_key(behavior.key()), Some(behavior));
        }
        assert_eq!(Behavior::from_key("__nope"), None);
    }

    #[test]
    fn test_operator_mapping() {
        assert_eq!(Behavior::binary(Operator::NotEq), Some(Behavior::Ne));
        assert_eq!(Behavior::binary(Operator::DivAssign), Some(Behavior::DivAssign));
        assert_eq!(Behavior::binary(Operator::And), None);
        assert_eq!(Behavior::unary(Operator::Sub), Some(Behavior::Negate));
        assert_eq!(Behavior::unary(Operator::Mul), None);
    }

    #[test]
    fn test_behaviors_must_be_callable() {
        let noop = Callable::native(vec![TypeInfo::any()], TypeInfo::void(), |_, _| Ok(Value::void()));
        let object = Object::new()
            .with("__add", Value::new(1i64))
            .with("__to_string", Value::new(noop))
            .with("__object", Value::new(String::from("payload")));
        assert!(!object.has_behavior(Behavior::Add));
        assert!(object.has_behavior(Behavior::ToString));
        assert!(object.has_behavior(Behavior::Object));
        assert!(!object.has_behavior(Behavior::Copy));
    }

    #[test]
    fn test_members() {
        let mut object = Object::new().with("x", Value::new(1i64));
        assert!(object.contains("x"));
        assert_eq!(object.len(), 1);
        assert!(object.insert("x", Value::new(2i64)).is_some());
        assert!(object.remove("x").is_some());
        assert!(object.is_empty());
    }
}
