//! Registered conversions between host types.

use std::rc::Rc;

use crate::error::{EvalError, EvalResult};
use crate::type_info::TypeInfo;
use crate::value::Value;

pub type Converter = Rc<dyn Fn(&Value) -> EvalResult<Value>>;

struct CastEntry {
    to: TypeInfo,
    from: TypeInfo,
    converter: Converter,
    /// Only used when the caller asks for an explicit cast.
    explicit: bool,
}

/// How a value of one type becomes another.
#[derive(Clone)]
pub enum CastRule {
    Identity,
    Convert(Converter),
}

#[derive(Default)]
pub struct CastList {
    entries: Vec<CastEntry>,
}

impl CastList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter, replacing any existing one for the same pair.
    pub fn add(
        &mut self,
        to: TypeInfo,
        from: TypeInfo,
        explicit: bool,
        converter: impl Fn(&Value) -> EvalResult<Value> + 'static,
    ) {
        self.entries
            .retain(|e| !(e.to.bare_equal(&to) && e.from.bare_equal(&from)));
        self.entries.push(CastEntry {
            to,
            from,
            converter: Rc::new(converter),
            explicit,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an implicit conversion exists. Arithmetic kinds always
    /// convert into each other.
    pub fn can_cast(&self, to: &TypeInfo, from: &TypeInfo) -> bool {
        (to.is_arithmetic() && from.is_arithmetic()) || self.find(to, from).is_some()
    }

    /// Implicit rule from `from` to `to`. Dropping const is never allowed.
    pub fn find(&self, to: &TypeInfo, from: &TypeInfo) -> Option<CastRule> {
        self.lookup(to, from, false)
    }

    pub fn find_explicit(&self, to: &TypeInfo, from: &TypeInfo) -> Option<CastRule> {
        self.lookup(to, from, true)
    }

    fn lookup(&self, to: &TypeInfo, from: &TypeInfo, allow_explicit: bool) -> Option<CastRule> {
        let keeps_const = !from.is_const() || to.is_const();
        if to.is_any() || (to.bare_equal(from) && keeps_const) {
            return Some(CastRule::Identity);
        }
        if !keeps_const {
            return None;
        }
        self.entries
            .iter()
            .find(|e| {
                e.to.bare_equal(to) && e.from.bare_equal(from) && (allow_explicit || !e.explicit)
            })
            .map(|e| CastRule::Convert(e.converter.clone()))
    }

    pub fn cast(&self, to: &TypeInfo, value: &Value) -> EvalResult<Value> {
        self.apply(to, value, false)
    }

    pub fn cast_explicit(&self, to: &TypeInfo, value: &Value) -> EvalResult<Value> {
        self.apply(to, value, true)
    }

    fn apply(&self, to: &TypeInfo, value: &Value, allow_explicit: bool) -> EvalResult<Value> {
        let from = value.type_info();
        let keeps_const = !from.is_const() || to.is_const();
        if to.is_any() || (to.bare_equal(&from) && keeps_const) {
            return Ok(value.clone());
        }
        if let Some(kind) = to.arithmetic_kind().filter(|_| from.is_arithmetic()) {
            let converted = Value::from_scalar(value.scalar()?.convert(kind)?);
            return Ok(converted.create_unique_reference(to.is_const()));
        }
        match self.lookup(to, &from, allow_explicit) {
            Some(CastRule::Identity) => Ok(value.clone()),
            Some(CastRule::Convert(converter)) => converter(value),
            None => Err(EvalError::CannotCast {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arithmetic::Scalar;
    use pretty_assertions::assert_eq;

    struct Meters(f64);

    fn meters() -> TypeInfo {
        TypeInfo::create::<Meters>()
    }

    fn with_meters() -> CastList {
        let mut casts = CastList::new();
        casts.add(TypeInfo::create::<f64>(), meters(), false, |v| {
            let m = v.get::<Meters>().ok_or(EvalError::Runtime("not meters".into()))?;
            Ok(Value::new(m.0))
        });
        casts
    }

    #[test]
    fn test_identity_and_any() {
        let casts = CastList::new();
        assert!(matches!(casts.find(&meters(), &meters()), Some(CastRule::Identity)));
        assert!(matches!(casts.find(&TypeInfo::any(), &meters()), Some(CastRule::Identity)));
        assert!(casts.find(&TypeInfo::create::<f64>(), &meters()).is_none());
    }

    #[test]
    fn test_const_cannot_be_dropped() {
        let casts = with_meters();
        let const_meters = meters().as_const();
        assert!(casts.find(&meters(), &const_meters).is_none());
        assert!(casts.find(&const_meters, &meters()).is_some());
        assert!(!casts.can_cast(&TypeInfo::create::<f64>(), &const_meters));
        assert!(casts.can_cast(&TypeInfo::create::<f64>().as_const(), &const_meters));
    }

    #[test]
    fn test_arithmetic_always_casts() {
        let casts = CastList::new();
        let int = TypeInfo::create::<i64>();
        assert!(casts.can_cast(&int, &TypeInfo::create::<bool>()));
        let cast = casts.cast(&int.as_const(), &Value::new(2.5f64)).unwrap();
        assert_eq!(cast.scalar(), Ok(Scalar::Int(2)));
        assert!(cast.is_const());
    }

    #[test]
    fn test_identity_keeps_alias() {
        let casts = CastList::new();
        let original = Value::new(Meters(1.0));
        let cast = casts.cast(&meters(), &original).unwrap();
        assert!(cast.same_storage(&original));
    }

    #[test]
    fn test_converter_and_failure() {
        let casts = with_meters();
        let cast = casts.cast(&TypeInfo::create::<f64>(), &Value::new(Meters(3.5))).unwrap();
        assert_eq!(cast.scalar(), Ok(Scalar::Float(3.5)));

        let err = casts.cast(&meters(), &Value::new(1i64)).unwrap_err();
        assert!(matches!(err, EvalError::CannotCast { .. }));
    }

    #[test]
    fn test_explicit_entries_need_explicit_cast() {
        let mut casts = CastList::new();
        casts.add(meters(), TypeInfo::create::<f64>(), true, |v| Ok(Value::new(Meters(v.scalar()?.to_f64()))));
        assert!(!casts.can_cast(&meters(), &TypeInfo::create::<f64>()));
        assert!(casts.cast(&meters(), &Value::new(2.0f64)).is_err());
        let cast = casts.cast_explicit(&meters(), &Value::new(2.0f64)).unwrap();
        assert!(cast.is::<Meters>());
    }

    #[test]
    fn test_add_replaces_pair() {
        let mut casts = with_meters();
        casts.add(TypeInfo::create::<f64>(), meters(), false, |_| Ok(Value::new(0.0f64)));
        assert_eq!(casts.len(), 1);
    }
}
