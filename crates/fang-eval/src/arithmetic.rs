//! Scalar arithmetic over the closed set `bool`, `int`, `uint`, `float`.
//!
//! Every binary operation coerces the right operand to the left operand's
//! kind first, so `1 + 2.9` is an integer addition yielding `3`.

use std::any::TypeId;
use std::fmt;

use fang_types::ast::Operator;

use crate::error::{EvalError, EvalResult};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticKind {
    Bool,
    Int,
    UInt,
    Float,
}

impl ArithmeticKind {
    pub(crate) fn from_type_id(id: TypeId) -> Option<Self> {
        if id == TypeId::of::<bool>() {
            Some(Self::Bool)
        } else if id == TypeId::of::<i64>() {
            Some(Self::Int)
        } else if id == TypeId::of::<u64>() {
            Some(Self::UInt)
        } else if id == TypeId::of::<f64>() {
            Some(Self::Float)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
        }
    }
}

/// A snapshot of an arithmetic value's payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Scalar {
    pub fn kind(self) -> ArithmeticKind {
        match self {
            Self::Bool(_) => ArithmeticKind::Bool,
            Self::Int(_) => ArithmeticKind::Int,
            Self::UInt(_) => ArithmeticKind::UInt,
            Self::Float(_) => ArithmeticKind::Float,
        }
    }

    pub fn to_bool(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Int(n) => n != 0,
            Self::UInt(n) => n != 0,
            Self::Float(n) => n != 0.0,
        }
    }

    pub fn to_i64(self) -> EvalResult<i64> {
        match self {
            Self::Bool(b) => Ok(i64::from(b)),
            Self::Int(n) => Ok(n),
            Self::UInt(n) => i64::try_from(n).map_err(|_| out_of_range(self, "int")),
            // 2^63 is exactly representable; anything at or past it overflows.
            Self::Float(n) if n.is_finite() && n >= -9.223_372_036_854_776e18 && n < 9.223_372_036_854_776e18 => {
                Ok(n.trunc() as i64)
            }
            Self::Float(_) => Err(out_of_range(self, "int")),
        }
    }

    pub fn to_u64(self) -> EvalResult<u64> {
        match self {
            Self::Bool(b) => Ok(u64::from(b)),
            Self::Int(n) => u64::try_from(n).map_err(|_| out_of_range(self, "uint")),
            Self::UInt(n) => Ok(n),
            Self::Float(n) if n.is_finite() && n > -1.0 && n < 1.844_674_407_370_955_2e19 => {
                Ok(n.trunc() as u64)
            }
            Self::Float(_) => Err(out_of_range(self, "uint")),
        }
    }

    pub fn to_f64(self) -> f64 {
        match self {
            Self::Bool(b) => f64::from(u8::from(b)),
            Self::Int(n) => n as f64,
            Self::UInt(n) => n as f64,
            Self::Float(n) => n,
        }
    }

    /// Checked conversion to another arithmetic kind.
    pub fn convert(self, to: ArithmeticKind) -> EvalResult<Scalar> {
        Ok(match to {
            ArithmeticKind::Bool => Self::Bool(self.to_bool()),
            ArithmeticKind::Int => Self::Int(self.to_i64()?),
            ArithmeticKind::UInt => Self::UInt(self.to_u64()?),
            ArithmeticKind::Float => Self::Float(self.to_f64()),
        })
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::UInt(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
        }
    }
}

fn out_of_range(value: Scalar, to: &'static str) -> EvalError {
    EvalError::OutOfRange {
        value: value.to_string(),
        to,
    }
}

fn invalid(op: Operator, kind: ArithmeticKind) -> EvalError {
    EvalError::InvalidOperation(format!("operator '{op}' is not defined for {}", kind.name()))
}

// ══════════════════════════════════════════════════════════════════════════
// Binary
// ══════════════════════════════════════════════════════════════════════════

/// Apply `op` to two arithmetic values.
///
/// Assignment forms write through `left` and return it; every other
/// operator produces a fresh owned value.
pub fn binary_operation(op: Operator, left: &Value, right: &Value) -> EvalResult<Value> {
    if op.is_assignment() && left.is_const() {
        return Err(EvalError::ConstAssignment);
    }
    let l = left.scalar()?;
    let r = right.scalar()?.convert(l.kind())?;

    if op.is_assignment() {
        let stored = match op {
            Operator::Assign => r,
            Operator::AddAssign => compute(Operator::Add, l, r)?,
            Operator::SubAssign => compute(Operator::Sub, l, r)?,
            Operator::MulAssign => compute(Operator::Mul, l, r)?,
            Operator::DivAssign => compute(Operator::Div, l, r)?,
            _ => return Err(invalid(op, l.kind())),
        };
        left.store_scalar(stored)?;
        return Ok(left.clone());
    }

    let result = match op {
        Operator::Eq => Scalar::Bool(l == r),
        Operator::NotEq => Scalar::Bool(l != r),
        Operator::And => Scalar::Bool(l.to_bool() && r.to_bool()),
        Operator::Or => Scalar::Bool(l.to_bool() || r.to_bool()),
        Operator::Less | Operator::LessEq | Operator::Greater | Operator::GreaterEq => {
            Scalar::Bool(compare(op, l, r)?)
        }
        _ => compute(op, l, r)?,
    };
    Ok(Value::from_scalar(result))
}

/// `+ - * /` on two scalars of the same kind.
fn compute(op: Operator, l: Scalar, r: Scalar) -> EvalResult<Scalar> {
    let symbol = op.symbol();
    match (l, r) {
        (Scalar::Int(a), Scalar::Int(b)) => {
            let result = match op {
                Operator::Add => a.checked_add(b),
                Operator::Sub => a.checked_sub(b),
                Operator::Mul => a.checked_mul(b),
                Operator::Div if b == 0 => return Err(EvalError::DivideByZero),
                Operator::Div => a.checked_div(b),
                _ => return Err(invalid(op, l.kind())),
            };
            result.map(Scalar::Int).ok_or(EvalError::ArithmeticOverflow(symbol))
        }
        (Scalar::UInt(a), Scalar::UInt(b)) => {
            let result = match op {
                Operator::Add => a.checked_add(b),
                Operator::Sub => a.checked_sub(b),
                Operator::Mul => a.checked_mul(b),
                Operator::Div if b == 0 => return Err(EvalError::DivideByZero),
                Operator::Div => a.checked_div(b),
                _ => return Err(invalid(op, l.kind())),
            };
            result.map(Scalar::UInt).ok_or(EvalError::ArithmeticOverflow(symbol))
        }
        (Scalar::Float(a), Scalar::Float(b)) => match op {
            Operator::Add => Ok(Scalar::Float(a + b)),
            Operator::Sub => Ok(Scalar::Float(a - b)),
            Operator::Mul => Ok(Scalar::Float(a * b)),
            Operator::Div if b == 0.0 => Err(EvalError::DivideByZero),
            Operator::Div => Ok(Scalar::Float(a / b)),
            _ => Err(invalid(op, l.kind())),
        },
        _ => Err(invalid(op, l.kind())),
    }
}

fn compare(op: Operator, l: Scalar, r: Scalar) -> EvalResult<bool> {
    let ordering = match (l, r) {
        (Scalar::Int(a), Scalar::Int(b)) => a.partial_cmp(&b),
        (Scalar::UInt(a), Scalar::UInt(b)) => a.partial_cmp(&b),
        (Scalar::Float(a), Scalar::Float(b)) => a.partial_cmp(&b),
        _ => return Err(invalid(op, l.kind())),
    };
    let Some(ordering) = ordering else {
        return Ok(false);
    };
    Ok(match op {
        Operator::Less => ordering.is_lt(),
        Operator::LessEq => ordering.is_le(),
        Operator::Greater => ordering.is_gt(),
        _ => ordering.is_ge(),
    })
}

// ══════════════════════════════════════════════════════════════════════════
// Unary
// ══════════════════════════════════════════════════════════════════════════

/// Unary `+` copies; unary `-` negates signed kinds and leaves `uint` and
/// `bool` unchanged.
pub fn unary_operation(op: Operator, operand: &Value) -> EvalResult<Value> {
    let s = operand.scalar()?;
    let result = match op {
        Operator::Add => s,
        Operator::Sub => match s {
            Scalar::Int(n) => Scalar::Int(n.checked_neg().ok_or(EvalError::ArithmeticOverflow("-"))?),
            Scalar::Float(n) => Scalar::Float(-n),
            Scalar::UInt(_) | Scalar::Bool(_) => s,
        },
        _ => return Err(invalid(op, s.kind())),
    };
    Ok(Value::from_scalar(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bin(op: Operator, l: Value, r: Value) -> EvalResult<Scalar> {
        binary_operation(op, &l, &r)?.scalar()
    }

    #[test]
    fn test_right_operand_follows_left_kind() {
        assert_eq!(bin(Operator::Add, Value::new(1i64), Value::new(2.9f64)), Ok(Scalar::Int(3)));
        assert_eq!(bin(Operator::Add, Value::new(1.5f64), Value::new(2i64)), Ok(Scalar::Float(3.5)));
        assert_eq!(bin(Operator::Eq, Value::new(true), Value::new(5i64)), Ok(Scalar::Bool(true)));
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(bin(Operator::Div, Value::new(1i64), Value::new(0i64)), Err(EvalError::DivideByZero));
        assert_eq!(bin(Operator::Div, Value::new(1.0f64), Value::new(0i64)), Err(EvalError::DivideByZero));
        assert_eq!(bin(Operator::Div, Value::new(7u64), Value::new(0.0f64)), Err(EvalError::DivideByZero));
    }

    #[test]
    fn test_checked_overflow() {
        assert_eq!(
            bin(Operator::Add, Value::new(i64::MAX), Value::new(1i64)),
            Err(EvalError::ArithmeticOverflow("+"))
        );
        assert_eq!(
            bin(Operator::Sub, Value::new(0u64), Value::new(1u64)),
            Err(EvalError::ArithmeticOverflow("-"))
        );
        assert!(unary_operation(Operator::Sub, &Value::new(i64::MIN)).is_err());
    }

    #[test]
    fn test_bool_rejects_arithmetic_and_ordering() {
        for op in [Operator::Add, Operator::Mul, Operator::Less, Operator::GreaterEq] {
            assert!(matches!(
                bin(op, Value::new(true), Value::new(false)),
                Err(EvalError::InvalidOperation(_))
            ));
        }
        assert_eq!(bin(Operator::NotEq, Value::new(true), Value::new(false)), Ok(Scalar::Bool(true)));
    }

    #[test]
    fn test_assignment_writes_through() {
        let x = Value::new(10i64);
        let returned = binary_operation(Operator::AddAssign, &x, &Value::new(5i64)).unwrap();
        assert_eq!(x.scalar(), Ok(Scalar::Int(15)));
        assert!(returned.same_storage(&x));

        binary_operation(Operator::Assign, &x, &Value::new(2.7f64)).unwrap();
        assert_eq!(x.scalar(), Ok(Scalar::Int(2)));
    }

    #[test]
    fn test_assignment_to_const_fails() {
        let x = Value::new_const(1i64);
        assert_eq!(
            binary_operation(Operator::Assign, &x, &Value::new(2i64)).unwrap_err(),
            EvalError::ConstAssignment
        );
        assert_eq!(x.scalar(), Ok(Scalar::Int(1)));
    }

    #[test]
    fn test_compound_assignment_on_bool_is_invalid() {
        let flag = Value::new(true);
        assert!(binary_operation(Operator::AddAssign, &flag, &Value::new(true)).is_err());
        binary_operation(Operator::Assign, &flag, &Value::new(0i64)).unwrap();
        assert_eq!(flag.scalar(), Ok(Scalar::Bool(false)));
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary_operation(Operator::Sub, &Value::new(4i64)).unwrap().scalar(), Ok(Scalar::Int(-4)));
        assert_eq!(unary_operation(Operator::Sub, &Value::new(4u64)).unwrap().scalar(), Ok(Scalar::UInt(4)));
        assert_eq!(unary_operation(Operator::Sub, &Value::new(true)).unwrap().scalar(), Ok(Scalar::Bool(true)));

        let original = Value::new(2.5f64);
        let copy = unary_operation(Operator::Add, &original).unwrap();
        assert!(!copy.same_storage(&original));
    }

    #[test]
    fn test_checked_conversions() {
        assert!(Scalar::Int(-1).convert(ArithmeticKind::UInt).is_err());
        assert!(Scalar::Float(f64::NAN).convert(ArithmeticKind::Int).is_err());
        assert!(Scalar::Float(1e300).convert(ArithmeticKind::Int).is_err());
        assert_eq!(Scalar::Float(-2.9).convert(ArithmeticKind::Int), Ok(Scalar::Int(-2)));
        assert_eq!(Scalar::UInt(3).convert(ArithmeticKind::Bool), Ok(Scalar::Bool(true)));
        assert_eq!(Scalar::Bool(true).convert(ArithmeticKind::Float), Ok(Scalar::Float(1.0)));
    }
}
