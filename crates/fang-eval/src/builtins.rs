//! The standard prelude: core type names, string objects, and a handful of
//! global functions.

use crate::callable::Callable;
use crate::error::{EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::object::{Behavior, Object};
use crate::type_info::TypeInfo;
use crate::value::Value;

pub fn install(interp: &mut Interpreter) {
    interp.add_type::<i64>("int");
    interp.add_type::<u64>("uint");
    interp.add_type::<f64>("float");
    interp.add_type::<bool>("bool");
    interp.add_type::<String>("string");
    interp.add_type::<Object>("object");
    interp.add_type::<Callable>("function");
    interp.add_type_info("any", TypeInfo::any());

    // Natives typed on `String` accept string objects.
    interp.add_cast(
        TypeInfo::create::<String>(),
        TypeInfo::create::<Object>(),
        false,
        |value| {
            value.as_string().map(Value::new).ok_or_else(|| EvalError::CannotCast {
                from: value.type_info().to_string(),
                to: "string".to_string(),
            })
        },
    );

    let methods = StringMethods::new();
    interp.set_string_factory(move |text| methods.build(text));

    interp.add_function("print", Callable::variadic(print));
    interp.add_function(
        "to_string",
        Callable::native(vec![TypeInfo::any()], TypeInfo::create::<String>(), |interp, args| {
            Ok(Value::new(receiver(args)?.to_string(interp)?))
        }),
    );
    interp.add_function(
        "copy",
        Callable::native(vec![TypeInfo::any()], TypeInfo::any(), |interp, args| {
            receiver(args)?.copy(interp)
        }),
    );
}

/// Write the space-joined text of every argument as one output line.
fn print(interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let parts = args
        .iter()
        .map(|arg| arg.to_string(interp))
        .collect::<EvalResult<Vec<_>>>()?;
    let line = parts.join(" ");
    tracing::debug!(%line, "print");
    interp.write_output(line);
    Ok(Value::void())
}

fn receiver(args: &[Value]) -> EvalResult<&Value> {
    args.first().ok_or(EvalError::ArgumentCount {
        expected: 1,
        found: 0,
    })
}

fn text_of(value: &Value) -> EvalResult<String> {
    value.as_string().ok_or_else(|| EvalError::TypeMismatch {
        expected: "string".to_string(),
        found: value.type_info().to_string(),
    })
}

// ══════════════════════════════════════════════════════════════════════════
// String objects
// ══════════════════════════════════════════════════════════════════════════

/// Behavior members shared by every string object.
struct StringMethods {
    members: Vec<(&'static str, Value)>,
}

impl StringMethods {
    fn new() -> Self {
        let this = TypeInfo::create::<Object>().as_const();
        let any = TypeInfo::any();
        let string = TypeInfo::create::<String>();
        let members = vec![
            (Behavior::ToString.key(), method(vec![this], string, |_, args| {
                Ok(Value::new(text_of(receiver(args)?)?))
            })),
            (Behavior::Copy.key(), method(vec![this], TypeInfo::create::<Object>(), |interp, args| {
                interp.string(text_of(receiver(args)?)?)
            })),
            (Behavior::Add.key(), method(vec![this, any], string, |interp, args| {
                let [left, right] = args else {
                    return Err(EvalError::ArgumentCount { expected: 2, found: args.len() });
                };
                let mut text = text_of(left)?;
                text.push_str(&right.to_string(interp)?);
                Ok(Value::new(text))
            })),
            (Behavior::Eq.key(), method(vec![this, any], TypeInfo::create::<bool>(), |_, args| {
                Ok(Value::new(same_text(args)?))
            })),
            (Behavior::Ne.key(), method(vec![this, any], TypeInfo::create::<bool>(), |_, args| {
                Ok(Value::new(!same_text(args)?))
            })),
            (Behavior::Assign.key(), method(vec![any, any], any, |interp, args| {
                let [target, source] = args else {
                    return Err(EvalError::ArgumentCount { expected: 2, found: args.len() });
                };
                let text = source.to_string(interp)?;
                replace_text(target, text)
            })),
            (Behavior::AddAssign.key(), method(vec![any, any], any, |interp, args| {
                let [target, suffix] = args else {
                    return Err(EvalError::ArgumentCount { expected: 2, found: args.len() });
                };
                let mut text = text_of(target)?;
                text.push_str(&suffix.to_string(interp)?);
                replace_text(target, text)
            })),
            ("length", method(vec![this], TypeInfo::create::<i64>(), |_, args| {
                let length = text_of(receiver(args)?)?.chars().count();
                let length = i64::try_from(length).map_err(|_| EvalError::ArithmeticOverflow("length"))?;
                Ok(Value::new(length))
            })),
        ];
        Self { members }
    }

    fn build(&self, text: String) -> Value {
        let object = self
            .members
            .iter()
            .fold(Object::new(), |object, (name, method)| object.with(*name, method.clone()));
        Value::new(object.with(Behavior::Object.key(), Value::new(text)))
    }
}

type Method = fn(&mut Interpreter, &[Value]) -> EvalResult<Value>;

fn method(params: Vec<TypeInfo>, ret: TypeInfo, f: Method) -> Value {
    Value::new_const(Callable::native(params, ret, f))
}

fn same_text(args: &[Value]) -> EvalResult<bool> {
    let [left, right] = args else {
        return Err(EvalError::ArgumentCount {
            expected: 2,
            found: args.len(),
        });
    };
    Ok(right.as_string().is_some_and(|right| text_of(left).is_ok_and(|left| left == right)))
}

/// Swap the payload of a string object in place and return the object.
fn replace_text(target: &Value, text: String) -> EvalResult<Value> {
    if target.is_const() {
        return Err(EvalError::ConstAssignment);
    }
    let mut object = target.get_mut::<Object>().ok_or_else(|| EvalError::TypeMismatch {
        expected: "string".to_string(),
        found: target.type_info().to_string(),
    })?;
    object.insert(Behavior::Object.key(), Value::new(text));
    drop(object);
    Ok(target.clone())
}
