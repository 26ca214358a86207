//! Property access on runtime values.
//!
//! Methods are returned as variadic built-ins with the receiver already
//! applied, so `xs.map` is a value in its own right and `xs.map(f)` is an
//! ordinary call.

use crate::error::RuntimeError;
use crate::runtime_value::{Function, RuntimeValue};

use super::combinators::{slice, split_string};
use super::{Builtin, BuiltinFn, Caller, expect_array, expect_function, expect_string};

type Result<T> = std::result::Result<T, RuntimeError>;

/// Read `value.name`.
pub fn property(value: &RuntimeValue, name: &str) -> Result<RuntimeValue> {
    if value.is_nullish() {
        return Err(RuntimeError::NullishProperty {
            value: value.show(),
            property: name.to_string(),
        });
    }

    if let Some(found) = field(value, name) {
        return Ok(found);
    }

    let method = match value {
        RuntimeValue::Array(_) => array_method(name),
        RuntimeValue::String(_) => string_method(name),
        RuntimeValue::Number(_) => number_method(name),
        _ => None,
    };
    let method = method.or_else(|| (name == "toString").then_some(("toString", to_string as BuiltinFn)));

    Ok(match method {
        Some((name, imp)) => {
            RuntimeValue::builtin(Builtin::variadic(name, imp).with_applied(vec![value.clone()]))
        }
        None => RuntimeValue::Undefined,
    })
}

/// Plain data properties, as opposed to methods.
fn field(value: &RuntimeValue, name: &str) -> Option<RuntimeValue> {
    let boolean = |b: bool| Some(RuntimeValue::Boolean(b));
    match (value, name) {
        (RuntimeValue::Object(entries), _) => entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone()),
        (RuntimeValue::Array(items), "length") => Some(RuntimeValue::Number(items.len() as f64)),
        (RuntimeValue::String(s), "length") => Some(RuntimeValue::Number(s.chars().count() as f64)),
        (RuntimeValue::Just(x) | RuntimeValue::Left(x) | RuntimeValue::Right(x), "value") => {
            Some((**x).clone())
        }
        (RuntimeValue::Just(_) | RuntimeValue::Nothing, "isJust") => {
            boolean(matches!(value, RuntimeValue::Just(_)))
        }
        (RuntimeValue::Just(_) | RuntimeValue::Nothing, "isNothing") => {
            boolean(matches!(value, RuntimeValue::Nothing))
        }
        (RuntimeValue::Left(_) | RuntimeValue::Right(_), "isLeft") => {
            boolean(matches!(value, RuntimeValue::Left(_)))
        }
        (RuntimeValue::Left(_) | RuntimeValue::Right(_), "isRight") => {
            boolean(matches!(value, RuntimeValue::Right(_)))
        }
        (RuntimeValue::Function(Function::Closure(closure)), "length") => {
            Some(RuntimeValue::Number(closure.function.params.len() as f64))
        }
        (RuntimeValue::Function(Function::Closure(_)), "name") => Some(RuntimeValue::string("")),
        (RuntimeValue::Function(Function::Builtin(builtin)), "length") => {
            Some(RuntimeValue::Number(builtin.remaining() as f64))
        }
        (RuntimeValue::Function(Function::Builtin(builtin)), "name") => {
            Some(RuntimeValue::string(builtin.name))
        }
        (RuntimeValue::TypeRep(rep), "name") => Some(RuntimeValue::string(rep.name())),
        _ => None,
    }
}

fn arg(args: &[RuntimeValue], i: usize) -> RuntimeValue {
    args.get(i).cloned().unwrap_or(RuntimeValue::Undefined)
}

/// An optional integer argument, `ToIntegerOrInfinity` style.
fn integer_arg(args: &[RuntimeValue], i: usize) -> Option<i64> {
    match arg(args, i) {
        RuntimeValue::Undefined => None,
        value => {
            let n = value.to_number();
            Some(if n.is_nan() { 0 } else { n.trunc() as i64 })
        }
    }
}

/// `Array.prototype.includes` equality: strict, except that `NaN` finds `NaN`.
fn same_value_zero(a: &RuntimeValue, b: &RuntimeValue) -> bool {
    match (a, b) {
        (RuntimeValue::Number(x), RuntimeValue::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => a.strict_equals(b),
    }
}

fn to_string(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::String(args[0].to_js_string()))
}

// ---------------------------------------------------------------------------
// Arrays
// ---------------------------------------------------------------------------

fn array_method(name: &str) -> Option<(&'static str, BuiltinFn)> {
    let method: (&'static str, BuiltinFn) = match name {
        "map" => ("map", array_map),
        "filter" => ("filter", array_filter),
        "reduce" => ("reduce", array_reduce),
        "join" => ("join", array_join),
        "concat" => ("concat", array_concat),
        "slice" => ("slice", sequence_slice),
        "includes" => ("includes", array_includes),
        "indexOf" => ("indexOf", array_index_of),
        "reverse" => ("reverse", array_reverse),
        "every" => ("every", array_every),
        "some" => ("some", array_some),
        "find" => ("find", array_find),
        _ => return None,
    };
    Some(method)
}

fn receiver_array(method: &str, args: &[RuntimeValue]) -> Result<std::rc::Rc<Vec<RuntimeValue>>> {
    expect_array(method, &args[0])
}

fn callback<'a>(method: &str, args: &'a [RuntimeValue]) -> Result<&'a RuntimeValue> {
    match args.get(1) {
        Some(f) => expect_function(method, f),
        None => Err(RuntimeError::Type(format!(
            "undefined is not a function (in {})",
            method
        ))),
    }
}

fn array_map(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let f = callback("map", args)?;
    let items = receiver_array("map", args)?;
    Ok(RuntimeValue::array(
        items
            .iter()
            .map(|x| caller.call1(f, x.clone()))
            .collect::<Result<Vec<_>>>()?,
    ))
}

fn array_filter(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let f = callback("filter", args)?;
    let mut out = Vec::new();
    for item in receiver_array("filter", args)?.iter() {
        if caller.call1(f, item.clone())?.is_truthy() {
            out.push(item.clone());
        }
    }
    Ok(RuntimeValue::array(out))
}

fn array_reduce(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let f = callback("reduce", args)?;
    let items = receiver_array("reduce", args)?;
    let mut iter = items.iter().cloned();
    let initial = match args.get(2) {
        Some(initial) => initial.clone(),
        None => iter.next().ok_or_else(|| {
            RuntimeError::Type("Reduce of empty array with no initial value".to_string())
        })?,
    };
    iter.try_fold(initial, |acc, x| caller.call2(f, acc, x))
}

fn array_join(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let separator = match arg(args, 1) {
        RuntimeValue::Undefined => ",".to_string(),
        other => other.to_js_string(),
    };
    let items = receiver_array("join", args)?;
    Ok(RuntimeValue::String(
        items
            .iter()
            .map(|item| {
                if item.is_nullish() {
                    String::new()
                } else {
                    item.to_js_string()
                }
            })
            .collect::<Vec<_>>()
            .join(&separator),
    ))
}

fn array_concat(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let mut out = receiver_array("concat", args)?.to_vec();
    for extra in &args[1..] {
        match extra {
            RuntimeValue::Array(items) => out.extend(items.iter().cloned()),
            other => out.push(other.clone()),
        }
    }
    Ok(RuntimeValue::array(out))
}

fn sequence_slice(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let start = integer_arg(args, 1).unwrap_or(0);
    slice("slice", &args[0], start, integer_arg(args, 2))
}

fn array_includes(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let needle = arg(args, 1);
    let items = receiver_array("includes", args)?;
    Ok(RuntimeValue::Boolean(
        items.iter().any(|x| same_value_zero(x, &needle)),
    ))
}

fn array_index_of(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let needle = arg(args, 1);
    let items = receiver_array("indexOf", args)?;
    let index = items.iter().position(|x| x.strict_equals(&needle));
    Ok(RuntimeValue::Number(index.map_or(-1.0, |i| i as f64)))
}

fn array_reverse(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let items = receiver_array("reverse", args)?;
    Ok(RuntimeValue::array(items.iter().rev().cloned().collect()))
}

fn array_every(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let f = callback("every", args)?;
    for item in receiver_array("every", args)?.iter() {
        if caller.call1(f, item.clone())?.is_falsy() {
            return Ok(RuntimeValue::Boolean(false));
        }
    }
    Ok(RuntimeValue::Boolean(true))
}

fn array_some(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let f = callback("some", args)?;
    for item in receiver_array("some", args)?.iter() {
        if caller.call1(f, item.clone())?.is_truthy() {
            return Ok(RuntimeValue::Boolean(true));
        }
    }
    Ok(RuntimeValue::Boolean(false))
}

fn array_find(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let f = callback("find", args)?;
    for item in receiver_array("find", args)?.iter() {
        if caller.call1(f, item.clone())?.is_truthy() {
            return Ok(item.clone());
        }
    }
    Ok(RuntimeValue::Undefined)
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

fn string_method(name: &str) -> Option<(&'static str, BuiltinFn)> {
    let method: (&'static str, BuiltinFn) = match name {
        "toUpperCase" => ("toUpperCase", to_upper_case),
        "toLowerCase" => ("toLowerCase", to_lower_case),
        "trim" => ("trim", trim),
        "split" => ("split", string_split),
        "concat" => ("concat", string_concat),
        "slice" => ("slice", sequence_slice),
        "includes" => ("includes", string_includes),
        "startsWith" => ("startsWith", starts_with),
        "endsWith" => ("endsWith", ends_with),
        "indexOf" => ("indexOf", string_index_of),
        "repeat" => ("repeat", string_repeat),
        "charAt" => ("charAt", string_char_at),
        _ => return None,
    };
    Some(method)
}

fn receiver<'a>(method: &str, args: &'a [RuntimeValue]) -> Result<&'a str> {
    expect_string(method, &args[0])
}

fn search(method: &str, args: &[RuntimeValue], test: fn(&str, &str) -> bool) -> Result<RuntimeValue> {
    let s = receiver(method, args)?;
    let needle = arg(args, 1).to_js_string();
    Ok(RuntimeValue::Boolean(test(s, &needle)))
}

fn to_upper_case(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::String(receiver("toUpperCase", args)?.to_uppercase()))
}

fn to_lower_case(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::String(receiver("toLowerCase", args)?.to_lowercase()))
}

fn trim(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::string(receiver("trim", args)?.trim()))
}

fn string_includes(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    search("includes", args, |s, n| s.contains(n))
}

fn starts_with(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    search("startsWith", args, |s, n| s.starts_with(n))
}

fn ends_with(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    search("endsWith", args, |s, n| s.ends_with(n))
}

fn string_split(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let s = receiver("split", args)?;
    Ok(match arg(args, 1) {
        RuntimeValue::Undefined => RuntimeValue::array(vec![RuntimeValue::string(s)]),
        separator => split_string(s, &separator.to_js_string()),
    })
}

fn string_concat(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let mut out = receiver("concat", args)?.to_string();
    for extra in &args[1..] {
        out.push_str(&extra.to_js_string());
    }
    Ok(RuntimeValue::String(out))
}

fn string_index_of(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let s = receiver("indexOf", args)?;
    let needle = arg(args, 1).to_js_string();
    Ok(RuntimeValue::Number(match s.find(&needle) {
        Some(byte) => s[..byte].chars().count() as f64,
        None => -1.0,
    }))
}

fn string_repeat(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let s = receiver("repeat", args)?;
    match integer_arg(args, 1).unwrap_or(0) {
        n if n < 0 => Err(RuntimeError::Range(format!("Invalid count value: {}", n))),
        n => Ok(RuntimeValue::String(s.repeat(n as usize))),
    }
}

fn string_char_at(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let s = receiver("charAt", args)?;
    let index = integer_arg(args, 1).unwrap_or(0);
    let c = usize::try_from(index).ok().and_then(|i| s.chars().nth(i));
    Ok(RuntimeValue::String(c.map(String::from).unwrap_or_default()))
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

fn number_method(name: &str) -> Option<(&'static str, BuiltinFn)> {
    match name {
        "toFixed" => Some(("toFixed", to_fixed)),
        _ => None,
    }
}

fn to_fixed(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let n = args[0].to_number();
    let digits = integer_arg(args, 1).unwrap_or(0);
    if !(0..=100).contains(&digits) {
        return Err(RuntimeError::Range(
            "toFixed() digits argument must be between 0 and 100".to_string(),
        ));
    }
    if !n.is_finite() || n.abs() >= 1e21 {
        return Ok(RuntimeValue::String(args[0].to_js_string()));
    }
    Ok(RuntimeValue::String(format!("{:.*}", digits as usize, n)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_method(receiver: RuntimeValue, name: &str, args: Vec<RuntimeValue>) -> RuntimeValue {
        let method = property(&receiver, name).unwrap();
        crate::evaluator::apply(&method, args, 0).unwrap()
    }

    #[test]
    fn nullish_receivers_raise_type_errors() {
        let err = property(&RuntimeValue::Undefined, "length").unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: Cannot read properties of undefined (reading 'length')"
        );
    }

    #[test]
    fn unknown_properties_are_undefined() {
        assert_eq!(
            property(&RuntimeValue::Number(1.0), "nope").unwrap(),
            RuntimeValue::Undefined
        );
    }

    #[test]
    fn maybe_fields() {
        let just = RuntimeValue::just(RuntimeValue::Number(1.0));
        assert_eq!(property(&just, "value").unwrap(), RuntimeValue::Number(1.0));
        assert_eq!(property(&just, "isJust").unwrap(), RuntimeValue::Boolean(true));
        assert_eq!(
            property(&RuntimeValue::Nothing, "value").unwrap(),
            RuntimeValue::Undefined
        );
    }

    #[test]
    fn string_methods() {
        let s = RuntimeValue::string("hello");
        assert_eq!(
            call_method(s.clone(), "toUpperCase", vec![]),
            RuntimeValue::string("HELLO")
        );
        assert_eq!(
            call_method(s.clone(), "slice", vec![RuntimeValue::Number(-3.0)]),
            RuntimeValue::string("llo")
        );
        assert_eq!(
            call_method(s, "indexOf", vec![RuntimeValue::string("l")]),
            RuntimeValue::Number(2.0)
        );
    }

    #[test]
    fn to_fixed_rounds() {
        assert_eq!(
            call_method(RuntimeValue::Number(3.14159), "toFixed", vec![RuntimeValue::Number(2.0)]),
            RuntimeValue::string("3.14")
        );
    }

    #[test]
    fn join_defaults_to_commas() {
        let xs = RuntimeValue::array(vec![RuntimeValue::Number(1.0), RuntimeValue::Null]);
        assert_eq!(call_method(xs, "join", vec![]), RuntimeValue::string("1,"));
    }
}
