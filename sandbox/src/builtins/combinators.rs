//! The utility library, bound as `R`. Functions follow JavaScript's
//! permissive conventions: predicates are judged by truthiness, missing
//! elements are `undefined`, and arithmetic coerces its operands.

use crate::error::RuntimeError;
use crate::runtime_value::RuntimeValue;

use super::safety::{concat_values, fmap};
use super::{
    Builtin, BuiltinFn, Caller, expect_array, expect_function, expect_integer, expect_string,
    resolve_index,
};

type Result<T> = std::result::Result<T, RuntimeError>;

const FUNCTIONS: &[(&str, usize, BuiltinFn)] = &[
    ("identity", 1, identity),
    ("always", 1, always),
    ("add", 2, add),
    ("subtract", 2, subtract),
    ("multiply", 2, multiply),
    ("divide", 2, divide),
    ("modulo", 2, modulo),
    ("inc", 1, inc),
    ("dec", 1, dec),
    ("negate", 1, negate),
    ("sum", 1, sum),
    ("product", 1, product),
    ("max", 2, max),
    ("min", 2, min),
    ("map", 2, map),
    ("filter", 2, filter),
    ("reject", 2, reject),
    ("reduce", 3, reduce),
    ("head", 1, head),
    ("tail", 1, tail),
    ("last", 1, last),
    ("init", 1, init),
    ("nth", 2, nth),
    ("length", 1, length),
    ("reverse", 1, reverse),
    ("concat", 2, concat),
    ("join", 2, join),
    ("split", 2, split),
    ("range", 2, range),
    ("prop", 2, prop),
    ("pluck", 2, pluck),
    ("keys", 1, keys),
    ("values", 1, values),
    ("includes", 2, includes),
    ("uniq", 1, uniq),
    ("take", 2, take),
    ("drop", 2, drop),
    ("zip", 2, zip),
    ("append", 2, append),
    ("prepend", 2, prepend),
    ("all", 2, all),
    ("any", 2, any),
    ("find", 2, find),
    ("toUpper", 1, to_upper),
    ("toLower", 1, to_lower),
    ("trim", 1, trim),
    ("equals", 2, equals),
    ("not", 1, not),
    ("isNil", 1, is_nil),
    ("defaultTo", 2, default_to),
];

pub fn namespace() -> RuntimeValue {
    let mut entries = super::namespace(FUNCTIONS);
    let variadic: [(&'static str, BuiltinFn); 4] = [
        ("T", |_, _| Ok(RuntimeValue::Boolean(true))),
        ("F", |_, _| Ok(RuntimeValue::Boolean(false))),
        ("compose", compose),
        ("pipe", pipe),
    ];
    entries.extend(variadic.into_iter().map(|(name, imp)| {
        (
            name.to_string(),
            RuntimeValue::builtin(Builtin::variadic(name, imp)),
        )
    }));
    RuntimeValue::object(entries)
}

fn number(n: f64) -> Result<RuntimeValue> {
    Ok(RuntimeValue::Number(n))
}

fn identity(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(args[0].clone())
}

/// `always(x)` is a function that ignores its arguments and returns `x`.
fn always(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::builtin(
        Builtin::variadic("always", |args, _| Ok(args[0].clone()))
            .with_applied(vec![args[0].clone()]),
    ))
}

fn add(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(args[0].to_number() + args[1].to_number())
}

fn subtract(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(args[0].to_number() - args[1].to_number())
}

fn multiply(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(args[0].to_number() * args[1].to_number())
}

fn divide(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(args[0].to_number() / args[1].to_number())
}

fn modulo(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(args[0].to_number() % args[1].to_number())
}

fn inc(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(args[0].to_number() + 1.0)
}

fn dec(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(args[0].to_number() - 1.0)
}

fn negate(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(-args[0].to_number())
}

fn sum(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(expect_array("sum", &args[0])?.iter().map(RuntimeValue::to_number).sum())
}

fn product(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(
        expect_array("product", &args[0])?
            .iter()
            .map(RuntimeValue::to_number)
            .product(),
    )
}

fn max(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(if args[1].to_number() > args[0].to_number() {
        args[1].clone()
    } else {
        args[0].clone()
    })
}

fn min(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(if args[1].to_number() < args[0].to_number() {
        args[1].clone()
    } else {
        args[0].clone()
    })
}

fn map(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    fmap("map", &args[0], &args[1], caller)
}

fn select(function: &str, args: &[RuntimeValue], caller: &Caller, keep: bool) -> Result<RuntimeValue> {
    let predicate = expect_function(function, &args[0])?;
    match &args[1] {
        RuntimeValue::Array(items) => {
            let mut out = Vec::new();
            for item in items.iter() {
                if caller.call1(predicate, item.clone())?.is_truthy() == keep {
                    out.push(item.clone());
                }
            }
            Ok(RuntimeValue::array(out))
        }
        RuntimeValue::Object(entries) => {
            let mut out = Vec::new();
            for (key, value) in entries.iter() {
                if caller.call1(predicate, value.clone())?.is_truthy() == keep {
                    out.push((key.clone(), value.clone()));
                }
            }
            Ok(RuntimeValue::object(out))
        }
        other => Err(RuntimeError::invalid_argument(
            function,
            "an Array or an Object",
            other.show(),
        )),
    }
}

fn filter(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    select("filter", args, caller, true)
}

fn reject(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    select("reject", args, caller, false)
}

fn reduce(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let f = expect_function("reduce", &args[0])?;
    expect_array("reduce", &args[2])?
        .iter()
        .try_fold(args[1].clone(), |acc, x| caller.call2(f, acc, x.clone()))
}

/// Element `index` of an array or string; out of range is `undefined` for
/// arrays and `""` for strings.
fn element(function: &str, index: i64, value: &RuntimeValue) -> Result<RuntimeValue> {
    match value {
        RuntimeValue::Array(items) => Ok(resolve_index(index, items.len())
            .map_or(RuntimeValue::Undefined, |i| items[i].clone())),
        RuntimeValue::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            Ok(RuntimeValue::String(
                resolve_index(index, chars.len())
                    .map(|i| chars[i].to_string())
                    .unwrap_or_default(),
            ))
        }
        other => Err(RuntimeError::invalid_argument(
            function,
            "an Array or a String",
            other.show(),
        )),
    }
}

/// `start..end` of an array or string, with both bounds clamped.
pub(crate) fn slice(function: &str, value: &RuntimeValue, start: i64, end: Option<i64>) -> Result<RuntimeValue> {
    let clamp = |len: usize, n: i64| -> usize {
        let len = len as i64;
        (if n < 0 { len + n } else { n }).clamp(0, len) as usize
    };
    match value {
        RuntimeValue::Array(items) => {
            let len = items.len();
            let (start, end) = (clamp(len, start), clamp(len, end.unwrap_or(len as i64)));
            Ok(RuntimeValue::array(
                items.get(start..end.max(start)).unwrap_or_default().to_vec(),
            ))
        }
        RuntimeValue::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let len = chars.len();
            let (start, end) = (clamp(len, start), clamp(len, end.unwrap_or(len as i64)));
            Ok(RuntimeValue::String(
                chars.get(start..end.max(start)).unwrap_or_default().iter().collect(),
            ))
        }
        other => Err(RuntimeError::invalid_argument(
            function,
            "an Array or a String",
            other.show(),
        )),
    }
}

fn head(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    element("head", 0, &args[0])
}

fn tail(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    slice("tail", &args[0], 1, None)
}

fn last(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    element("last", -1, &args[0])
}

fn init(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    slice("init", &args[0], 0, Some(-1))
}

fn nth(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let index = expect_integer("nth", &args[0])?;
    element("nth", index, &args[1])
}

fn length(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    match &args[0] {
        RuntimeValue::Array(items) => number(items.len() as f64),
        RuntimeValue::String(s) => number(s.chars().count() as f64),
        _ => number(f64::NAN),
    }
}

fn reverse(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    match &args[0] {
        RuntimeValue::Array(items) => Ok(RuntimeValue::array(items.iter().rev().cloned().collect())),
        RuntimeValue::String(s) => Ok(RuntimeValue::String(s.chars().rev().collect())),
        other => Err(RuntimeError::invalid_argument(
            "reverse",
            "an Array or a String",
            other.show(),
        )),
    }
}

fn concat(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    concat_values("concat", &args[0], &args[1])
}

fn join(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let separator = expect_string("join", &args[0])?;
    let items = expect_array("join", &args[1])?;
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
            .join(separator),
    ))
}

fn split(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let separator = expect_string("split", &args[0])?;
    let s = expect_string("split", &args[1])?;
    Ok(split_string(s, separator))
}

/// `String.prototype.split`: an empty separator splits into characters.
pub(crate) fn split_string(s: &str, separator: &str) -> RuntimeValue {
    let parts: Vec<RuntimeValue> = if separator.is_empty() {
        s.chars().map(|c| RuntimeValue::String(c.to_string())).collect()
    } else {
        s.split(separator).map(RuntimeValue::string).collect()
    };
    RuntimeValue::array(parts)
}

fn range(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let start = expect_integer("range", &args[0])?;
    let end = expect_integer("range", &args[1])?;
    Ok(RuntimeValue::array(
        (start..end).map(|n| RuntimeValue::Number(n as f64)).collect(),
    ))
}

fn lookup(key: &RuntimeValue, value: &RuntimeValue) -> RuntimeValue {
    match (key, value) {
        (RuntimeValue::String(key), RuntimeValue::Object(entries)) => entries
            .iter()
            .find(|(k, _)| k == key)
            .map_or(RuntimeValue::Undefined, |(_, v)| v.clone()),
        (RuntimeValue::Number(i), RuntimeValue::Array(items)) if i.fract() == 0.0 && *i >= 0.0 => {
            items.get(*i as usize).cloned().unwrap_or(RuntimeValue::Undefined)
        }
        _ => RuntimeValue::Undefined,
    }
}

fn prop(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(lookup(&args[0], &args[1]))
}

fn pluck(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let items = expect_array("pluck", &args[1])?;
    Ok(RuntimeValue::array(
        items.iter().map(|item| lookup(&args[0], item)).collect(),
    ))
}

fn keys(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(match &args[0] {
        RuntimeValue::Object(entries) => RuntimeValue::array(
            entries
                .iter()
                .map(|(k, _)| RuntimeValue::String(k.clone()))
                .collect(),
        ),
        _ => RuntimeValue::array(Vec::new()),
    })
}

fn values(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(match &args[0] {
        RuntimeValue::Object(entries) => {
            RuntimeValue::array(entries.iter().map(|(_, v)| v.clone()).collect())
        }
        _ => RuntimeValue::array(Vec::new()),
    })
}

fn includes(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::Boolean(match (&args[0], &args[1]) {
        (needle, RuntimeValue::Array(items)) => items.iter().any(|x| x == needle),
        (RuntimeValue::String(needle), RuntimeValue::String(s)) => s.contains(needle.as_str()),
        (_, other) => {
            return Err(RuntimeError::invalid_argument(
                "includes",
                "an Array or a String",
                other.show(),
            ));
        }
    }))
}

fn uniq(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let mut out: Vec<RuntimeValue> = Vec::new();
    for item in expect_array("uniq", &args[0])?.iter() {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    Ok(RuntimeValue::array(out))
}

fn take(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let n = expect_integer("take", &args[0])?.max(0);
    slice("take", &args[1], 0, Some(n))
}

fn drop(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let n = expect_integer("drop", &args[0])?.max(0);
    slice("drop", &args[1], n, None)
}

fn zip(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let a = expect_array("zip", &args[0])?;
    let b = expect_array("zip", &args[1])?;
    Ok(RuntimeValue::array(
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| RuntimeValue::array(vec![x.clone(), y.clone()]))
            .collect(),
    ))
}

fn append(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let mut out = expect_array("append", &args[1])?.to_vec();
    out.push(args[0].clone());
    Ok(RuntimeValue::array(out))
}

fn prepend(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let mut out = vec![args[0].clone()];
    out.extend(expect_array("prepend", &args[1])?.iter().cloned());
    Ok(RuntimeValue::array(out))
}

fn all(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let predicate = expect_function("all", &args[0])?;
    for item in expect_array("all", &args[1])?.iter() {
        if caller.call1(predicate, item.clone())?.is_falsy() {
            return Ok(RuntimeValue::Boolean(false));
        }
    }
    Ok(RuntimeValue::Boolean(true))
}

fn any(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let predicate = expect_function("any", &args[0])?;
    for item in expect_array("any", &args[1])?.iter() {
        if caller.call1(predicate, item.clone())?.is_truthy() {
            return Ok(RuntimeValue::Boolean(true));
        }
    }
    Ok(RuntimeValue::Boolean(false))
}

fn find(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let predicate = expect_function("find", &args[0])?;
    for item in expect_array("find", &args[1])?.iter() {
        if caller.call1(predicate, item.clone())?.is_truthy() {
            return Ok(item.clone());
        }
    }
    Ok(RuntimeValue::Undefined)
}

fn to_upper(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::String(expect_string("toUpper", &args[0])?.to_uppercase()))
}

fn to_lower(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::String(expect_string("toLower", &args[0])?.to_lowercase()))
}

fn trim(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::string(expect_string("trim", &args[0])?.trim()))
}

fn equals(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::Boolean(args[0] == args[1]))
}

fn not(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::Boolean(args[0].is_falsy()))
}

fn is_nil(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::Boolean(args[0].is_nullish()))
}

fn default_to(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let value = &args[1];
    let missing = value.is_nullish() || matches!(value, RuntimeValue::Number(n) if n.is_nan());
    Ok(if missing { args[0].clone() } else { value.clone() })
}

/// `compose(f, g, h)` returns `(...args) => f(g(h(...args)))`; `pipe` runs
/// the same functions left to right.
fn compose(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    composition("compose", args.iter().rev().cloned().collect())
}

fn pipe(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    composition("pipe", args.to_vec())
}

fn composition(name: &'static str, functions: Vec<RuntimeValue>) -> Result<RuntimeValue> {
    if functions.is_empty() {
        return Err(RuntimeError::Custom(format!(
            "{} requires at least one argument",
            name
        )));
    }
    for f in &functions {
        expect_function(name, f)?;
    }
    Ok(RuntimeValue::builtin(
        Builtin::variadic(name, run_composition).with_applied(vec![RuntimeValue::array(functions)]),
    ))
}

/// The first applied argument holds the functions in call order.
fn run_composition(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let functions = expect_array("compose", &args[0])?;
    let Some((first, rest)) = functions.split_first() else {
        return Ok(RuntimeValue::Undefined);
    };
    let initial = caller.call(first, args[1..].to_vec())?;
    rest.iter().try_fold(initial, |acc, f| caller.call1(f, acc))
}
