//! The safety library, bound as `S`: total functions over Maybe and Either
//! in place of exceptions, `null` and `NaN`.

use std::rc::Rc;

use crate::error::RuntimeError;
use crate::runtime_value::RuntimeValue;

use super::{
    Builtin, BuiltinFn, Caller, expect_array, expect_boolean, expect_function, expect_integer,
    expect_number, expect_string, resolve_index, test,
};

type Result<T> = std::result::Result<T, RuntimeError>;

const FUNCTIONS: &[(&str, usize, BuiltinFn)] = &[
    // Combinators
    ("I", 1, identity),
    ("K", 2, constant),
    ("A", 2, apply),
    ("T", 2, thrush),
    ("flip", 3, flip),
    ("compose", 3, compose),
    ("pipe", 2, pipe),
    // Maybe
    ("Just", 1, just),
    ("maybe", 3, maybe),
    ("fromMaybe", 2, from_maybe),
    ("maybeToNullable", 1, maybe_to_nullable),
    ("toMaybe", 1, to_maybe),
    ("isJust", 1, is_just),
    ("isNothing", 1, is_nothing),
    ("justs", 1, justs),
    ("maybeToEither", 2, maybe_to_either),
    ("encase", 2, encase),
    // Either
    ("Left", 1, left),
    ("Right", 1, right),
    ("either", 3, either),
    ("fromEither", 2, from_either),
    ("isLeft", 1, is_left),
    ("isRight", 1, is_right),
    ("lefts", 1, lefts),
    ("rights", 1, rights),
    ("eitherToMaybe", 1, either_to_maybe),
    // Functor, Chain, Foldable
    ("map", 2, map),
    ("chain", 2, chain),
    ("filter", 2, filter),
    ("reject", 2, reject),
    ("reduce", 3, reduce),
    ("concat", 2, concat),
    // Lists
    ("head", 1, head),
    ("tail", 1, tail),
    ("last", 1, last),
    ("init", 1, init),
    ("at", 2, at),
    ("take", 2, take),
    ("drop", 2, drop),
    ("reverse", 1, reverse),
    ("size", 1, size),
    ("append", 2, append),
    ("prepend", 2, prepend),
    ("range", 2, range),
    ("find", 2, find),
    ("elem", 2, elem),
    // Numbers
    ("add", 2, add),
    ("sub", 2, sub),
    ("mult", 2, mult),
    ("div", 2, div),
    ("inc", 1, inc),
    ("dec", 1, dec),
    ("negate", 1, negate),
    ("sum", 1, sum),
    ("product", 1, product),
    ("mean", 1, mean),
    ("min", 2, min),
    ("max", 2, max),
    ("even", 1, even),
    ("odd", 1, odd),
    // Logic and ordering
    ("equals", 2, equals),
    ("lt", 2, lt),
    ("lte", 2, lte),
    ("gt", 2, gt),
    ("gte", 2, gte),
    ("not", 1, not),
    ("and", 2, and),
    ("or", 2, or),
    ("complement", 2, complement),
    // Strings
    ("toUpper", 1, to_upper),
    ("toLower", 1, to_lower),
    ("trim", 1, trim),
    ("words", 1, words),
    ("unwords", 1, unwords),
    ("lines", 1, lines),
    ("unlines", 1, unlines),
    ("splitOn", 2, split_on),
    ("joinWith", 2, join_with),
    ("parseInt", 2, parse_int),
    ("parseFloat", 1, parse_float),
    // Objects and types
    ("prop", 2, prop),
    ("keys", 1, keys),
    ("values", 1, values),
    ("pairs", 1, pairs),
    ("is", 2, is),
    ("show", 1, show),
    ("toString", 1, show),
];

pub fn namespace() -> RuntimeValue {
    let mut entries = super::namespace(FUNCTIONS);
    entries.push(("Nothing".to_string(), RuntimeValue::Nothing));
    RuntimeValue::object(entries)
}

fn boolean(b: bool) -> Result<RuntimeValue> {
    Ok(RuntimeValue::Boolean(b))
}

fn number(n: f64) -> Result<RuntimeValue> {
    Ok(RuntimeValue::Number(n))
}

fn maybe_of(value: Option<RuntimeValue>) -> RuntimeValue {
    value.map_or(RuntimeValue::Nothing, RuntimeValue::just)
}

fn invalid(function: &str, expected: &str, got: &RuntimeValue) -> RuntimeError {
    RuntimeError::invalid_argument(function, expected, got.show())
}

// ---------------------------------------------------------------------------
// Combinators
// ---------------------------------------------------------------------------

fn identity(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(args[0].clone())
}

fn constant(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(args[0].clone())
}

fn apply(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let f = expect_function("A", &args[0])?;
    caller.call1(f, args[1].clone())
}

fn thrush(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let f = expect_function("T", &args[1])?;
    caller.call1(f, args[0].clone())
}

fn flip(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let f = expect_function("flip", &args[0])?;
    caller.call2(f, args[2].clone(), args[1].clone())
}

/// `compose(f, g, x)` is `f(g(x))`.
pub(crate) fn compose(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let f = expect_function("compose", &args[0])?;
    let g = expect_function("compose", &args[1])?;
    let inner = caller.call1(g, args[2].clone())?;
    caller.call1(f, inner)
}

/// `pipe([f, g, h], x)` is `h(g(f(x)))`.
fn pipe(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let functions = expect_array("pipe", &args[0])?;
    functions.iter().try_fold(args[1].clone(), |acc, f| {
        caller.call1(expect_function("pipe", f)?, acc)
    })
}

// ---------------------------------------------------------------------------
// Maybe
// ---------------------------------------------------------------------------

fn just(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::just(args[0].clone()))
}

fn maybe(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let f = expect_function("maybe", &args[1])?;
    match &args[2] {
        RuntimeValue::Just(x) => caller.call1(f, (**x).clone()),
        RuntimeValue::Nothing => Ok(args[0].clone()),
        other => Err(invalid("maybe", "a Maybe", other)),
    }
}

fn from_maybe(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    match &args[1] {
        RuntimeValue::Just(x) => Ok((**x).clone()),
        RuntimeValue::Nothing => Ok(args[0].clone()),
        other => Err(invalid("fromMaybe", "a Maybe", other)),
    }
}

fn maybe_to_nullable(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    match &args[0] {
        RuntimeValue::Just(x) => Ok((**x).clone()),
        RuntimeValue::Nothing => Ok(RuntimeValue::Null),
        other => Err(invalid("maybeToNullable", "a Maybe", other)),
    }
}

fn to_maybe(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(if args[0].is_nullish() {
        RuntimeValue::Nothing
    } else {
        RuntimeValue::just(args[0].clone())
    })
}

fn is_just(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    match &args[0] {
        RuntimeValue::Just(_) => boolean(true),
        RuntimeValue::Nothing => boolean(false),
        other => Err(invalid("isJust", "a Maybe", other)),
    }
}

fn is_nothing(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    match &args[0] {
        RuntimeValue::Just(_) => boolean(false),
        RuntimeValue::Nothing => boolean(true),
        other => Err(invalid("isNothing", "a Maybe", other)),
    }
}

fn justs(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let items = expect_array("justs", &args[0])?;
    let mut out = Vec::new();
    for item in items.iter() {
        match item {
            RuntimeValue::Just(x) => out.push((**x).clone()),
            RuntimeValue::Nothing => {}
            other => return Err(invalid("justs", "an Array of Maybe values", other)),
        }
    }
    Ok(RuntimeValue::array(out))
}

fn maybe_to_either(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    match &args[1] {
        RuntimeValue::Just(x) => Ok(RuntimeValue::Right(Rc::clone(x))),
        RuntimeValue::Nothing => Ok(RuntimeValue::left(args[0].clone())),
        other => Err(invalid("maybeToEither", "a Maybe", other)),
    }
}

/// Apply a function that might throw, capturing failure as Nothing.
fn encase(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let f = expect_function("encase", &args[0])?;
    match caller.call1(f, args[1].clone()) {
        Ok(value) => Ok(RuntimeValue::just(value)),
        Err(RuntimeError::StackOverflow) => Err(RuntimeError::StackOverflow),
        Err(_) => Ok(RuntimeValue::Nothing),
    }
}

// ---------------------------------------------------------------------------
// Either
// ---------------------------------------------------------------------------

fn left(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::left(args[0].clone()))
}

fn right(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::right(args[0].clone()))
}

fn either(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let on_left = expect_function("either", &args[0])?;
    let on_right = expect_function("either", &args[1])?;
    match &args[2] {
        RuntimeValue::Left(x) => caller.call1(on_left, (**x).clone()),
        RuntimeValue::Right(x) => caller.call1(on_right, (**x).clone()),
        other => Err(invalid("either", "an Either", other)),
    }
}

fn from_either(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    match &args[1] {
        RuntimeValue::Right(x) => Ok((**x).clone()),
        RuntimeValue::Left(_) => Ok(args[0].clone()),
        other => Err(invalid("fromEither", "an Either", other)),
    }
}

fn is_left(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    match &args[0] {
        RuntimeValue::Left(_) => boolean(true),
        RuntimeValue::Right(_) => boolean(false),
        other => Err(invalid("isLeft", "an Either", other)),
    }
}

fn is_right(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    match &args[0] {
        RuntimeValue::Left(_) => boolean(false),
        RuntimeValue::Right(_) => boolean(true),
        other => Err(invalid("isRight", "an Either", other)),
    }
}

fn partition_eithers(function: &str, value: &RuntimeValue, want_left: bool) -> Result<RuntimeValue> {
    let items = expect_array(function, value)?;
    let mut out = Vec::new();
    for item in items.iter() {
        match (item, want_left) {
            (RuntimeValue::Left(x), true) | (RuntimeValue::Right(x), false) => {
                out.push((**x).clone())
            }
            (RuntimeValue::Left(_) | RuntimeValue::Right(_), _) => {}
            (other, _) => return Err(invalid(function, "an Array of Either values", other)),
        }
    }
    Ok(RuntimeValue::array(out))
}

fn lefts(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    partition_eithers("lefts", &args[0], true)
}

fn rights(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    partition_eithers("rights", &args[0], false)
}

fn either_to_maybe(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    match &args[0] {
        RuntimeValue::Right(x) => Ok(RuntimeValue::Just(Rc::clone(x))),
        RuntimeValue::Left(_) => Ok(RuntimeValue::Nothing),
        other => Err(invalid("eitherToMaybe", "an Either", other)),
    }
}

// ---------------------------------------------------------------------------
// Functor, Chain, Foldable
// ---------------------------------------------------------------------------

/// Map over any functor: arrays, Maybe, Either, objects (values) and
/// functions (composition).
pub(crate) fn fmap(
    function: &str,
    f: &RuntimeValue,
    functor: &RuntimeValue,
    caller: &Caller,
) -> Result<RuntimeValue> {
    let f = expect_function(function, f)?;
    match functor {
        RuntimeValue::Array(items) => Ok(RuntimeValue::array(
            items
                .iter()
                .map(|x| caller.call1(f, x.clone()))
                .collect::<Result<Vec<_>>>()?,
        )),
        RuntimeValue::Object(entries) => Ok(RuntimeValue::object(
            entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), caller.call1(f, v.clone())?)))
                .collect::<Result<Vec<_>>>()?,
        )),
        RuntimeValue::Just(x) => Ok(RuntimeValue::just(caller.call1(f, (**x).clone())?)),
        RuntimeValue::Nothing => Ok(RuntimeValue::Nothing),
        RuntimeValue::Right(x) => Ok(RuntimeValue::right(caller.call1(f, (**x).clone())?)),
        RuntimeValue::Left(_) => Ok(functor.clone()),
        g if g.is_callable() => Ok(RuntimeValue::builtin(
            Builtin::curried("compose", 3, compose).with_applied(vec![f.clone(), g.clone()]),
        )),
        other => Err(invalid(function, "a Functor", other)),
    }
}

fn map(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    fmap("map", &args[0], &args[1], caller)
}

fn chain(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let f = expect_function("chain", &args[0])?;
    match &args[1] {
        RuntimeValue::Array(items) => {
            let mut out = Vec::new();
            for item in items.iter() {
                match caller.call1(f, item.clone())? {
                    RuntimeValue::Array(inner) => out.extend(inner.iter().cloned()),
                    other => return Err(invalid("chain", "a function returning an Array", &other)),
                }
            }
            Ok(RuntimeValue::array(out))
        }
        RuntimeValue::Just(x) | RuntimeValue::Right(x) => caller.call1(f, (**x).clone()),
        nothing @ (RuntimeValue::Nothing | RuntimeValue::Left(_)) => Ok(nothing.clone()),
        other => Err(invalid("chain", "a Chain", other)),
    }
}

fn filter_with(function: &str, args: &[RuntimeValue], caller: &Caller, keep: bool) -> Result<RuntimeValue> {
    let predicate = expect_function(function, &args[0])?;
    match &args[1] {
        RuntimeValue::Array(items) => {
            let mut out = Vec::new();
            for item in items.iter() {
                if test(function, caller, predicate, item.clone())? == keep {
                    out.push(item.clone());
                }
            }
            Ok(RuntimeValue::array(out))
        }
        RuntimeValue::Just(x) => Ok(if test(function, caller, predicate, (**x).clone())? == keep {
            args[1].clone()
        } else {
            RuntimeValue::Nothing
        }),
        RuntimeValue::Nothing => Ok(RuntimeValue::Nothing),
        other => Err(invalid(function, "an Array or a Maybe", other)),
    }
}

fn filter(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    filter_with("filter", args, caller, true)
}

fn reject(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    filter_with("reject", args, caller, false)
}

fn reduce(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let f = expect_function("reduce", &args[0])?;
    let items: Vec<RuntimeValue> = match &args[2] {
        RuntimeValue::Array(items) => items.to_vec(),
        RuntimeValue::Just(x) => vec![(**x).clone()],
        RuntimeValue::Nothing => Vec::new(),
        other => return Err(invalid("reduce", "a Foldable", other)),
    };
    items
        .into_iter()
        .try_fold(args[1].clone(), |acc, x| caller.call2(f, acc, x))
}

fn concat(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    concat_values("concat", &args[0], &args[1])
}

pub(crate) fn concat_values(
    function: &str,
    a: &RuntimeValue,
    b: &RuntimeValue,
) -> Result<RuntimeValue> {
    match (a, b) {
        (RuntimeValue::String(x), RuntimeValue::String(y)) => {
            Ok(RuntimeValue::String(format!("{}{}", x, y)))
        }
        (RuntimeValue::Array(x), RuntimeValue::Array(y)) => Ok(RuntimeValue::array(
            x.iter().chain(y.iter()).cloned().collect(),
        )),
        (RuntimeValue::Object(x), RuntimeValue::Object(y)) => {
            let mut merged: Vec<(String, RuntimeValue)> = x.to_vec();
            for (key, value) in y.iter() {
                match merged.iter_mut().find(|(k, _)| k == key) {
                    Some(entry) => entry.1 = value.clone(),
                    None => merged.push((key.clone(), value.clone())),
                }
            }
            Ok(RuntimeValue::object(merged))
        }
        (RuntimeValue::Just(x), RuntimeValue::Just(y)) => {
            Ok(RuntimeValue::just(concat_values(function, x, y)?))
        }
        (RuntimeValue::Nothing, other @ (RuntimeValue::Just(_) | RuntimeValue::Nothing))
        | (other @ RuntimeValue::Just(_), RuntimeValue::Nothing) => Ok(other.clone()),
        (x, y) => Err(RuntimeError::invalid_argument(
            function,
            "two values of the same Semigroup",
            format!("{} and {}", x.show(), y.show()),
        )),
    }
}

// ---------------------------------------------------------------------------
// Lists (arrays and strings)
// ---------------------------------------------------------------------------

/// Arrays and strings are both sequences; strings are handled per character.
enum Sequence {
    Array(Vec<RuntimeValue>),
    String(Vec<char>),
}

impl Sequence {
    fn from_value(function: &str, value: &RuntimeValue) -> Result<Self> {
        match value {
            RuntimeValue::Array(items) => Ok(Sequence::Array(items.to_vec())),
            RuntimeValue::String(s) => Ok(Sequence::String(s.chars().collect())),
            other => Err(invalid(function, "an Array or a String", other)),
        }
    }

    fn len(&self) -> usize {
        match self {
            Sequence::Array(items) => items.len(),
            Sequence::String(chars) => chars.len(),
        }
    }

    fn element(&self, index: usize) -> RuntimeValue {
        match self {
            Sequence::Array(items) => items[index].clone(),
            Sequence::String(chars) => RuntimeValue::String(chars[index].to_string()),
        }
    }

    fn slice(&self, start: usize, end: usize) -> RuntimeValue {
        match self {
            Sequence::Array(items) => RuntimeValue::array(items[start..end].to_vec()),
            Sequence::String(chars) => RuntimeValue::String(chars[start..end].iter().collect()),
        }
    }
}

fn head(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let seq = Sequence::from_value("head", &args[0])?;
    Ok(maybe_of((seq.len() > 0).then(|| seq.element(0))))
}

fn tail(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let seq = Sequence::from_value("tail", &args[0])?;
    Ok(maybe_of((seq.len() > 0).then(|| seq.slice(1, seq.len()))))
}

fn last(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let seq = Sequence::from_value("last", &args[0])?;
    Ok(maybe_of(seq.len().checked_sub(1).map(|i| seq.element(i))))
}

fn init(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let seq = Sequence::from_value("init", &args[0])?;
    Ok(maybe_of(seq.len().checked_sub(1).map(|end| seq.slice(0, end))))
}

fn at(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let index = expect_integer("at", &args[0])?;
    let seq = Sequence::from_value("at", &args[1])?;
    Ok(maybe_of(resolve_index(index, seq.len()).map(|i| seq.element(i))))
}

fn take(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let n = expect_integer("take", &args[0])?;
    let seq = Sequence::from_value("take", &args[1])?;
    Ok(maybe_of(
        usize::try_from(n)
            .ok()
            .filter(|&n| n <= seq.len())
            .map(|n| seq.slice(0, n)),
    ))
}

fn drop(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let n = expect_integer("drop", &args[0])?;
    let seq = Sequence::from_value("drop", &args[1])?;
    Ok(maybe_of(
        usize::try_from(n)
            .ok()
            .filter(|&n| n <= seq.len())
            .map(|n| seq.slice(n, seq.len())),
    ))
}

fn reverse(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    match Sequence::from_value("reverse", &args[0])? {
        Sequence::Array(mut items) => {
            items.reverse();
            Ok(RuntimeValue::array(items))
        }
        Sequence::String(chars) => Ok(RuntimeValue::String(chars.into_iter().rev().collect())),
    }
}

fn size(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    match &args[0] {
        RuntimeValue::Just(_) | RuntimeValue::Right(_) => number(1.0),
        RuntimeValue::Nothing | RuntimeValue::Left(_) => number(0.0),
        RuntimeValue::Object(entries) => number(entries.len() as f64),
        other => number(Sequence::from_value("size", other)?.len() as f64),
    }
}

fn append(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let items = expect_array("append", &args[1])?;
    let mut out = items.to_vec();
    out.push(args[0].clone());
    Ok(RuntimeValue::array(out))
}

fn prepend(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let items = expect_array("prepend", &args[1])?;
    let mut out = Vec::with_capacity(items.len() + 1);
    out.push(args[0].clone());
    out.extend(items.iter().cloned());
    Ok(RuntimeValue::array(out))
}

fn range(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let start = expect_integer("range", &args[0])?;
    let end = expect_integer("range", &args[1])?;
    Ok(RuntimeValue::array(
        (start..end).map(|n| RuntimeValue::Number(n as f64)).collect(),
    ))
}

fn find(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let predicate = expect_function("find", &args[0])?;
    let items = expect_array("find", &args[1])?;
    for item in items.iter() {
        if test("find", caller, predicate, item.clone())? {
            return Ok(RuntimeValue::just(item.clone()));
        }
    }
    Ok(RuntimeValue::Nothing)
}

fn elem(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    match &args[1] {
        RuntimeValue::Array(items) => boolean(items.iter().any(|x| *x == args[0])),
        RuntimeValue::Just(x) => boolean(**x == args[0]),
        RuntimeValue::Nothing => boolean(false),
        other => Err(invalid("elem", "a Foldable", other)),
    }
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

fn finite(function: &str, value: &RuntimeValue) -> Result<f64> {
    match expect_number(function, value)? {
        n if n.is_finite() => Ok(n),
        _ => Err(invalid(function, "a FiniteNumber", value)),
    }
}

fn add(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(finite("add", &args[0])? + finite("add", &args[1])?)
}

fn sub(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(finite("sub", &args[0])? - finite("sub", &args[1])?)
}

fn mult(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(finite("mult", &args[0])? * finite("mult", &args[1])?)
}

fn div(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let divisor = finite("div", &args[1])?;
    if divisor == 0.0 {
        return Err(invalid("div", "a NonZeroFiniteNumber", &args[1]));
    }
    number(finite("div", &args[0])? / divisor)
}

fn inc(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(finite("inc", &args[0])? + 1.0)
}

fn dec(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(finite("dec", &args[0])? - 1.0)
}

fn negate(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(-expect_number("negate", &args[0])?)
}

fn numbers(function: &str, value: &RuntimeValue) -> Result<Vec<f64>> {
    expect_array(function, value)?
        .iter()
        .map(|x| finite(function, x))
        .collect()
}

fn sum(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(numbers("sum", &args[0])?.iter().sum())
}

fn product(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    number(numbers("product", &args[0])?.iter().product())
}

fn mean(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let xs = numbers("mean", &args[0])?;
    Ok(maybe_of((!xs.is_empty()).then(|| {
        RuntimeValue::Number(xs.iter().sum::<f64>() / xs.len() as f64)
    })))
}

fn compare(function: &str, a: &RuntimeValue, b: &RuntimeValue) -> Result<std::cmp::Ordering> {
    match (a, b) {
        (RuntimeValue::Number(x), RuntimeValue::Number(y)) => x
            .partial_cmp(y)
            .ok_or_else(|| invalid(function, "comparable values", a)),
        (RuntimeValue::String(x), RuntimeValue::String(y)) => Ok(x.cmp(y)),
        (RuntimeValue::Boolean(x), RuntimeValue::Boolean(y)) => Ok(x.cmp(y)),
        _ => Err(RuntimeError::invalid_argument(
            function,
            "two values of the same Ord type",
            format!("{} and {}", a.show(), b.show()),
        )),
    }
}

fn min(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(if compare("min", &args[0], &args[1])?.is_le() {
        args[0].clone()
    } else {
        args[1].clone()
    })
}

fn max(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(if compare("max", &args[0], &args[1])?.is_ge() {
        args[0].clone()
    } else {
        args[1].clone()
    })
}

fn even(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    boolean(expect_integer("even", &args[0])? % 2 == 0)
}

fn odd(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    boolean(expect_integer("odd", &args[0])? % 2 != 0)
}

// ---------------------------------------------------------------------------
// Logic and ordering
// ---------------------------------------------------------------------------

fn equals(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    boolean(args[0] == args[1])
}

fn lt(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    boolean(compare("lt", &args[0], &args[1])?.is_lt())
}

fn lte(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    boolean(compare("lte", &args[0], &args[1])?.is_le())
}

fn gt(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    boolean(compare("gt", &args[0], &args[1])?.is_gt())
}

fn gte(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    boolean(compare("gte", &args[0], &args[1])?.is_ge())
}

fn not(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    boolean(!expect_boolean("not", &args[0])?)
}

fn and(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    boolean(expect_boolean("and", &args[0])? && expect_boolean("and", &args[1])?)
}

fn or(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    boolean(expect_boolean("or", &args[0])? || expect_boolean("or", &args[1])?)
}

fn complement(args: &[RuntimeValue], caller: &Caller) -> Result<RuntimeValue> {
    let predicate = expect_function("complement", &args[0])?;
    boolean(!test("complement", caller, predicate, args[1].clone())?)
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

fn string_result(s: impl Into<String>) -> Result<RuntimeValue> {
    Ok(RuntimeValue::String(s.into()))
}

fn strings(function: &str, value: &RuntimeValue) -> Result<Vec<String>> {
    expect_array(function, value)?
        .iter()
        .map(|x| expect_string(function, x).map(str::to_string))
        .collect()
}

fn string_array(parts: impl Iterator<Item = impl Into<String>>) -> RuntimeValue {
    RuntimeValue::array(parts.map(|s| RuntimeValue::String(s.into())).collect())
}

fn to_upper(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    string_result(expect_string("toUpper", &args[0])?.to_uppercase())
}

fn to_lower(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    string_result(expect_string("toLower", &args[0])?.to_lowercase())
}

fn trim(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    string_result(expect_string("trim", &args[0])?.trim())
}

fn words(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(string_array(expect_string("words", &args[0])?.split_whitespace()))
}

fn unwords(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    string_result(strings("unwords", &args[0])?.join(" "))
}

fn lines(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(string_array(expect_string("lines", &args[0])?.lines()))
}

fn unlines(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    string_result(
        strings("unlines", &args[0])?
            .iter()
            .map(|line| format!("{}\n", line))
            .collect::<String>(),
    )
}

fn split_on(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let separator = expect_string("splitOn", &args[0])?;
    let s = expect_string("splitOn", &args[1])?;
    Ok(string_array(s.split(separator)))
}

fn join_with(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let separator = expect_string("joinWith", &args[0])?;
    string_result(strings("joinWith", &args[1])?.join(separator))
}

/// Strict integer parsing: the whole string must be digits of `radix`.
fn parse_int(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let radix = expect_integer("parseInt", &args[0])?;
    if !(2..=36).contains(&radix) {
        return Err(invalid("parseInt", "a radix between 2 and 36", &args[0]));
    }
    let s = expect_string("parseInt", &args[1])?;
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let parsed = if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_alphanumeric()) {
        None
    } else {
        i64::from_str_radix(digits, radix as u32).ok()
    };
    Ok(maybe_of(parsed.map(|n| {
        RuntimeValue::Number(if negative { -(n as f64) } else { n as f64 })
    })))
}

fn parse_float(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let s = expect_string("parseFloat", &args[0])?.trim();
    Ok(maybe_of(
        s.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(RuntimeValue::Number),
    ))
}

// ---------------------------------------------------------------------------
// Objects and types
// ---------------------------------------------------------------------------

fn prop(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let key = expect_string("prop", &args[0])?;
    let found = match &args[1] {
        RuntimeValue::Object(entries) => entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()),
        RuntimeValue::Array(items) if key == "length" => {
            Some(RuntimeValue::Number(items.len() as f64))
        }
        _ => None,
    };
    found.ok_or_else(|| {
        RuntimeError::invalid_argument(
            "prop",
            format!("an object with a property named \"{}\"", key),
            args[1].show(),
        )
    })
}

fn entries(function: &str, value: &RuntimeValue) -> Result<Rc<Vec<(String, RuntimeValue)>>> {
    match value {
        RuntimeValue::Object(entries) => Ok(Rc::clone(entries)),
        other => Err(invalid(function, "an Object", other)),
    }
}

fn keys(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(string_array(
        entries("keys", &args[0])?.iter().map(|(k, _)| k.clone()),
    ))
}

fn values(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::array(
        entries("values", &args[0])?.iter().map(|(_, v)| v.clone()).collect(),
    ))
}

fn pairs(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::array(
        entries("pairs", &args[0])?
            .iter()
            .map(|(k, v)| RuntimeValue::array(vec![RuntimeValue::String(k.clone()), v.clone()]))
            .collect(),
    ))
}

fn is(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    match &args[0] {
        RuntimeValue::TypeRep(rep) => boolean(rep.contains(&args[1])),
        other => Err(invalid("is", "a type representative", other)),
    }
}

fn show(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    string_result(args[0].show())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: Vec<RuntimeValue>) -> Result<RuntimeValue> {
        let (_, _, imp) = FUNCTIONS
            .iter()
            .find(|(n, _, _)| *n == name)
            .expect("unknown function");
        imp(&args, &Caller::new(0))
    }

    #[test]
    fn every_entry_is_unique() {
        let mut names: Vec<&str> = FUNCTIONS.iter().map(|(n, _, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FUNCTIONS.len());
    }

    #[test]
    fn head_of_empty_array_is_nothing() {
        assert_eq!(
            call("head", vec![RuntimeValue::array(vec![])]).unwrap(),
            RuntimeValue::Nothing
        );
    }

    #[test]
    fn parse_int_is_strict() {
        let parse = |s: &str| {
            call("parseInt", vec![RuntimeValue::Number(10.0), RuntimeValue::string(s)]).unwrap()
        };
        assert_eq!(parse("42"), RuntimeValue::just(RuntimeValue::Number(42.0)));
        assert_eq!(parse("-7"), RuntimeValue::just(RuntimeValue::Number(-7.0)));
        assert_eq!(parse("42px"), RuntimeValue::Nothing);
        assert_eq!(parse(""), RuntimeValue::Nothing);
    }

    #[test]
    fn add_rejects_strings() {
        let err = call("add", vec![RuntimeValue::string("1"), RuntimeValue::Number(1.0)])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: add expected a Number but received \"1\""
        );
    }

    #[test]
    fn concat_merges_maybes() {
        let result = call(
            "concat",
            vec![
                RuntimeValue::just(RuntimeValue::string("a")),
                RuntimeValue::just(RuntimeValue::string("b")),
            ],
        )
        .unwrap();
        assert_eq!(result.show(), r#"Just("ab")"#);
    }

    #[test]
    fn div_by_zero_is_an_error() {
        assert!(call("div", vec![RuntimeValue::Number(1.0), RuntimeValue::Number(0.0)]).is_err());
    }
}
