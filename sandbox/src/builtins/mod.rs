//! Native functions and the global bindings of a sandbox realm.
//!
//! Library functions are curried: a built-in with arity `n` collects
//! arguments across calls until it has `n`, runs, and applies any surplus
//! arguments to its result. `S.add(1, 2)`, `S.add(1)(2)` and
//! `S.add(1, 2, 3)` (which tries to call `3` on the number) all follow
//! from that one rule.

pub mod combinators;
pub mod intrinsics;
pub mod methods;
pub mod safety;

use std::fmt;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::evaluator;
use crate::runtime_value::{Function, RuntimeValue, TypeRep};
use crate::{SAFETY_BINDING, SQRT_BINDING, UTILITY_BINDING};

pub type BuiltinFn = fn(&[RuntimeValue], &Caller) -> Result<RuntimeValue, RuntimeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Runs once this many arguments have been supplied.
    Curried(usize),
    /// Runs on every call with whatever arguments it received.
    Variadic,
}

/// A native function, possibly partially applied.
#[derive(Debug, Clone)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: Arity,
    pub imp: BuiltinFn,
    pub applied: Vec<RuntimeValue>,
}

impl Builtin {
    pub fn curried(name: &'static str, arity: usize, imp: BuiltinFn) -> Self {
        Builtin {
            name,
            arity: Arity::Curried(arity),
            imp,
            applied: Vec::new(),
        }
    }

    pub fn variadic(name: &'static str, imp: BuiltinFn) -> Self {
        Builtin {
            name,
            arity: Arity::Variadic,
            imp,
            applied: Vec::new(),
        }
    }

    pub fn with_applied(mut self, applied: Vec<RuntimeValue>) -> Self {
        self.applied = applied;
        self
    }

    /// Number of arguments still expected, as reported by `f.length`.
    pub fn remaining(&self) -> usize {
        match self.arity {
            Arity::Curried(n) => n.saturating_sub(self.applied.len()),
            Arity::Variadic => 0,
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.applied.is_empty() {
            let args: Vec<String> = self.applied.iter().map(RuntimeValue::show).collect();
            write!(f, "({})", args.join(", "))?;
        }
        Ok(())
    }
}

/// Handle through which native code calls back into the evaluator,
/// carrying the current call depth.
pub struct Caller {
    depth: usize,
}

impl Caller {
    pub(crate) fn new(depth: usize) -> Self {
        Caller { depth }
    }

    pub fn call(
        &self,
        function: &RuntimeValue,
        args: Vec<RuntimeValue>,
    ) -> Result<RuntimeValue, RuntimeError> {
        evaluator::apply(function, args, self.depth + 1)
    }

    pub fn call1(
        &self,
        function: &RuntimeValue,
        arg: RuntimeValue,
    ) -> Result<RuntimeValue, RuntimeError> {
        self.call(function, vec![arg])
    }

    /// Call a binary function that may be written either curried
    /// (`a => b => ...`) or uncurried (`(a, b) => ...`).
    pub fn call2(
        &self,
        function: &RuntimeValue,
        a: RuntimeValue,
        b: RuntimeValue,
    ) -> Result<RuntimeValue, RuntimeError> {
        match function {
            RuntimeValue::Function(Function::Closure(closure))
                if closure.function.params.len() == 1 =>
            {
                let partial = self.call1(function, a)?;
                self.call1(&partial, b)
            }
            _ => self.call(function, vec![a, b]),
        }
    }
}

/// Square root with an explicit failure case instead of `NaN`.
pub fn sqrt(n: f64) -> Result<f64, String> {
    if n < 0.0 {
        Err("Cannot represent square root of negative number".to_string())
    } else {
        Ok(n.sqrt())
    }
}

fn sqrt_either(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue, RuntimeError> {
    let n = expect_number("sqrt", &args[0])?;
    Ok(match sqrt(n) {
        Ok(root) => RuntimeValue::right(RuntimeValue::Number(root)),
        Err(message) => RuntimeValue::left(RuntimeValue::String(message)),
    })
}

/// Every binding of a fresh realm.
pub fn globals() -> Vec<(&'static str, RuntimeValue)> {
    vec![
        (UTILITY_BINDING, combinators::namespace()),
        (SAFETY_BINDING, safety::namespace()),
        (
            SQRT_BINDING,
            RuntimeValue::builtin(Builtin::curried("sqrt", 1, sqrt_either)),
        ),
        ("Math", intrinsics::math()),
        ("Number", RuntimeValue::TypeRep(TypeRep::Number)),
        ("String", RuntimeValue::TypeRep(TypeRep::String)),
        ("Boolean", RuntimeValue::TypeRep(TypeRep::Boolean)),
        ("Array", RuntimeValue::TypeRep(TypeRep::Array)),
        ("Object", RuntimeValue::TypeRep(TypeRep::Object)),
        ("Function", RuntimeValue::TypeRep(TypeRep::Function)),
        ("NaN", RuntimeValue::Number(f64::NAN)),
        ("Infinity", RuntimeValue::Number(f64::INFINITY)),
        (
            "parseInt",
            RuntimeValue::builtin(Builtin::variadic("parseInt", intrinsics::parse_int)),
        ),
        (
            "parseFloat",
            RuntimeValue::builtin(Builtin::variadic("parseFloat", intrinsics::parse_float)),
        ),
        (
            "isNaN",
            RuntimeValue::builtin(Builtin::variadic("isNaN", intrinsics::is_nan)),
        ),
    ]
}

/// Build a library object from `(name, arity, implementation)` triples.
pub(crate) fn namespace(entries: &[(&'static str, usize, BuiltinFn)]) -> Vec<(String, RuntimeValue)> {
    entries
        .iter()
        .map(|&(name, arity, imp)| {
            (
                name.to_string(),
                RuntimeValue::builtin(Builtin::curried(name, arity, imp)),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

pub(crate) fn expect_number(function: &str, value: &RuntimeValue) -> Result<f64, RuntimeError> {
    match value {
        RuntimeValue::Number(n) => Ok(*n),
        other => Err(RuntimeError::invalid_argument(function, "a Number", other.show())),
    }
}

pub(crate) fn expect_integer(function: &str, value: &RuntimeValue) -> Result<i64, RuntimeError> {
    match value {
        RuntimeValue::Number(n) if n.fract() == 0.0 && n.is_finite() => Ok(*n as i64),
        other => Err(RuntimeError::invalid_argument(function, "an Integer", other.show())),
    }
}

pub(crate) fn expect_string<'v>(
    function: &str,
    value: &'v RuntimeValue,
) -> Result<&'v str, RuntimeError> {
    match value {
        RuntimeValue::String(s) => Ok(s),
        other => Err(RuntimeError::invalid_argument(function, "a String", other.show())),
    }
}

pub(crate) fn expect_boolean(function: &str, value: &RuntimeValue) -> Result<bool, RuntimeError> {
    match value {
        RuntimeValue::Boolean(b) => Ok(*b),
        other => Err(RuntimeError::invalid_argument(function, "a Boolean", other.show())),
    }
}

pub(crate) fn expect_array(
    function: &str,
    value: &RuntimeValue,
) -> Result<Rc<Vec<RuntimeValue>>, RuntimeError> {
    match value {
        RuntimeValue::Array(items) => Ok(Rc::clone(items)),
        other => Err(RuntimeError::invalid_argument(function, "an Array", other.show())),
    }
}

pub(crate) fn expect_function<'v>(
    function: &str,
    value: &'v RuntimeValue,
) -> Result<&'v RuntimeValue, RuntimeError> {
    if value.is_callable() {
        Ok(value)
    } else {
        Err(RuntimeError::invalid_argument(function, "a Function", value.show()))
    }
}

/// Call a predicate and insist on a boolean answer.
pub(crate) fn test(
    function: &str,
    caller: &Caller,
    predicate: &RuntimeValue,
    value: RuntimeValue,
) -> Result<bool, RuntimeError> {
    let result = caller.call1(predicate, value)?;
    expect_boolean(function, &result)
}

/// Resolve a possibly negative index against a length.
pub(crate) fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let resolved = if index < 0 { len + index } else { index };
    (0..len).contains(&resolved).then_some(resolved as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_rejects_negative_numbers() {
        assert_eq!(
            sqrt(-1.0),
            Err("Cannot represent square root of negative number".to_string())
        );
        assert_eq!(sqrt(4.0), Ok(2.0));
        assert_eq!(sqrt(0.0), Ok(0.0));
    }

    #[test]
    fn partially_applied_builtins_show_their_arguments() {
        let add = Builtin::curried("add", 2, |_, _| Ok(RuntimeValue::Undefined))
            .with_applied(vec![RuntimeValue::Number(1.0)]);
        assert_eq!(add.to_string(), "add(1)");
        assert_eq!(add.remaining(), 1);
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        assert_eq!(resolve_index(-1, 3), Some(2));
        assert_eq!(resolve_index(3, 3), None);
        assert_eq!(resolve_index(-4, 3), None);
    }
}
