//! The handful of language globals examples lean on: `Math`, the global
//! parsing functions, and the conversions performed by calling a type
//! representative.

use crate::error::RuntimeError;
use crate::runtime_value::{RuntimeValue, TypeRep};

use super::{Builtin, BuiltinFn, Caller};

type Result<T> = std::result::Result<T, RuntimeError>;

fn arg(args: &[RuntimeValue], i: usize) -> RuntimeValue {
    args.get(i).cloned().unwrap_or(RuntimeValue::Undefined)
}

fn unary(args: &[RuntimeValue], op: fn(f64) -> f64) -> Result<RuntimeValue> {
    Ok(RuntimeValue::Number(op(arg(args, 0).to_number())))
}

/// `Math.round` rounds half-way cases towards positive infinity.
fn js_round(n: f64) -> f64 {
    (n + 0.5).floor()
}

fn sign(n: f64) -> f64 {
    if n.is_nan() || n == 0.0 { n } else { n.signum() }
}

const MATH: &[(&str, BuiltinFn)] = &[
    ("abs", |args, _| unary(args, f64::abs)),
    ("ceil", |args, _| unary(args, f64::ceil)),
    ("floor", |args, _| unary(args, f64::floor)),
    ("round", |args, _| unary(args, js_round)),
    ("trunc", |args, _| unary(args, f64::trunc)),
    ("sign", |args, _| unary(args, sign)),
    ("sqrt", |args, _| unary(args, f64::sqrt)),
    ("cbrt", |args, _| unary(args, f64::cbrt)),
    ("exp", |args, _| unary(args, f64::exp)),
    ("log", |args, _| unary(args, f64::ln)),
    ("pow", |args, _| {
        Ok(RuntimeValue::Number(
            arg(args, 0).to_number().powf(arg(args, 1).to_number()),
        ))
    }),
    ("max", |args, _| extremum(args, f64::NEG_INFINITY, f64::max)),
    ("min", |args, _| extremum(args, f64::INFINITY, f64::min)),
];

/// `Math.max`/`Math.min`: any `NaN` argument poisons the result.
fn extremum(args: &[RuntimeValue], empty: f64, pick: fn(f64, f64) -> f64) -> Result<RuntimeValue> {
    let mut result = empty;
    for value in args {
        let n = value.to_number();
        if n.is_nan() {
            return Ok(RuntimeValue::Number(f64::NAN));
        }
        result = pick(result, n);
    }
    Ok(RuntimeValue::Number(result))
}

pub fn math() -> RuntimeValue {
    let mut entries: Vec<(String, RuntimeValue)> = MATH
        .iter()
        .map(|&(name, imp)| {
            (
                name.to_string(),
                RuntimeValue::builtin(Builtin::variadic(name, imp)),
            )
        })
        .collect();
    entries.push(("PI".to_string(), RuntimeValue::Number(std::f64::consts::PI)));
    entries.push(("E".to_string(), RuntimeValue::Number(std::f64::consts::E)));
    RuntimeValue::object(entries)
}

/// Global `parseInt`: reads the longest valid prefix, `NaN` if there is none.
pub fn parse_int(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let text = arg(args, 0).to_js_string();
    let mut s = text.trim_start();
    let negative = s.starts_with('-');
    if negative || s.starts_with('+') {
        s = &s[1..];
    }
    let mut radix = match arg(args, 1) {
        RuntimeValue::Undefined => 10,
        r => r.to_number() as u32,
    };
    if radix == 0 {
        radix = 10;
    }
    if (radix == 16 || (radix == 10 && args.len() < 2))
        && let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
    {
        s = rest;
        radix = 16;
    }
    if !(2..=36).contains(&radix) {
        return Ok(RuntimeValue::Number(f64::NAN));
    }
    let digits: Vec<u32> = s.chars().map_while(|c| c.to_digit(radix)).collect();
    if digits.is_empty() {
        return Ok(RuntimeValue::Number(f64::NAN));
    }
    let magnitude = digits
        .iter()
        .fold(0.0, |acc, &d| acc * f64::from(radix) + f64::from(d));
    Ok(RuntimeValue::Number(if negative { -magnitude } else { magnitude }))
}

/// Global `parseFloat`: the longest prefix that reads as a decimal literal.
pub fn parse_float(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    let text = arg(args, 0).to_js_string();
    let s = text.trim_start();
    for special in ["Infinity", "+Infinity", "-Infinity"] {
        if s.starts_with(special) {
            let n = if special.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
            return Ok(RuntimeValue::Number(n));
        }
    }
    let end = (1..=s.len())
        .rev()
        .filter(|&i| s.is_char_boundary(i))
        .find(|&i| {
            let prefix = &s[..i];
            !prefix.ends_with(['e', 'E', '+', '-'])
                && prefix.chars().all(|c| c.is_ascii_digit() || "+-.eE".contains(c))
                && prefix.parse::<f64>().is_ok()
        });
    Ok(RuntimeValue::Number(match end {
        Some(i) => s[..i].parse().unwrap_or(f64::NAN),
        None => f64::NAN,
    }))
}

pub fn is_nan(args: &[RuntimeValue], _: &Caller) -> Result<RuntimeValue> {
    Ok(RuntimeValue::Boolean(arg(args, 0).to_number().is_nan()))
}

/// Calling `Number(x)`, `String(x)` or `Boolean(x)` converts `x`.
pub fn convert(rep: TypeRep, args: &[RuntimeValue]) -> Result<RuntimeValue> {
    let value = arg(args, 0);
    match rep {
        TypeRep::Number if args.is_empty() => Ok(RuntimeValue::Number(0.0)),
        TypeRep::Number => Ok(RuntimeValue::Number(value.to_number())),
        TypeRep::String if args.is_empty() => Ok(RuntimeValue::string("")),
        TypeRep::String => Ok(RuntimeValue::String(value.to_js_string())),
        TypeRep::Boolean => Ok(RuntimeValue::Boolean(value.is_truthy())),
        other => Err(RuntimeError::NotAFunction(other.name().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_int_of(args: Vec<RuntimeValue>) -> String {
        parse_int(&args, &Caller::new(0)).unwrap().show()
    }

    #[test]
    fn parse_int_reads_a_prefix() {
        assert_eq!(parse_int_of(vec![RuntimeValue::string("42px")]), "42");
        assert_eq!(parse_int_of(vec![RuntimeValue::string("  -17")]), "-17");
        assert_eq!(parse_int_of(vec![RuntimeValue::string("0x1F")]), "31");
        assert_eq!(
            parse_int_of(vec![RuntimeValue::string("ff"), RuntimeValue::Number(16.0)]),
            "255"
        );
        assert_eq!(parse_int_of(vec![RuntimeValue::string("px")]), "NaN");
    }

    #[test]
    fn parse_float_reads_a_prefix() {
        let parse = |s: &str| {
            parse_float(&[RuntimeValue::string(s)], &Caller::new(0))
                .unwrap()
                .show()
        };
        assert_eq!(parse("3.14abc"), "3.14");
        assert_eq!(parse("1e3"), "1000");
        assert_eq!(parse("1e"), "1");
        assert_eq!(parse("abc"), "NaN");
        assert_eq!(parse("-Infinity"), "-Infinity");
    }

    #[test]
    fn rounding_matches_javascript() {
        assert_eq!(js_round(2.5), 3.0);
        assert_eq!(js_round(-2.5), -2.0);
    }

    #[test]
    fn conversions() {
        assert_eq!(
            convert(TypeRep::Number, &[RuntimeValue::string(" 12 ")]).unwrap(),
            RuntimeValue::Number(12.0)
        );
        assert_eq!(
            convert(TypeRep::String, &[RuntimeValue::Null]).unwrap(),
            RuntimeValue::string("null")
        );
        assert!(convert(TypeRep::Array, &[]).is_err());
    }
}
