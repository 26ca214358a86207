use std::fmt;
use std::rc::Rc;

use crate::ast::ArrowFunction;
use crate::builtins::Builtin;
use crate::environment::Environment;

/// A runtime value produced by evaluating an expression.
#[derive(Debug, Clone)]
pub enum RuntimeValue {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Rc<Vec<RuntimeValue>>),
    /// Plain object; keys keep insertion order.
    Object(Rc<Vec<(String, RuntimeValue)>>),
    Just(Rc<RuntimeValue>),
    Nothing,
    Left(Rc<RuntimeValue>),
    Right(Rc<RuntimeValue>),
    Function(Function),
    /// A type representative such as `Number`, usable with `S.is`.
    TypeRep(TypeRep),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRep {
    Number,
    String,
    Boolean,
    Array,
    Object,
    Function,
}

impl TypeRep {
    pub fn name(self) -> &'static str {
        match self {
            TypeRep::Number => "Number",
            TypeRep::String => "String",
            TypeRep::Boolean => "Boolean",
            TypeRep::Array => "Array",
            TypeRep::Object => "Object",
            TypeRep::Function => "Function",
        }
    }

    /// Whether `value` is a member of the type this represents.
    pub fn contains(self, value: &RuntimeValue) -> bool {
        matches!(
            (self, value),
            (TypeRep::Number, RuntimeValue::Number(_))
                | (TypeRep::String, RuntimeValue::String(_))
                | (TypeRep::Boolean, RuntimeValue::Boolean(_))
                | (TypeRep::Array, RuntimeValue::Array(_))
                | (TypeRep::Object, RuntimeValue::Object(_))
                | (TypeRep::Function, RuntimeValue::Function(_))
        )
    }
}

#[derive(Clone)]
pub enum Function {
    Closure(Closure),
    Builtin(Builtin),
}

/// An arrow function together with the scope it was created in.
#[derive(Clone)]
pub struct Closure {
    pub function: Rc<ArrowFunction>,
    pub env: Environment,
}

// The captured environment may contain the closure itself, so only the
// source is printed.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Closure(closure) => write!(f, "Closure({:?})", closure.function.source),
            Function::Builtin(builtin) => write!(f, "Builtin({})", builtin),
        }
    }
}

impl RuntimeValue {
    pub fn string(s: impl Into<String>) -> Self {
        RuntimeValue::String(s.into())
    }

    pub fn array(items: Vec<RuntimeValue>) -> Self {
        RuntimeValue::Array(Rc::new(items))
    }

    pub fn object(entries: Vec<(String, RuntimeValue)>) -> Self {
        RuntimeValue::Object(Rc::new(entries))
    }

    pub fn just(value: RuntimeValue) -> Self {
        RuntimeValue::Just(Rc::new(value))
    }

    pub fn left(value: RuntimeValue) -> Self {
        RuntimeValue::Left(Rc::new(value))
    }

    pub fn right(value: RuntimeValue) -> Self {
        RuntimeValue::Right(Rc::new(value))
    }

    pub fn builtin(builtin: Builtin) -> Self {
        RuntimeValue::Function(Function::Builtin(builtin))
    }

    pub fn is_truthy(&self) -> bool {
        !self.is_falsy()
    }

    pub fn is_falsy(&self) -> bool {
        match self {
            RuntimeValue::Undefined | RuntimeValue::Null => true,
            RuntimeValue::Boolean(b) => !b,
            RuntimeValue::Number(n) => *n == 0.0 || n.is_nan(),
            RuntimeValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, RuntimeValue::Undefined | RuntimeValue::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            RuntimeValue::Function(_)
                | RuntimeValue::TypeRep(TypeRep::Number | TypeRep::String | TypeRep::Boolean)
        )
    }

    /// Type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            RuntimeValue::Undefined => "Undefined",
            RuntimeValue::Null => "Null",
            RuntimeValue::Boolean(_) => "Boolean",
            RuntimeValue::Number(_) => "Number",
            RuntimeValue::String(_) => "String",
            RuntimeValue::Array(_) => "Array",
            RuntimeValue::Object(_) => "Object",
            RuntimeValue::Just(_) | RuntimeValue::Nothing => "Maybe",
            RuntimeValue::Left(_) | RuntimeValue::Right(_) => "Either",
            RuntimeValue::Function(_) | RuntimeValue::TypeRep(_) => "Function",
        }
    }

    /// The result of the `typeof` operator.
    pub fn type_of(&self) -> &'static str {
        match self {
            RuntimeValue::Undefined => "undefined",
            RuntimeValue::Boolean(_) => "boolean",
            RuntimeValue::Number(_) => "number",
            RuntimeValue::String(_) => "string",
            RuntimeValue::Function(_) | RuntimeValue::TypeRep(_) => "function",
            _ => "object",
        }
    }

    /// Numeric conversion as performed by `+x` and arithmetic operators.
    pub fn to_number(&self) -> f64 {
        match self {
            RuntimeValue::Number(n) => *n,
            RuntimeValue::Boolean(b) => f64::from(u8::from(*b)),
            RuntimeValue::Null => 0.0,
            RuntimeValue::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    match trimmed {
                        "Infinity" | "+Infinity" => f64::INFINITY,
                        "-Infinity" => f64::NEG_INFINITY,
                        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
                    }
                }
            }
            RuntimeValue::Array(items) if items.is_empty() => 0.0,
            RuntimeValue::Array(items) if items.len() == 1 => items[0].to_number(),
            _ => f64::NAN,
        }
    }

    /// String conversion as performed by `String(x)` and string concatenation.
    /// Maybe and Either values convert to their shown form.
    pub fn to_js_string(&self) -> String {
        match self {
            RuntimeValue::Undefined => "undefined".to_string(),
            RuntimeValue::Null => "null".to_string(),
            RuntimeValue::Boolean(b) => b.to_string(),
            RuntimeValue::Number(n) => format_number(*n),
            RuntimeValue::String(s) => s.clone(),
            RuntimeValue::Array(items) => items
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_js_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
            RuntimeValue::Object(_) => "[object Object]".to_string(),
            _ => self.show(),
        }
    }

    /// The canonical string representation of a value: strings are quoted,
    /// containers show their elements, functions show their source.
    pub fn show(&self) -> String {
        self.to_string()
    }

    /// `===` semantics: primitives compare by value, everything else by identity.
    pub fn strict_equals(&self, other: &RuntimeValue) -> bool {
        match (self, other) {
            (RuntimeValue::Undefined, RuntimeValue::Undefined)
            | (RuntimeValue::Null, RuntimeValue::Null)
            | (RuntimeValue::Nothing, RuntimeValue::Nothing) => true,
            (RuntimeValue::Boolean(a), RuntimeValue::Boolean(b)) => a == b,
            (RuntimeValue::Number(a), RuntimeValue::Number(b)) => a == b,
            (RuntimeValue::String(a), RuntimeValue::String(b)) => a == b,
            (RuntimeValue::Array(a), RuntimeValue::Array(b)) => Rc::ptr_eq(a, b),
            (RuntimeValue::Object(a), RuntimeValue::Object(b)) => Rc::ptr_eq(a, b),
            (RuntimeValue::Just(a), RuntimeValue::Just(b))
            | (RuntimeValue::Left(a), RuntimeValue::Left(b))
            | (RuntimeValue::Right(a), RuntimeValue::Right(b)) => Rc::ptr_eq(a, b),
            (RuntimeValue::TypeRep(a), RuntimeValue::TypeRep(b)) => a == b,
            (RuntimeValue::Function(Function::Closure(a)), RuntimeValue::Function(Function::Closure(b))) => {
                Rc::ptr_eq(&a.function, &b.function)
            }
            _ => false,
        }
    }

    /// `==` semantics, limited to the coercions that matter in practice:
    /// `null == undefined`, and number/string/boolean comparisons.
    pub fn loose_equals(&self, other: &RuntimeValue) -> bool {
        if self.is_nullish() || other.is_nullish() {
            return self.is_nullish() && other.is_nullish();
        }
        let primitive = |v: &RuntimeValue| {
            matches!(
                v,
                RuntimeValue::Number(_) | RuntimeValue::String(_) | RuntimeValue::Boolean(_)
            )
        };
        match (self, other) {
            (RuntimeValue::String(a), RuntimeValue::String(b)) => a == b,
            (a, b) if primitive(a) && primitive(b) => a.to_number() == b.to_number(),
            (a, b) => a.strict_equals(b),
        }
    }
}

/// Format a number the way JavaScript's `String(n)` does.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        // Rust writes `1e21` and `1e-7`; JavaScript adds an explicit `+`.
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        };
    }
    format!("{}", n)
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl fmt::Display for RuntimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeValue::Undefined => write!(f, "undefined"),
            RuntimeValue::Null => write!(f, "null"),
            RuntimeValue::Boolean(b) => write!(f, "{}", b),
            RuntimeValue::Number(n) if *n == 0.0 && n.is_sign_negative() => write!(f, "-0"),
            RuntimeValue::Number(n) => write!(f, "{}", format_number(*n)),
            RuntimeValue::String(s) => write!(f, "{}", quote(s)),
            RuntimeValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            RuntimeValue::Object(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", quote(key), value)?;
                }
                write!(f, "}}")
            }
            RuntimeValue::Just(v) => write!(f, "Just({})", v),
            RuntimeValue::Nothing => write!(f, "Nothing"),
            RuntimeValue::Left(v) => write!(f, "Left({})", v),
            RuntimeValue::Right(v) => write!(f, "Right({})", v),
            RuntimeValue::Function(Function::Closure(closure)) => {
                write!(f, "{}", closure.function.source)
            }
            RuntimeValue::Function(Function::Builtin(builtin)) => write!(f, "{}", builtin),
            RuntimeValue::TypeRep(rep) => write!(f, "{}", rep.name()),
        }
    }
}

/// Structural equality, as used by `S.equals`. Unlike `===`, `NaN` equals
/// itself and containers compare element-wise.
impl PartialEq for RuntimeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RuntimeValue::Number(a), RuntimeValue::Number(b)) => {
                a == b || (a.is_nan() && b.is_nan())
            }
            (RuntimeValue::Array(a), RuntimeValue::Array(b)) => a == b,
            (RuntimeValue::Object(a), RuntimeValue::Object(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(key, value)| {
                        b.iter().any(|(k, v)| k == key && v == value)
                    })
            }
            (RuntimeValue::Just(a), RuntimeValue::Just(b))
            | (RuntimeValue::Left(a), RuntimeValue::Left(b))
            | (RuntimeValue::Right(a), RuntimeValue::Right(b)) => a == b,
            (a, b) => a.strict_equals(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_format_like_javascript() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(-1.5), "-1.5");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn show_quotes_strings_inside_containers() {
        let value = RuntimeValue::array(vec![
            RuntimeValue::string("a\"b"),
            RuntimeValue::just(RuntimeValue::Number(1.0)),
            RuntimeValue::Nothing,
        ]);
        assert_eq!(value.show(), r#"["a\"b", Just(1), Nothing]"#);
    }

    #[test]
    fn show_objects_and_negative_zero() {
        let value = RuntimeValue::object(vec![
            ("x".to_string(), RuntimeValue::Number(-0.0)),
            ("y".to_string(), RuntimeValue::Null),
        ]);
        assert_eq!(value.show(), r#"{"x": -0, "y": null}"#);
    }

    #[test]
    fn js_string_conversion() {
        let value = RuntimeValue::array(vec![
            RuntimeValue::Number(1.0),
            RuntimeValue::Null,
            RuntimeValue::string("x"),
        ]);
        assert_eq!(value.to_js_string(), "1,,x");
        assert_eq!(RuntimeValue::object(vec![]).to_js_string(), "[object Object]");
    }

    #[test]
    fn truthiness() {
        assert!(RuntimeValue::Number(f64::NAN).is_falsy());
        assert!(RuntimeValue::string("").is_falsy());
        assert!(RuntimeValue::array(vec![]).is_truthy());
        assert!(RuntimeValue::Nothing.is_truthy());
    }

    #[test]
    fn structural_and_strict_equality_differ_for_containers() {
        let a = RuntimeValue::array(vec![RuntimeValue::Number(1.0)]);
        let b = RuntimeValue::array(vec![RuntimeValue::Number(1.0)]);
        assert_eq!(a, b);
        assert!(!a.strict_equals(&b));
        assert!(a.strict_equals(&a.clone()));
    }

    #[test]
    fn loose_equality_coerces_primitives() {
        assert!(RuntimeValue::Null.loose_equals(&RuntimeValue::Undefined));
        assert!(RuntimeValue::string("1").loose_equals(&RuntimeValue::Number(1.0)));
        assert!(!RuntimeValue::Null.loose_equals(&RuntimeValue::Number(0.0)));
    }
}
