use crate::ast::{BinaryOperator, Expr, Statement, UnaryOperator};
use crate::builtins::{Arity, Builtin, Caller, intrinsics, methods};
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::runtime_value::{Closure, Function, RuntimeValue, TypeRep};

const MAX_DEPTH: usize = 256;

/// Run one statement. Declarations evaluate to `undefined`; assignments
/// evaluate to the assigned value.
pub fn execute(statement: &Statement, env: &Environment) -> Result<RuntimeValue, RuntimeError> {
    match statement {
        Statement::Expression(expr) => evaluate(expr, env, 0),
        Statement::Declaration { kind, name, value } => {
            let value = evaluate(value, env, 0)?;
            tracing::trace!(?kind, name = name.as_str(), "declare");
            env.define(name, value);
            Ok(RuntimeValue::Undefined)
        }
        Statement::Assignment { name, value } => {
            let value = evaluate(value, env, 0)?;
            env.assign(name, value.clone());
            Ok(value)
        }
        Statement::GlobalAssignment { name, value } => {
            let value = evaluate(value, env, 0)?;
            env.define_global(name, value.clone());
            Ok(value)
        }
    }
}

/// Evaluate an expression to a RuntimeValue.
pub fn evaluate(expr: &Expr, env: &Environment, depth: usize) -> Result<RuntimeValue, RuntimeError> {
    if depth > MAX_DEPTH {
        return Err(RuntimeError::StackOverflow);
    }

    match expr {
        // --- Literals ---
        Expr::NumberLiteral(n) => Ok(RuntimeValue::Number(*n)),
        Expr::StringLiteral(s) => Ok(RuntimeValue::String(s.clone())),
        Expr::BooleanLiteral(b) => Ok(RuntimeValue::Boolean(*b)),
        Expr::NullLiteral => Ok(RuntimeValue::Null),
        Expr::UndefinedLiteral => Ok(RuntimeValue::Undefined),
        Expr::ArrayLiteral(items) => Ok(RuntimeValue::array(
            items
                .iter()
                .map(|item| evaluate(item, env, depth + 1))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        Expr::ObjectLiteral(entries) => {
            let mut object: Vec<(String, RuntimeValue)> = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                let value = evaluate(value, env, depth + 1)?;
                // A repeated key keeps its first position and its last value.
                match object.iter_mut().find(|(k, _)| k == key) {
                    Some(entry) => entry.1 = value,
                    None => object.push((key.clone(), value)),
                }
            }
            Ok(RuntimeValue::object(object))
        }

        // --- References ---
        Expr::Variable(name, _) => env
            .get(name)
            .ok_or_else(|| RuntimeError::UndefinedVariable(name.clone())),
        Expr::Member {
            object, property, ..
        } => {
            let object = evaluate(object, env, depth + 1)?;
            methods::property(&object, property)
        }
        Expr::Index { object, index, .. } => {
            let object = evaluate(object, env, depth + 1)?;
            let index = evaluate(index, env, depth + 1)?;
            eval_index(&object, &index)
        }

        // --- Functions ---
        Expr::Arrow(function) => Ok(RuntimeValue::Function(Function::Closure(Closure {
            function: function.clone(),
            env: env.clone(),
        }))),
        Expr::Call {
            callee, arguments, ..
        } => {
            let function = evaluate(callee, env, depth + 1)?;
            let args = arguments
                .iter()
                .map(|arg| evaluate(arg, env, depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            if !function.is_callable() {
                let name = describe(callee).unwrap_or_else(|| function.show());
                return Err(RuntimeError::NotAFunction(name));
            }
            apply(&function, args, depth + 1)
        }

        // --- Operations ---
        Expr::UnaryOperation { operator, operand } => {
            // `typeof` tolerates undeclared names.
            if *operator == UnaryOperator::TypeOf
                && let Expr::Variable(name, _) = operand.as_ref()
                && env.get(name).is_none()
            {
                return Ok(RuntimeValue::string("undefined"));
            }
            let value = evaluate(operand, env, depth + 1)?;
            Ok(match operator {
                UnaryOperator::Negation => RuntimeValue::Number(-value.to_number()),
                UnaryOperator::Plus => RuntimeValue::Number(value.to_number()),
                UnaryOperator::LogicalNot => RuntimeValue::Boolean(value.is_falsy()),
                UnaryOperator::TypeOf => RuntimeValue::string(value.type_of()),
            })
        }

        Expr::BinaryOperation {
            operator,
            left,
            right,
        } => {
            let l = evaluate(left, env, depth + 1)?;
            // `&&` and `||` return one of their operands and skip the right
            // side when the left decides.
            match operator {
                BinaryOperator::LogicalAnd if l.is_falsy() => return Ok(l),
                BinaryOperator::LogicalOr if l.is_truthy() => return Ok(l),
                BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr => {
                    return evaluate(right, env, depth + 1);
                }
                _ => {}
            }
            let r = evaluate(right, env, depth + 1)?;
            Ok(eval_binary_op(operator, &l, &r))
        }

        Expr::Conditional {
            condition,
            true_branch,
            false_branch,
        } => {
            let condition = evaluate(condition, env, depth + 1)?;
            if condition.is_truthy() {
                evaluate(true_branch, env, depth + 1)
            } else {
                evaluate(false_branch, env, depth + 1)
            }
        }
    }
}

/// Call `function` with `args`.
///
/// Curried built-ins accumulate arguments until saturated; any surplus is
/// applied to the result. Closures bind missing parameters to `undefined`
/// and ignore extra arguments.
pub fn apply(
    function: &RuntimeValue,
    args: Vec<RuntimeValue>,
    depth: usize,
) -> Result<RuntimeValue, RuntimeError> {
    if depth > MAX_DEPTH {
        return Err(RuntimeError::StackOverflow);
    }

    match function {
        RuntimeValue::Function(Function::Closure(closure)) => {
            let scope = closure.env.child();
            let mut args = args.into_iter();
            for param in &closure.function.params {
                scope.define(param, args.next().unwrap_or(RuntimeValue::Undefined));
            }
            evaluate(&closure.function.body, &scope, depth + 1)
        }
        RuntimeValue::Function(Function::Builtin(builtin)) => apply_builtin(builtin, args, depth),
        RuntimeValue::TypeRep(rep @ (TypeRep::Number | TypeRep::String | TypeRep::Boolean)) => {
            intrinsics::convert(*rep, &args)
        }
        other => Err(RuntimeError::NotAFunction(other.show())),
    }
}

fn apply_builtin(
    builtin: &Builtin,
    args: Vec<RuntimeValue>,
    depth: usize,
) -> Result<RuntimeValue, RuntimeError> {
    let mut all = builtin.applied.clone();
    all.extend(args);
    let caller = Caller::new(depth);

    match builtin.arity {
        Arity::Variadic => (builtin.imp)(&all, &caller),
        Arity::Curried(arity) if all.len() < arity => Ok(RuntimeValue::builtin(
            builtin.clone().with_applied(all),
        )),
        Arity::Curried(arity) => {
            let surplus = all.split_off(arity);
            tracing::trace!(name = builtin.name, surplus = surplus.len(), "call builtin");
            let result = (builtin.imp)(&all, &caller)?;
            if surplus.is_empty() {
                Ok(result)
            } else if result.is_callable() {
                apply(&result, surplus, depth + 1)
            } else {
                Err(RuntimeError::NotAFunction(format!(
                    "{}(...)",
                    builtin.name
                )))
            }
        }
    }
}

fn eval_index(object: &RuntimeValue, index: &RuntimeValue) -> Result<RuntimeValue, RuntimeError> {
    match (object, index) {
        (RuntimeValue::Array(items), RuntimeValue::Number(n)) => Ok(index_of(*n, items.len())
            .map_or(RuntimeValue::Undefined, |i| items[i].clone())),
        (RuntimeValue::String(s), RuntimeValue::Number(n)) => Ok(index_of(*n, s.chars().count())
            .and_then(|i| s.chars().nth(i))
            .map_or(RuntimeValue::Undefined, |c| RuntimeValue::String(c.to_string()))),
        (object, key) => methods::property(object, &key.to_js_string()),
    }
}

/// Computed access only accepts in-range non-negative integers.
fn index_of(n: f64, len: usize) -> Option<usize> {
    (n.fract() == 0.0 && n >= 0.0 && n < len as f64).then_some(n as usize)
}

fn eval_binary_op(op: &BinaryOperator, left: &RuntimeValue, right: &RuntimeValue) -> RuntimeValue {
    match op {
        BinaryOperator::Addition => {
            let numeric = |v: &RuntimeValue| {
                matches!(
                    v,
                    RuntimeValue::Number(_)
                        | RuntimeValue::Boolean(_)
                        | RuntimeValue::Null
                        | RuntimeValue::Undefined
                )
            };
            if numeric(left) && numeric(right) {
                RuntimeValue::Number(left.to_number() + right.to_number())
            } else {
                RuntimeValue::String(format!("{}{}", left.to_js_string(), right.to_js_string()))
            }
        }
        BinaryOperator::Subtraction => numeric_binop(left, right, |a, b| a - b),
        BinaryOperator::Multiplication => numeric_binop(left, right, |a, b| a * b),
        BinaryOperator::Division => numeric_binop(left, right, |a, b| a / b),
        BinaryOperator::Modulo => numeric_binop(left, right, |a, b| a % b),
        BinaryOperator::StrictEquality => RuntimeValue::Boolean(left.strict_equals(right)),
        BinaryOperator::StrictInequality => RuntimeValue::Boolean(!left.strict_equals(right)),
        BinaryOperator::LooseEquality => RuntimeValue::Boolean(left.loose_equals(right)),
        BinaryOperator::LooseInequality => RuntimeValue::Boolean(!left.loose_equals(right)),
        BinaryOperator::GreaterThan => compare(left, right, |o| o.is_gt()),
        BinaryOperator::LessThan => compare(left, right, |o| o.is_lt()),
        BinaryOperator::GreaterThanOrEqual => compare(left, right, |o| o.is_ge()),
        BinaryOperator::LessThanOrEqual => compare(left, right, |o| o.is_le()),
        // Short-circuited in `evaluate`.
        BinaryOperator::LogicalAnd => right.clone(),
        BinaryOperator::LogicalOr => right.clone(),
    }
}

fn numeric_binop(
    left: &RuntimeValue,
    right: &RuntimeValue,
    f: impl Fn(f64, f64) -> f64,
) -> RuntimeValue {
    RuntimeValue::Number(f(left.to_number(), right.to_number()))
}

/// Relational comparison: strings compare by code point, everything else
/// numerically. Any `NaN` makes the comparison false.
fn compare(
    left: &RuntimeValue,
    right: &RuntimeValue,
    f: impl Fn(std::cmp::Ordering) -> bool,
) -> RuntimeValue {
    let ordering = match (left, right) {
        (RuntimeValue::String(a), RuntimeValue::String(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    };
    RuntimeValue::Boolean(ordering.is_some_and(f))
}

/// Source-like description of a callee for "is not a function" errors.
fn describe(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Variable(name, _) => Some(name.clone()),
        Expr::Member {
            object, property, ..
        } => describe(object).map(|object| format!("{}.{}", object, property)),
        Expr::Index { object, .. } => describe(object).map(|object| format!("{}[...]", object)),
        Expr::Call { callee, .. } => describe(callee).map(|callee| format!("{}(...)", callee)),
        _ => None,
    }
}
