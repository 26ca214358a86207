pub mod ast;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod runtime_value;

pub use environment::Environment;
pub use error::{ParseError, RuntimeError, SandboxError};
pub use runtime_value::RuntimeValue;

/// Name of the utility/combinator library binding.
pub const UTILITY_BINDING: &str = "R";
/// Name of the safety (Maybe/Either) library binding.
pub const SAFETY_BINDING: &str = "S";
/// Name of the total square-root binding.
pub const SQRT_BINDING: &str = "sqrt";

/// Parse and run one statement in a fresh realm.
pub fn run(source: &str) -> Result<RuntimeValue, SandboxError> {
    let statement = parser::parse(source)?;
    let env = Environment::sandbox();
    let value = evaluator::execute(&statement, &env)?;
    Ok(value)
}

/// Evaluate `source` and describe the outcome as text: the shown value on
/// success, the error's message on failure.
pub fn evaluate(source: &str) -> Result<String, String> {
    match run(source) {
        Ok(value) => Ok(value.show()),
        Err(err) => {
            tracing::debug!(source, error = %err, "evaluation failed");
            Err(err.to_string())
        }
    }
}

/// The production evaluator: each call gets its own realm.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sandbox;

impl Sandbox {
    pub fn evaluate(&self, source: &str) -> Result<String, String> {
        evaluate(source)
    }
}
