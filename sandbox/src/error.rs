use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use thiserror::Error;

/// A syntax error in an evaluated expression, with the byte span it covers.
#[derive(Debug, Clone, Error)]
#[error("SyntaxError: {message}")]
pub struct ParseError {
    pub message: String,
    pub span: Range<usize>,
    pub notes: Vec<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Range<usize>) -> Self {
        ParseError {
            message: message.into(),
            span,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        Diagnostic::new(Severity::Error)
            .with_message(self.to_string())
            .with_labels(vec![Label::primary(file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}

/// Errors raised while evaluating a parsed statement.
///
/// The messages mirror what a JavaScript realm reports, since that is what
/// readers of the rendered examples expect to see.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("ReferenceError: {0} is not defined")]
    UndefinedVariable(String),

    #[error("TypeError: {0} is not a function")]
    NotAFunction(String),

    #[error("TypeError: Cannot read properties of {value} (reading '{property}')")]
    NullishProperty { value: String, property: String },

    #[error("TypeError: {function} expected {expected} but received {got}")]
    InvalidArgument {
        function: String,
        expected: String,
        got: String,
    },

    #[error("TypeError: {0}")]
    Type(String),

    #[error("RangeError: Maximum call stack size exceeded")]
    StackOverflow,

    #[error("RangeError: {0}")]
    Range(String),

    #[error("Error: {0}")]
    Custom(String),
}

impl RuntimeError {
    pub fn invalid_argument(
        function: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        RuntimeError::InvalidArgument {
            function: function.into(),
            expected: expected.into(),
            got: got.into(),
        }
    }
}

/// Either failure mode of [`crate::run`].
#[derive(Debug, Clone, Error)]
pub enum SandboxError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
