use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use thiserror::Error;

/// A fragment file that cannot be applied to the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpliceError {
    /// `spans` covers each delimiter line that was found, possibly none.
    #[error("expected exactly one delimiter line, found {count}")]
    DelimiterCount {
        count: usize,
        spans: Vec<Range<usize>>,
    },

    #[error("placeholder not found in document: {placeholder:?}")]
    PlaceholderNotFound { placeholder: String },
}

impl SpliceError {
    /// Diagnostic against the fragment file's source.
    pub fn to_diagnostic<FileId: Copy>(&self, file_id: FileId) -> Diagnostic<FileId> {
        let diagnostic = Diagnostic::new(Severity::Error).with_message(self.to_string());
        match self {
            SpliceError::DelimiterCount { spans, .. } if spans.is_empty() => diagnostic
                .with_labels(vec![Label::primary(file_id, 0..0)])
                .with_notes(vec![
                    "a fragment is the text to find, a line of 79 `=`, then its replacement"
                        .to_string(),
                ]),
            SpliceError::DelimiterCount { spans, .. } => diagnostic.with_labels(
                spans
                    .iter()
                    .map(|span| Label::primary(file_id, span.clone()).with_message("delimiter"))
                    .collect(),
            ),
            SpliceError::PlaceholderNotFound { .. } => diagnostic,
        }
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("malformed JSON manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed TOML manifest: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("manifest has no version")]
    MissingVersion,
}

#[derive(Debug, Error)]
pub enum DocError {
    #[error(transparent)]
    Splice(#[from] SpliceError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}
