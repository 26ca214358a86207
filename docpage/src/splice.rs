//! Fragment files: the text to find, a delimiter line, then the text that
//! replaces it.

use std::ops::Range;

use crate::error::SpliceError;

pub const DELIMITER: &str =
    "===============================================================================";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub placeholder: String,
    pub replacement: String,
}

/// Byte ranges of the lines that consist of the delimiter alone.
fn delimiter_lines(fragment: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for line in fragment.split_inclusive('\n') {
        let content = line.trim_end_matches('\n').trim_end_matches('\r');
        if content == DELIMITER {
            spans.push(offset..offset + content.len());
        }
        offset += line.len();
    }
    spans
}

impl Splice {
    pub fn parse(fragment: &str) -> Result<Self, SpliceError> {
        let spans = delimiter_lines(fragment);
        if spans.len() != 1 {
            return Err(SpliceError::DelimiterCount {
                count: spans.len(),
                spans,
            });
        }
        let span = &spans[0];

        let before = &fragment[..span.start];
        let rest = &fragment[span.end..];
        let after = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .unwrap_or(rest);

        Ok(Splice {
            placeholder: strip_newline(before).to_string(),
            replacement: strip_newline(after).to_string(),
        })
    }

    /// Replace the first occurrence of the placeholder.
    pub fn apply(&self, document: &str) -> Result<String, SpliceError> {
        if !document.contains(&self.placeholder) {
            return Err(SpliceError::PlaceholderNotFound {
                placeholder: self.placeholder.clone(),
            });
        }
        Ok(document.replacen(&self.placeholder, &self.replacement, 1))
    }
}

fn strip_newline(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

/// Parse `fragment` and apply it to `document`.
pub fn splice(document: &str, fragment: &str) -> Result<String, SpliceError> {
    Splice::parse(fragment)?.apply(document)
}
