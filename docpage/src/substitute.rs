//! Pattern-driven text substitution.
//!
//! Every rewrite in the renderer, from HTML escaping to typography, is a
//! call to [`substitute`] with a precompiled pattern.

use std::sync::LazyLock;

use regex::Regex;

/// Replace every non-overlapping match of `pattern` in `subject` with the
/// result of `f`. Text between matches is copied verbatim.
///
/// `f` receives the capture groups of the match: index 0 is the whole match,
/// and groups that did not participate are `None`.
pub fn substitute<F>(pattern: &Regex, subject: &str, mut f: F) -> String
where
    F: FnMut(&[Option<&str>]) -> String,
{
    let mut out = String::with_capacity(subject.len());
    let mut last = 0;
    for caps in pattern.captures_iter(subject) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&subject[last..whole.start()]);
        let groups: Vec<Option<&str>> = caps.iter().map(|m| m.map(|m| m.as_str())).collect();
        out.push_str(&f(&groups));
        last = whole.end();
    }
    out.push_str(&subject[last..]);
    out
}

/// Entity replacements, applied in this order. `&` has to come first so the
/// entities produced by later steps are not escaped again.
static ESCAPES: LazyLock<[(Regex, &str); 4]> = LazyLock::new(|| {
    [
        (Regex::new("&").unwrap(), "&amp;"),
        (Regex::new("<").unwrap(), "&lt;"),
        (Regex::new(">").unwrap(), "&gt;"),
        (Regex::new("\"").unwrap(), "&quot;"),
    ]
});

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    ESCAPES
        .iter()
        .fold(text.to_string(), |acc, (pattern, entity)| {
            substitute(pattern, &acc, |_| (*entity).to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_text_is_copied() {
        let digits = Regex::new(r"\d+").unwrap();
        assert_eq!(substitute(&digits, "no digits here", |_| "X".into()), "no digits here");
        assert_eq!(substitute(&digits, "a1b22c", |_| "#".into()), "a#b#c");
    }

    #[test]
    fn groups_are_passed_positionally() {
        let pattern = Regex::new(r"(a)|(b)").unwrap();
        let out = substitute(&pattern, "ab", |groups| match groups {
            [_, Some(_), None] => "first".into(),
            [_, None, Some(_)] => "second".into(),
            _ => unreachable!(),
        });
        assert_eq!(out, "firstsecond");
    }

    #[test]
    fn patterns_may_span_lines() {
        let pattern = Regex::new(r"(?s)<pre>.*?</pre>").unwrap();
        assert_eq!(substitute(&pattern, "x<pre>1\n2</pre>y", |_| "P".into()), "xPy");
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_html("<b>"), "&lt;b&gt;");
        assert_eq!(escape_html("&"), "&amp;");
        assert_eq!(escape_html(r#"say "hi""#), "say &quot;hi&quot;");
        assert_eq!(escape_html("a < b && c"), "a &lt; b &amp;&amp; c");
    }
}
