//! Typographic touch-ups on rendered HTML: type-signature colons, arrows
//! and ellipses. Code blocks, example blocks and comments are left alone.

use std::sync::LazyLock;

use regex::Regex;

use crate::substitute::substitute;

/// ` :: ` as rendered; also recognised by the table of contents.
pub const COLONS: &str = r#" <span class="colons">:&#8202;:</span> "#;
const ELLIPSIS: &str = r#"<span class="ellipsis">.&#8202;.&#8202;.</span>"#;
const HYPHEN_ARROW: &str = r#"<span class="arrow"><span class="hyphen">-</span>&gt;</span>"#;

/// Alternatives in priority order. Group 1 is a protected region; groups 2
/// and 3 are the arrow heads.
static TYPOGRAPHY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?s)("#,
        r#"<pre[ >].*?</pre>"#,
        r#"|<div class="examples"></div>"#,
        r#"|<div class="examples">\n.*?\n</div>"#,
        r#"|<!--.*?-->"#,
        r#")"#,
        r#"| :: "#,
        r#"|([=~])(?:>|&gt;)"#,
        r#"|-(>|&gt;)"#,
        r#"|\.\.\."#,
    ))
    .unwrap()
});

pub fn typeset(html: &str) -> String {
    substitute(&TYPOGRAPHY, html, |groups| match groups {
        [Some(whole), Some(_), ..] => (*whole).to_string(),
        [_, _, Some(head), _] => format!(r#"<span class="arrow">{}&gt;</span>"#, head),
        [_, _, _, Some(_)] => HYPHEN_ARROW.to_string(),
        [Some(" :: "), ..] => COLONS.to_string(),
        [Some("..."), ..] => ELLIPSIS.to_string(),
        [whole, ..] => whole.unwrap_or_default().to_string(),
        [] => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colons() {
        assert_eq!(
            typeset("<code>map :: Functor f</code>"),
            r#"<code>map <span class="colons">:&#8202;:</span> Functor f</code>"#
        );
    }

    #[test]
    fn arrows_escaped_or_not() {
        assert_eq!(typeset("a =&gt; b"), r#"a <span class="arrow">=&gt;</span> b"#);
        assert_eq!(typeset("a => b"), r#"a <span class="arrow">=&gt;</span> b"#);
        assert_eq!(typeset("a ~> b"), r#"a <span class="arrow">~&gt;</span> b"#);
        assert_eq!(
            typeset("a -&gt; b"),
            r#"a <span class="arrow"><span class="hyphen">-</span>&gt;</span> b"#
        );
    }

    #[test]
    fn ellipsis() {
        assert_eq!(
            typeset("wait..."),
            r#"wait<span class="ellipsis">.&#8202;.&#8202;.</span>"#
        );
    }

    #[test]
    fn protected_regions_are_untouched() {
        for html in [
            "<pre><code>a -> b ... c :: d</code></pre>",
            "<pre class=\"x\">=></pre>",
            "<div class=\"examples\">\n    <input value=\"x =&gt; x\">\n</div>",
            "<div class=\"examples\"></div>",
            "<!-- a -> b -->",
        ] {
            assert_eq!(typeset(html), html);
        }
    }

    #[test]
    fn text_after_a_protected_region_is_still_typeset() {
        assert_eq!(
            typeset("<pre>-></pre> x -> y"),
            r#"<pre>-></pre> x <span class="arrow"><span class="hyphen">-</span>&gt;</span> y"#
        );
    }
}
