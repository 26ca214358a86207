use docpage::doctest::parse_transcript;
use docpage::escape_html;
use docpage::typography::typeset;
use proptest::prelude::*;

fn unescape(html: &str) -> String {
    html.replace("&quot;", "\"")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}

proptest! {
    #[test]
    fn single_line_group_is_the_trimmed_line(line in "[^\n\r]*") {
        let groups = parse_transcript(&format!("> {}", line));
        prop_assert_eq!(groups.len(), 1);
        prop_assert_eq!(groups[0].expression(), line.trim());
    }

    #[test]
    fn joined_groups_rejoin_to_themselves(
        lines in prop::collection::vec("[a-z0-9+*()]([a-z0-9+*() ]{0,6}[a-z0-9+*()])?", 1..6)
    ) {
        let mut transcript = format!("> {}\n", lines[0]);
        for line in &lines[1..] {
            transcript.push_str(&format!(". {}\n", line));
        }
        let joined = parse_transcript(&transcript)[0].expression();
        prop_assert_eq!(&joined, &lines.join(" "));

        let again = parse_transcript(&format!("> {}", joined))[0].expression();
        prop_assert_eq!(again, joined);
    }

    #[test]
    fn escaping_leaves_no_markup(text in any::<String>()) {
        let escaped = escape_html(&text);
        prop_assert!(!escaped.contains('<'));
        prop_assert!(!escaped.contains('>'));
        prop_assert!(!escaped.contains('"'));
        prop_assert_eq!(unescape(&escaped), text);
    }

    #[test]
    fn plain_prose_is_not_typeset(text in "[a-zA-Z0-9 ,;]*") {
        prop_assert_eq!(typeset(&text), text);
    }

    #[test]
    fn code_blocks_are_never_typeset(code in "[a-z :.=~>-]*") {
        let html = format!("<pre><code>{}</code></pre>", code);
        prop_assert_eq!(typeset(&html), html);
    }
}
