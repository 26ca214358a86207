//! Table of contents, folded from the headings of rendered content.
//!
//! Every nesting level is one `<ul>` of `<li>`s. Level-1 items (usually the
//! `h1` title) hold the `<ul id="toc">` of everything below them. A heading
//! never descends more than one level per step, and a heading with the same
//! tag as its predecessor stays at the predecessor's level.

use std::sync::LazyLock;

use regex::Regex;

use crate::typography::COLONS;

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<h([1-6]) id=(?:"([^"]*)"|([^\s">]+))[^>]*>(.*?)</h[1-6]>"#).unwrap()
});
static LINKED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^<a [^>]*>(<code>.*</code>)</a>$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: usize,
    pub id: String,
    pub html: String,
}

impl Heading {
    fn tag(&self) -> String {
        format!("h{}", self.level)
    }

    /// The link text. A heading that is itself a link around a type
    /// signature contributes only the signature, so links don't nest.
    pub fn label(&self) -> &str {
        LINKED_CODE
            .captures(&self.html)
            .and_then(|caps| caps.get(1))
            .map(|code| code.as_str())
            .filter(|code| !code.contains("</a>"))
            .filter(|code| code.contains(" :: ") || code.contains(COLONS))
            .unwrap_or(&self.html)
    }
}

/// Every heading with an id, in document order.
pub fn extract_headings(html: &str) -> Vec<Heading> {
    HEADING
        .captures_iter(html)
        .filter_map(|caps| {
            Some(Heading {
                level: caps.get(1)?.as_str().parse().ok()?,
                id: caps.get(2).or_else(|| caps.get(3))?.as_str().to_string(),
                html: caps.get(4)?.as_str().to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldState {
    pub level: usize,
    pub tag: String,
    pub html: String,
    /// A level-1 list is open, and so is its last item.
    pub root: bool,
}

impl Default for FoldState {
    fn default() -> Self {
        FoldState {
            level: 1,
            tag: "h1".to_string(),
            html: String::new(),
            root: false,
        }
    }
}

fn list_indent(level: usize) -> String {
    " ".repeat(4 * level.saturating_sub(1))
}

fn item_indent(level: usize) -> String {
    format!("{}  ", list_indent(level))
}

impl FoldState {
    fn line(mut self, indent: String, tag: &str) -> Self {
        self.html.push_str(&indent);
        self.html.push_str(tag);
        self.html.push('\n');
        self
    }

    fn open_item(self, level: usize, heading: &Heading) -> Self {
        let item = format!("<li><a href=\"#{}\">{}</a>", heading.id, heading.label());
        self.line(item_indent(level), &item)
    }

    fn close_item(self, level: usize) -> Self {
        self.line(item_indent(level), "</li>")
    }

    fn close_list(self, level: usize) -> Self {
        self.close_item(level).line(list_indent(level), "</ul>")
    }

    /// Close the previous item on `level` and open the next one. The first
    /// level-1 item also opens the level-1 list.
    fn sibling(self, level: usize, heading: &Heading) -> Self {
        let state = if level > 1 || self.root {
            self.close_item(level)
        } else {
            self.line(list_indent(1), "<ul>")
        };
        FoldState {
            root: state.root || level == 1,
            ..state.open_item(level, heading)
        }
    }

    /// Fold one heading into the state.
    pub fn step(self, heading: &Heading) -> Self {
        let tag = heading.tag();
        let level = self.level;
        let new_level = if heading.level > level {
            if tag == self.tag { level } else { level + 1 }
        } else {
            heading.level
        };

        let state = if new_level > level {
            let open = if level == 1 { "<ul id=\"toc\">" } else { "<ul>" };
            self.line(list_indent(new_level), open)
                .open_item(new_level, heading)
        } else {
            (new_level + 1..=level)
                .rev()
                .fold(self, |state, dropped| state.close_list(dropped))
                .sibling(new_level, heading)
        };

        FoldState {
            level: new_level,
            tag,
            ..state
        }
    }

    /// Close everything still open.
    pub fn finish(self) -> String {
        let state = (2..=self.level)
            .rev()
            .fold(self, |state, level| state.close_list(level));
        if state.root {
            state.close_list(1).html
        } else {
            state.html
        }
    }
}

pub fn table_of_contents(headings: &[Heading]) -> String {
    headings
        .iter()
        .fold(FoldState::default(), FoldState::step)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(level: usize, id: &str) -> Heading {
        Heading {
            level,
            id: id.to_string(),
            html: id.to_uppercase(),
        }
    }

    #[test]
    fn extraction() {
        let headings = extract_headings(
            "<h1 id=\"a\">A</h1>\n<p>x</p>\n<h3 id=\"b\" class=\"y\"><code>b</code></h3><h2>no id</h2>",
        );
        assert_eq!(
            headings,
            vec![
                Heading { level: 1, id: "a".into(), html: "A".into() },
                Heading { level: 3, id: "b".into(), html: "<code>b</code>".into() },
            ]
        );
    }

    #[test]
    fn siblings() {
        assert_eq!(
            table_of_contents(&[heading(2, "a"), heading(2, "b")]),
            "    <ul id=\"toc\">\n      <li><a href=\"#a\">A</a>\n      </li>\n      <li><a href=\"#b\">B</a>\n      </li>\n    </ul>\n"
        );
    }

    #[test]
    fn title_holds_the_nested_contents() {
        let toc = table_of_contents(&[heading(1, "a"), heading(2, "b"), heading(3, "c"), heading(2, "d")]);
        assert_eq!(
            toc,
            "<ul>
  <li><a href=\"#a\">A</a>
    <ul id=\"toc\">
      <li><a href=\"#b\">B</a>
        <ul>
          <li><a href=\"#c\">C</a>
          </li>
        </ul>
      </li>
      <li><a href=\"#d\">D</a>
      </li>
    </ul>
  </li>
</ul>
"
        );
    }

    #[test]
    fn later_titles_are_siblings_of_the_first() {
        let toc = table_of_contents(&[heading(1, "a"), heading(2, "b"), heading(1, "c")]);
        assert_eq!(toc.matches("<ul>").count(), 1);
        assert_eq!(toc.matches("<li>").count(), 3);
        assert_eq!(toc.matches("</li>").count(), 3);
        assert!(toc.ends_with("  <li><a href=\"#c\">C</a>\n  </li>\n</ul>\n"));
    }

    #[test]
    fn unquoted_ids() {
        let headings = extract_headings("<h1 id=a>A</h1><h2 id=b class=x>B</h2>");
        let ids: Vec<&str> = headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn descent_is_one_level_per_step() {
        let state = [heading(2, "a"), heading(5, "b")]
            .iter()
            .fold(FoldState::default(), FoldState::step);
        assert_eq!(state.level, 3);
        assert_eq!(state.tag, "h5");
    }

    #[test]
    fn repeated_deeper_tag_stays_at_the_same_level() {
        let state = [heading(2, "a"), heading(4, "b"), heading(4, "c")]
            .iter()
            .fold(FoldState::default(), FoldState::step);
        assert_eq!(state.level, 3);
    }

    #[test]
    fn ascent_closes_every_dropped_level() {
        let toc = table_of_contents(&[heading(2, "a"), heading(3, "b"), heading(4, "c"), heading(2, "d")]);
        assert_eq!(toc.matches("<ul").count(), 3);
        assert_eq!(toc.matches("</ul>").count(), 3);
        assert_eq!(toc.matches("<li>").count(), 4);
        assert_eq!(toc.matches("</li>").count(), 4);
    }

    #[test]
    fn empty() {
        assert_eq!(table_of_contents(&[]), "");
    }

    #[test]
    fn signature_labels_drop_their_link() {
        let linked = Heading {
            level: 3,
            id: "map".into(),
            html: format!("<a href=\"#map\"><code>map{}f</code></a>", COLONS),
        };
        assert_eq!(linked.label(), format!("<code>map{}f</code>", COLONS));

        let plain = Heading {
            level: 3,
            id: "x".into(),
            html: "<a href=\"#x\"><code>x</code></a>".into(),
        };
        assert_eq!(plain.label(), plain.html);

        let two_links = Heading {
            level: 3,
            id: "x".into(),
            html: "<a href=\"#x\"><code>x :: a</code></a> or <a href=\"#y\"><code>y</code></a>"
                .into(),
        };
        assert_eq!(two_links.label(), two_links.html);
    }
}
