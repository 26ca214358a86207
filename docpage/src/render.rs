//! Markdown document to HTML content, as an ordered list of named stages.

use std::collections::HashMap;
use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html::push_html};
use regex::Regex;

use crate::doctest::{Evaluate, render_block};
use crate::substitute::substitute;
use crate::typography::typeset;

/// Stands in for U+00A0 while the markdown renderer runs.
const NBSP_PLACEHOLDER: char = '\u{E000}';

static ANCHOR_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<(?:a|h[1-6])\b[^>]*?\s)name=""#).unwrap());
static DOCTEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mR)^```javascript\r?\n(> [\s\S]*?)^```$").unwrap());
static TRAILING_BLANK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n</code></pre>").unwrap());
static SUBHEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<h([2-6]) id="([^"]*)""#).unwrap());

type StageFn<'a> = Box<dyn Fn(&str) -> String + 'a>;

/// Renders a document, evaluating its doctests with `E`.
pub struct Renderer<'e, E: Evaluate> {
    evaluator: &'e E,
}

impl<'e, E: Evaluate> Renderer<'e, E> {
    pub fn new(evaluator: &'e E) -> Self {
        Renderer { evaluator }
    }

    /// The stages in the order they run. The order matters: doctests must be
    /// replaced before markdown sees them, and typography must come last.
    pub fn stages(&self) -> Vec<(&'static str, StageFn<'_>)> {
        vec![
            stage("anchor-ids", anchor_ids),
            stage("doctests", move |text: &str| doctests(text, self.evaluator)),
            stage("markdown", markdown),
            stage("code-blocks", trim_code_blocks),
            stage("pilcrows", pilcrows),
            stage("typography", typeset),
        ]
    }

    pub fn render(&self, document: &str) -> String {
        self.stages()
            .into_iter()
            .fold(document.to_string(), |text, (name, stage)| {
                let out = stage(&text);
                tracing::trace!(stage = name, bytes = out.len(), "render stage");
                out
            })
    }
}

fn stage<'a>(
    name: &'static str,
    f: impl Fn(&str) -> String + 'a,
) -> (&'static str, StageFn<'a>) {
    (name, Box::new(f))
}

/// `name="…"` on anchors and headings becomes `id="…"`.
pub fn anchor_ids(text: &str) -> String {
    substitute(&ANCHOR_NAME, text, |groups| {
        format!("{}id=\"", groups[1].unwrap_or_default())
    })
}

/// Replace every ```` ```javascript ```` transcript block with its rendered
/// examples.
pub fn doctests(text: &str, evaluator: &impl Evaluate) -> String {
    substitute(&DOCTEST, text, |groups| {
        render_block(groups[1].unwrap_or_default(), evaluator)
    })
}

pub fn markdown(text: &str) -> String {
    let protected = text.replace('\u{A0}', &NBSP_PLACEHOLDER.to_string());
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let events = HeadingIds::assign(Parser::new_ext(&protected, options));

    let mut html = String::with_capacity(protected.len() * 3 / 2);
    push_html(&mut html, events.into_iter());
    html.replace(NBSP_PLACEHOLDER, "\u{A0}")
}

pub fn trim_code_blocks(html: &str) -> String {
    substitute(&TRAILING_BLANK, html, |_| "\n</code></pre>".to_string())
}

/// A `¶` self-link in front of every h2–h6 that has an id.
pub fn pilcrows(html: &str) -> String {
    substitute(&SUBHEADING, html, |groups| {
        let level = groups[1].unwrap_or_default();
        let id = groups[2].unwrap_or_default();
        format!(
            "<a class=\"pilcrow h{level}\" href=\"#{id}\">\u{B6}</a>\n<h{level} id=\"{id}\""
        )
    })
}

/// Gives every markdown heading without an explicit id a slug of its text.
/// Repeated slugs get `-1`, `-2`, … appended.
struct HeadingIds {
    seen: HashMap<String, usize>,
}

impl HeadingIds {
    fn assign<'a>(parser: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
        let mut events: Vec<Event<'a>> = parser.collect();
        let mut ids = HeadingIds {
            seen: HashMap::new(),
        };

        let mut index = 0;
        while index < events.len() {
            if matches!(events[index], Event::Start(Tag::Heading { id: None, .. })) {
                let text = heading_text(&events[index + 1..]);
                let slug = ids.unique(slugify(&text));
                if let Event::Start(Tag::Heading { id, .. }) = &mut events[index] {
                    *id = Some(CowStr::from(slug));
                }
            }
            index += 1;
        }
        events
    }

    fn unique(&mut self, slug: String) -> String {
        let count = self.seen.entry(slug.clone()).or_insert(0);
        let unique = match *count {
            0 => slug,
            n => format!("{}-{}", slug, n),
        };
        *count += 1;
        unique
    }
}

fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(s) | Event::Code(s) => text.push_str(s),
            _ => {}
        }
    }
    text
}

pub fn slugify(text: &str) -> String {
    text.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .filter_map(|c| match c {
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
            c if c.is_whitespace() => Some('-'),
            _ => None,
        })
        .collect()
}
