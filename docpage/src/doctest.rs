//! Doctest blocks: REPL transcripts rendered as evaluated examples.
//!
//! A transcript line starting with `> ` opens a statement group and lines
//! starting with `. ` continue it. Every other line (typically the expected
//! output written by hand) closes the current group and is dropped, since
//! the output shown on the page comes from actually evaluating the input.

use crate::substitute::escape_html;

const PRIMARY: &str = "> ";
const CONTINUATION: &str = ". ";
const INDENT: &str = "    ";
/// A non-breaking space and `>`, already escaped.
const PROMPT: &str = "&#160;&gt;";

/// Something that can evaluate one transcript expression.
pub trait Evaluate {
    /// `Ok` holds the shown value, `Err` the error message.
    fn evaluate(&self, expression: &str) -> Result<String, String>;
}

impl Evaluate for sandbox::Sandbox {
    fn evaluate(&self, expression: &str) -> Result<String, String> {
        sandbox::evaluate(expression)
    }
}

impl<F> Evaluate for F
where
    F: Fn(&str) -> Result<String, String>,
{
    fn evaluate(&self, expression: &str) -> Result<String, String> {
        self(expression)
    }
}

/// One primary line and its continuation lines, prefixes stripped and
/// trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementGroup {
    lines: Vec<String>,
}

impl StatementGroup {
    fn new(first: &str) -> Self {
        StatementGroup {
            lines: vec![first.trim().to_string()],
        }
    }

    fn push(&mut self, line: &str) {
        self.lines.push(line.trim().to_string());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The logical expression: continuation lines are joined with a single
    /// space rather than a newline.
    pub fn expression(&self) -> String {
        self.lines.join(" ")
    }
}

/// Split a transcript into statement groups, in document order.
pub fn parse_transcript(block: &str) -> Vec<StatementGroup> {
    let mut groups = Vec::new();
    let mut current: Option<StatementGroup> = None;

    for line in block.lines() {
        if let Some(rest) = line.strip_prefix(PRIMARY) {
            groups.extend(current.take());
            current = Some(StatementGroup::new(rest));
        } else if let Some(rest) = line.strip_prefix(CONTINUATION)
            && let Some(group) = current.as_mut()
        {
            group.push(rest);
        } else {
            groups.extend(current.take());
        }
    }
    groups.extend(current);
    groups
}

/// The input as displayed: a leading `global.` becomes `const `, so
/// assignments to shared state read as ordinary declarations.
pub fn display_input(expression: &str) -> String {
    match expression.strip_prefix("global.") {
        Some(rest) => format!("const {}", rest),
        None => expression.to_string(),
    }
}

pub fn render_input(expression: &str) -> String {
    format!(
        "<input value=\"{}\">{}",
        escape_html(&display_input(expression)),
        PROMPT
    )
}

pub fn render_output(result: &Result<String, String>) -> String {
    match result {
        Ok(value) => format!("<div class=\"output\">{}</div>", escape_html(value)),
        Err(message) => format!(
            "<div class=\"output\" data-error=\"true\">{}</div>",
            escape_html(&format!("! {}", message))
        ),
    }
}

/// An evaluated statement group, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub input: String,
    pub output: String,
}

impl Example {
    pub fn evaluate(group: &StatementGroup, evaluator: &impl Evaluate) -> Self {
        let expression = group.expression();
        let result = evaluator.evaluate(&expression);
        tracing::debug!(
            expression = expression.as_str(),
            ok = result.is_ok(),
            "evaluated example"
        );
        Example {
            input: render_input(&expression),
            output: render_output(&result),
        }
    }

    fn to_form(&self) -> String {
        format!("<form>\n  {}\n  {}\n</form>", self.input, self.output)
    }
}

/// Render a whole transcript block as a `<div class="examples">` element.
pub fn render_block(block: &str, evaluator: &impl Evaluate) -> String {
    let examples: Vec<Example> = parse_transcript(block)
        .iter()
        .map(|group| Example::evaluate(group, evaluator))
        .collect();

    if examples.is_empty() {
        return "<div class=\"examples\"></div>".to_string();
    }

    let forms: Vec<String> = examples.iter().map(Example::to_form).collect();
    let body: Vec<String> = forms
        .join("\n")
        .lines()
        .map(|line| format!("{}{}", INDENT, line))
        .collect();
    format!("<div class=\"examples\">\n{}\n</div>", body.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_follow_primary_lines() {
        let groups = parse_transcript("> 1 +\n.   2\n3\n> 'x'\n");
        let expressions: Vec<String> = groups.iter().map(StatementGroup::expression).collect();
        assert_eq!(expressions, vec!["1 + 2", "'x'"]);
    }

    #[test]
    fn continuation_without_a_group_is_ignored() {
        let groups = parse_transcript(". orphan\n> 1\n");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].expression(), "1");
    }

    #[test]
    fn non_transcript_lines_end_a_group() {
        let groups = parse_transcript("> [1,\n. 2]\n[1, 2]\n. 3\n");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].expression(), "[1, 2]");
    }

    #[test]
    fn global_prefix_is_rewritten_for_display_only() {
        assert_eq!(display_input("global.x = 1"), "const x = 1");
        assert_eq!(display_input("x.global.y"), "x.global.y");
    }

    #[test]
    fn input_markup() {
        assert_eq!(
            render_input("a < \"b\""),
            "<input value=\"a &lt; &quot;b&quot;\">&#160;&gt;"
        );
    }

    #[test]
    fn output_markup() {
        assert_eq!(
            render_output(&Ok("\"<x>\"".to_string())),
            "<div class=\"output\">&quot;&lt;x&gt;&quot;</div>"
        );
        assert_eq!(
            render_output(&Err("TypeError: bad".to_string())),
            "<div class=\"output\" data-error=\"true\">! TypeError: bad</div>"
        );
    }

    #[test]
    fn empty_block() {
        let never = |_: &str| -> Result<String, String> { unreachable!() };
        assert_eq!(render_block("no transcript", &never), "<div class=\"examples\"></div>");
    }

    #[test]
    fn block_layout() {
        let echo = |s: &str| -> Result<String, String> { Ok(s.to_uppercase()) };
        assert_eq!(
            render_block("> a\n> b\n", &echo),
            "<div class=\"examples\">\n\
             \x20   <form>\n\
             \x20     <input value=\"a\">&#160;&gt;\n\
             \x20     <div class=\"output\">A</div>\n\
             \x20   </form>\n\
             \x20   <form>\n\
             \x20     <input value=\"b\">&#160;&gt;\n\
             \x20     <div class=\"output\">B</div>\n\
             \x20   </form>\n\
             </div>"
        );
    }
}
