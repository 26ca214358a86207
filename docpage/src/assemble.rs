use crate::substitute::escape_html;
use crate::toc::{extract_headings, table_of_contents};

pub const DEFAULT_TITLE: &str = "Documentation";

/// The page around the rendered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub version: String,
}

impl Page {
    pub fn new(version: impl Into<String>) -> Self {
        Page {
            title: DEFAULT_TITLE.to_string(),
            version: version.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn render(&self, content: &str) -> String {
        let toc = table_of_contents(&extract_headings(content));
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="style.css">
</head>
<body>
<div id="css-header">
<span class="version">v{version}</span>
</div>
<nav>
{toc}</nav>
<main>
{content}</main>
</body>
</html>
"#,
            title = escape_html(&self.title),
            version = escape_html(&self.version),
        )
    }
}

/// Wrap `content` in a page with the default title.
pub fn assemble(version: &str, content: &str) -> String {
    Page::new(version).render(content)
}
