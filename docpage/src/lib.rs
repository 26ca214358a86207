//! Turns a README with REPL-transcript doctests into a static HTML page.

pub mod assemble;
pub mod doctest;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod render;
pub mod splice;
pub mod substitute;
pub mod toc;
pub mod typography;

pub use assemble::{DEFAULT_TITLE, Page, assemble};
pub use doctest::Evaluate;
pub use error::{DocError, ManifestError, SpliceError};
pub use manifest::{ManifestFormat, read_version};
pub use pipeline::Pipeline;
pub use render::Renderer;
pub use splice::{DELIMITER, Splice, splice};
pub use substitute::{escape_html, substitute};

/// Render `document` to HTML content, evaluating doctests in the sandbox.
pub fn render(document: &str) -> String {
    Renderer::new(&sandbox::Sandbox).render(document)
}

/// Render `document` and wrap it in `page`.
pub fn generate(document: &str, page: &Page) -> String {
    page.render(&render(document))
}
