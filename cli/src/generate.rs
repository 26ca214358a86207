//! One build: read, splice, render, assemble, write.

use std::fs;
use std::path::{Path, PathBuf};

use docpage::{ManifestFormat, Page, Pipeline};

use crate::config::Settings;
use crate::error::BuildError;

fn read(path: &Path) -> Result<String, BuildError> {
    fs::read_to_string(path).map_err(BuildError::read(path))
}

fn apply_fragment(document: String, path: &Path) -> Result<String, BuildError> {
    let fragment = read(path)?;
    docpage::splice(&document, &fragment)
        .map_err(|error| BuildError::doc(path, fragment, error))
}

fn read_version(path: &Path) -> Result<String, BuildError> {
    let text = read(path)?;
    docpage::read_version(ManifestFormat::from_path(path), &text)
        .map_err(|error| BuildError::doc(path, text, error))
}

/// Build the page described by `settings` and return where it was written.
pub fn build(settings: &Settings) -> Result<PathBuf, BuildError> {
    let pipeline = Pipeline::new()
        .then("read", |input: &Path| read(input))
        .then("splice", |document: String| {
            settings
                .fragments
                .iter()
                .try_fold(document, |document, path| apply_fragment(document, path))
        })
        .then("version", |document: String| {
            read_version(&settings.manifest).map(|version| (document, version))
        })
        .map("render", |(document, version): (String, String)| {
            (docpage::render(&document), version)
        })
        .map("assemble", |(content, version): (String, String)| {
            let page = Page::new(version).with_title(settings.title.as_str());
            (content.matches("<form>").count(), page.render(&content))
        })
        .then("write", |(examples, html): (usize, String)| {
            fs::write(&settings.output, &html)
                .map(|()| (examples, html.len()))
                .map_err(|source| BuildError::Write {
                    path: settings.output.clone(),
                    source,
                })
        });

    let (examples, bytes) = pipeline.run(settings.input.as_path())?;
    tracing::info!(
        input = %settings.input.display(),
        output = %settings.output.display(),
        examples,
        bytes,
        "generated page"
    );
    Ok(settings.output.clone())
}
