use std::io;
use std::path::PathBuf;

use docpage::DocError;
use thiserror::Error;

/// Anything that stops a build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("cannot read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid config '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// `text` is the content of `path`, kept for source-annotated reports.
    #[error("{}: {source}", path.display())]
    Doc {
        path: PathBuf,
        text: String,
        source: DocError,
    },
}

impl BuildError {
    pub fn read(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| BuildError::Read { path, source }
    }

    pub fn doc(path: impl Into<PathBuf>, text: String, source: impl Into<DocError>) -> Self {
        BuildError::Doc {
            path: path.into(),
            text,
            source: source.into(),
        }
    }
}
