use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::BuildArgs;
use crate::error::BuildError;

/// Looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "docpage.toml";
pub const DEFAULT_OUTPUT: &str = "index.html";
pub const DEFAULT_FRAGMENTS: &[&str] = &["custom/intro.md", "custom/outro.md"];
pub const DEFAULT_MANIFEST: &str = "package.json";

/// The contents of `docpage.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output: Option<PathBuf>,
    pub fragments: Option<Vec<PathBuf>>,
    pub manifest: Option<PathBuf>,
    pub title: Option<String>,
}

impl Config {
    /// Load `explicit`, or `docpage.toml` if it exists. An explicit path
    /// that is missing is an error; a missing default is an empty config.
    pub fn load(explicit: Option<&Path>) -> Result<Self, BuildError> {
        let path = match explicit {
            Some(path) => path,
            None if Path::new(CONFIG_FILE).is_file() => Path::new(CONFIG_FILE),
            None => return Ok(Config::default()),
        };
        let text = fs::read_to_string(path).map_err(BuildError::read(path))?;
        let config = Self::parse(&text).map_err(|source| BuildError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Everything a build needs, after flags, config and defaults are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub fragments: Vec<PathBuf>,
    pub manifest: PathBuf,
    pub title: String,
}

impl Settings {
    /// Flags win over the config file, which wins over the defaults.
    pub fn resolve(args: BuildArgs, config: Config) -> Self {
        let fragments = if args.fragments.is_empty() {
            config
                .fragments
                .unwrap_or_else(|| DEFAULT_FRAGMENTS.iter().map(PathBuf::from).collect())
        } else {
            args.fragments
        };
        let manifest = args.manifest.or(config.manifest).unwrap_or_else(|| {
            args.file
                .parent()
                .unwrap_or(Path::new(""))
                .join(DEFAULT_MANIFEST)
        });

        Settings {
            output: args
                .output
                .or(config.output)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            fragments,
            manifest,
            title: args
                .title
                .or(config.title)
                .unwrap_or_else(|| docpage::DEFAULT_TITLE.to_string()),
            input: args.file,
        }
    }
}
