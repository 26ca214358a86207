//! The version string shown on the page, read from a package manifest.

use std::path::Path;

use serde::Deserialize;

use crate::error::ManifestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    /// `package.json`
    Json,
    /// `Cargo.toml`
    Toml,
}

impl ManifestFormat {
    /// TOML for a `.toml` extension, JSON for anything else.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => ManifestFormat::Toml,
            _ => ManifestFormat::Json,
        }
    }
}

#[derive(Deserialize)]
struct PackageJson {
    version: Option<String>,
}

#[derive(Deserialize)]
struct CargoManifest {
    package: Option<CargoPackage>,
}

#[derive(Deserialize)]
struct CargoPackage {
    version: Option<toml::Value>,
}

pub fn read_version(format: ManifestFormat, source: &str) -> Result<String, ManifestError> {
    let version = match format {
        ManifestFormat::Json => serde_json::from_str::<PackageJson>(source)?.version,
        ManifestFormat::Toml => toml::from_str::<CargoManifest>(source)?
            .package
            .and_then(|package| package.version)
            .and_then(|version| version.as_str().map(str::to_string)),
    };
    version.ok_or(ManifestError::MissingVersion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json() {
        let version = read_version(ManifestFormat::Json, r#"{"name": "x", "version": "2.0.1"}"#);
        assert_eq!(version.ok(), Some("2.0.1".to_string()));
    }

    #[test]
    fn toml() {
        let source = "[package]\nname = \"x\"\nversion = \"0.4.0\"\n";
        assert_eq!(read_version(ManifestFormat::Toml, source).ok(), Some("0.4.0".to_string()));
    }

    #[test]
    fn inherited_workspace_version_is_missing() {
        let source = "[package]\nname = \"x\"\nversion.workspace = true\n";
        assert!(matches!(
            read_version(ManifestFormat::Toml, source),
            Err(ManifestError::MissingVersion)
        ));
    }

    #[test]
    fn malformed_json() {
        assert!(matches!(
            read_version(ManifestFormat::Json, "{ version: 1"),
            Err(ManifestError::Json(_))
        ));
    }

    #[test]
    fn missing_version() {
        assert!(matches!(
            read_version(ManifestFormat::Json, "{}"),
            Err(ManifestError::MissingVersion)
        ));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ManifestFormat::from_path(Path::new("Cargo.toml")), ManifestFormat::Toml);
        assert_eq!(ManifestFormat::from_path(Path::new("package.json")), ManifestFormat::Json);
    }
}
