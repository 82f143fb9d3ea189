//! Document formats understood by the loader
//!
//! Every format is normalized to a JSON value tree, so validation never
//! needs to know where a document came from.

use crate::error::{Error, Result};
use serde_json::Value;
use std::path::Path;

/// Structured-text format of a settings source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// JSON (default)
    #[default]
    Json,
    /// TOML (requires the `toml` feature)
    Toml,
    /// YAML (requires the `yaml` feature)
    Yaml,
}

impl Format {
    /// Pick a format from a file extension. Unknown or missing extensions
    /// fall back to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => Format::Toml,
            Some("yaml" | "yml") => Format::Yaml,
            _ => Format::Json,
        }
    }

    /// Canonical file extension for this format
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Toml => "toml",
            Format::Yaml => "yaml",
        }
    }

    /// Parse `content` into a value tree.
    ///
    /// `origin` names the source in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedDocument`] if the content does not parse, or
    /// if the format's cargo feature is disabled.
    pub fn parse(self, content: &str, origin: &str) -> Result<Value> {
        match self {
            Format::Json => serde_json::from_str(content).map_err(|e| Error::malformed(origin, e)),
            Format::Toml => parse_toml(content, origin),
            Format::Yaml => parse_yaml(content, origin),
        }
    }
}

#[cfg(feature = "toml")]
fn parse_toml(content: &str, origin: &str) -> Result<Value> {
    let table: toml::Table = toml::from_str(content).map_err(|e| Error::malformed(origin, e))?;
    serde_json::to_value(table).map_err(|e| Error::malformed(origin, e))
}

#[cfg(not(feature = "toml"))]
fn parse_toml(_content: &str, origin: &str) -> Result<Value> {
    Err(Error::malformed(
        origin,
        "TOML sources require the `toml` feature",
    ))
}

#[cfg(feature = "yaml")]
fn parse_yaml(content: &str, origin: &str) -> Result<Value> {
    serde_yaml::from_str(content).map_err(|e| Error::malformed(origin, e))
}

#[cfg(not(feature = "yaml"))]
fn parse_yaml(_content: &str, origin: &str) -> Result<Value> {
    Err(Error::malformed(
        origin,
        "YAML sources require the `yaml` feature",
    ))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("settings.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("settings.TOML")), Format::Toml);
        assert_eq!(Format::from_path(Path::new("a/b.yml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("settings")), Format::Json);
        assert_eq!(Format::from_path(Path::new("settings.conf")), Format::Json);
    }

    #[test]
    fn test_parse_json() {
        let value = Format::Json
            .parse(r#"{"flowFile": "flows.json"}"#, "inline")
            .unwrap();
        assert_eq!(value, json!({"flowFile": "flows.json"}));
    }

    #[test]
    fn test_parse_malformed_json() {
        let result = Format::Json.parse("{flowFile: ", "broken.json");
        match result {
            Err(Error::MalformedDocument { origin, .. }) => assert_eq!(origin, "broken.json"),
            other => panic!("expected MalformedDocument, got {other:?}"),
        }
    }

    #[cfg(not(feature = "toml"))]
    #[test]
    fn test_toml_disabled() {
        assert!(matches!(
            Format::Toml.parse("a = 1", "s.toml"),
            Err(Error::MalformedDocument { .. })
        ));
    }
}
