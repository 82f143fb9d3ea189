//! Environment variable overlay
//!
//! Builds a document layer from variables named after registered settings.

use super::RawDocument;
use crate::config::{EnvSource, SchemaRegistry};
use log::debug;
use serde_json::Value;
use std::sync::Arc;

/// Handles environment variable lookups for registered settings
pub struct EnvironmentHandler {
    prefix: Option<String>,
    source: Arc<dyn EnvSource>,
}

impl EnvironmentHandler {
    pub fn new(prefix: Option<String>, source: Arc<dyn EnvSource>) -> Self {
        Self { prefix, source }
    }

    /// Get the environment variable name for a setting path
    ///
    /// Returns None if env var overrides are disabled.
    /// Format: {PREFIX}_{SEGMENT}_{SEGMENT} (all uppercase)
    pub fn get_env_var_name(&self, path: &str) -> Option<String> {
        self.prefix.as_ref().map(|prefix| {
            let env_key = path.replace(['.', '-'], "_").to_uppercase();
            format!("{}_{}", prefix.to_uppercase(), env_key)
        })
    }

    /// Collect every leaf setting that has a matching variable.
    ///
    /// Values are kept as strings; the validator coerces them to the declared
    /// type.
    pub fn overlay(&self, registry: &SchemaRegistry) -> RawDocument {
        let mut doc = RawDocument::new();
        for entry in registry.leaves() {
            let Some(name) = self.get_env_var_name(&entry.path) else {
                break;
            };
            if let Ok(value) = self.source.var(&name) {
                debug!("Setting {} overridden by ${name}", entry.path);
                doc.set_path(&entry.path, Value::String(value));
            }
        }
        doc
    }
}
