//! Common test utilities for flowconf integration tests
//!
//! Provides shared documents, a temp-dir fixture and helper functions.

#![allow(dead_code)]

use flowconf::{
    LoaderConfig, SettingsLoader, SettingsStore, Source, ValidatedSettings, flow_registry,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

// =============================================================================
// Documents
// =============================================================================

/// The deployment document the runtime ships with
pub fn deployment_document() -> Value {
    json!({
        "flowFile": "flows.json",
        "flowFilePretty": true,
        "userDir": "/data",
        "editorTheme": {
            "projects": {
                "enabled": true,
                "workflow": {"mode": "auto"}
            },
            "multiplayer": {"enabled": true}
        },
        "functionExternalModules": true
    })
}

/// Same document with an explicit editor theme
pub fn themed_deployment_document() -> Value {
    let mut doc = deployment_document();
    doc["editorTheme"]["theme"] = json!("midnight-red");
    doc
}

// =============================================================================
// Logging
// =============================================================================

/// Route library logs to the test harness; `RUST_LOG=debug` shows them
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// =============================================================================
// Test Fixtures
// =============================================================================

/// Temp directory plus a loader and store sharing the flow registry
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub loader: SettingsLoader,
    pub store: Arc<SettingsStore>,
}

impl TestFixture {
    /// Create a fixture with no env overlay
    pub fn new() -> Self {
        Self::with_config(|builder| builder)
    }

    /// Create a fixture reading env overlays from `vars` with prefix `FLOW`
    pub fn with_env(vars: &[(&str, &str)]) -> Self {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self::with_config(move |builder| builder.with_env_prefix("FLOW").with_env_source(vars))
    }

    fn with_config(
        configure: impl FnOnce(flowconf::LoaderConfigBuilder) -> flowconf::LoaderConfigBuilder,
    ) -> Self {
        init_logging();
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let registry = Arc::new(flow_registry());
        let config = configure(LoaderConfig::builder().base_dir(temp_dir.path())).build();
        let loader = SettingsLoader::new(registry.clone(), config);
        let store = Arc::new(SettingsStore::new(registry));

        Self {
            temp_dir,
            loader,
            store,
        }
    }

    /// Write `content` to a file in the temp dir and return a source for it
    pub fn write_source(&self, name: &str, content: &str) -> Source {
        let path = self.path(name);
        std::fs::write(&path, content).expect("Failed to write settings file");
        Source::File(path)
    }

    /// Write a JSON document to a file in the temp dir
    pub fn write_json(&self, name: &str, value: &Value) -> Source {
        self.write_source(name, &serde_json::to_string_pretty(value).unwrap())
    }

    /// Path inside the temp dir
    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Load and validate inline documents, in order
    pub fn validated(&self, docs: &[Value]) -> ValidatedSettings {
        let sources: Vec<Source> = docs.iter().cloned().map(Source::Inline).collect();
        self.loader
            .load_validated(&sources)
            .expect("documents should validate")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
