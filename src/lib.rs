//! # flowconf - settings resolution for flow runtimes
//!
//! Loads, validates and serves the settings document a flow-based runtime
//! reads at startup: where flows persist, how the editor is themed, whether
//! multi-user editing is on, and whether function nodes may import external
//! modules.
//!
//! ## Pipeline
//!
//! ```text
//! sources ─▶ SettingsLoader ─▶ RawDocument ─▶ validate (SchemaRegistry) ─▶ SettingsStore
//! ```
//!
//! - **SchemaRegistry**: recognized keys, their types, defaults and required flags
//! - **SettingsLoader**: reads files (JSON, optional TOML/YAML), inline values and
//!   environment overlays, merging layers leaf by leaf
//! - **validate**: checks the merged document in one pass and reports every violation
//! - **SettingsStore**: holds the validated snapshot; reloads swap it atomically
//!
//! ## Quick Start
//!
//! ```rust
//! use flowconf::{FlowSettings, LoaderConfig, SettingsLoader, SettingsStore, Source, flow_registry};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(flow_registry());
//! let loader = SettingsLoader::new(registry.clone(), LoaderConfig::default());
//!
//! let settings = loader.load_validated(&[Source::Inline(json!({
//!     "flowFile": "flows.json",
//!     "flowFilePretty": true,
//!     "userDir": "/data",
//!     "editorTheme": {
//!         "projects": {"enabled": true, "workflow": {"mode": "auto"}},
//!         "multiplayer": {"enabled": true}
//!     },
//!     "functionExternalModules": true
//! }))])?;
//!
//! let store = SettingsStore::new(registry);
//! store.initialize(settings)?;
//!
//! assert_eq!(
//!     store.get_str("editorTheme.projects.workflow.mode")?.as_deref(),
//!     Some("auto")
//! );
//!
//! let flow: FlowSettings = store.settings()?;
//! assert!(flow.collaboration_enabled());
//! # Ok::<(), flowconf::Error>(())
//! ```
//!
//! ## Startup Errors
//!
//! Validation reports every problem at once. At startup, print the whole
//! report and stop:
//!
//! ```rust
//! use flowconf::{LoaderConfig, SettingsLoader, Source, flow_registry};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let loader = SettingsLoader::new(Arc::new(flow_registry()), LoaderConfig::default());
//! let err = loader
//!     .load_validated(&[Source::Inline(json!({"flowFilePretty": "maybe"}))])
//!     .unwrap_err();
//!
//! let report = err.report().unwrap();
//! assert_eq!(report.violations.len(), 2); // flowFilePretty and userDir
//! ```

// Core modules
mod docs;
mod error;
mod events;
mod store;
mod sync;
mod validator;

// Grouped modules
pub mod config;
pub mod flow;
pub mod loader;

// Re-exports from core
pub use docs::{DocsConfig, generate_docs};
pub use error::{Error, Result};
pub use events::{ChangeCallback, EventManager};
pub use store::SettingsStore;
pub use validator::{
    ValidatedSettings, ValidationReport, ValidationViolation, ViolationReason, validate,
};

// Re-exports from config
pub use config::{
    DefaultEnvSource, EnvSource, LoaderConfig, LoaderConfigBuilder, SchemaRegistry,
    SchemaRegistryBuilder, SettingEntry, SettingType,
};

// Re-exports from loader
pub use loader::{Format, RawDocument, SettingsLoader, Source};

// Flow runtime schema
pub use flow::{EditorTheme, FlowSettings, WorkflowMode, flow_registry};
