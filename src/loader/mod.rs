//! Settings loader
//!
//! Reads raw documents from files, inline values, text, or the environment,
//! and merges layered sources leaf by leaf.
//!
//! ```rust
//! use flowconf::{LoaderConfig, SettingsLoader, Source, flow_registry};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let loader = SettingsLoader::new(Arc::new(flow_registry()), LoaderConfig::default());
//! let doc = loader.load_layered(&[
//!     Source::Inline(json!({"editorTheme": {"projects": {"enabled": true}}})),
//!     Source::Inline(json!({"editorTheme": {"theme": "midnight-red"}})),
//! ])?;
//!
//! assert_eq!(doc.get_path("editorTheme.projects.enabled"), Some(&json!(true)));
//! assert_eq!(doc.get_path("editorTheme.theme"), Some(&json!("midnight-red")));
//! # Ok::<(), flowconf::Error>(())
//! ```

mod env;
mod format;

pub use env::EnvironmentHandler;
pub use format::Format;

use crate::config::{LoaderConfig, SchemaRegistry};
use crate::error::{Error, Result, read_file};
use crate::validator::{ValidatedSettings, validate};
use log::{debug, info};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

// =============================================================================
// Sources
// =============================================================================

/// A backing source for a settings document
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// File on disk; format picked from the extension
    File(PathBuf),
    /// Already-structured value (must be an object)
    Inline(Value),
    /// In-memory text in a given format
    Str { content: String, format: Format },
    /// Environment variables named after registered settings
    Env,
}

impl Source {
    /// Shorthand for [`Source::File`]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Source::File(path.into())
    }

    /// Shorthand for JSON text
    pub fn json(content: impl Into<String>) -> Self {
        Source::Str {
            content: content.into(),
            format: Format::Json,
        }
    }

    fn describe(&self) -> String {
        match self {
            Source::File(path) => path.display().to_string(),
            Source::Inline(_) => "inline document".to_string(),
            Source::Str { format, .. } => format!("inline {} text", format.extension()),
            Source::Env => "environment".to_string(),
        }
    }
}

// =============================================================================
// Raw Document
// =============================================================================

/// Untyped settings document, as read from one or more sources.
///
/// May contain keys the schema does not know about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDocument {
    root: Map<String, Value>,
}

impl RawDocument {
    /// Create an empty document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a value tree. The root must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedDocument`] if `value` is not an object.
    pub fn from_value(value: Value, origin: &str) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(Error::malformed(
                origin,
                format!(
                    "document root must be an object, got {}",
                    crate::config::value_kind(&other)
                ),
            )),
        }
    }

    /// Look up a dot-separated path
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Set a value at a dot-separated path, creating (or replacing non-object)
    /// intermediate nodes.
    pub fn set_path(&mut self, path: &str, value: Value) {
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut current = &mut self.root;
        for segment in segments {
            let slot = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Value::Object(next) = slot else {
                unreachable!("slot was just made an object");
            };
            current = next;
        }
        current.insert(last.to_string(), value);
    }

    /// Merge `overlay` on top of this document.
    ///
    /// Objects merge field by field; anything else in the overlay replaces
    /// the value underneath.
    pub fn merge(&mut self, overlay: RawDocument) {
        merge_maps(&mut self.root, overlay.root);
    }

    /// Top-level map
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Whether the document has no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Convert into a JSON object value
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }
}

fn merge_maps(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match value {
            Value::Object(incoming) => {
                if let Some(Value::Object(existing)) = base.get_mut(&key) {
                    merge_maps(existing, incoming);
                } else {
                    base.insert(key, Value::Object(incoming));
                }
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}

// =============================================================================
// Loader
// =============================================================================

/// Reads and merges raw settings documents
pub struct SettingsLoader {
    registry: Arc<SchemaRegistry>,
    config: LoaderConfig,
    env_handler: EnvironmentHandler,
}

impl SettingsLoader {
    /// Create a loader for documents described by `registry`
    pub fn new(registry: Arc<SchemaRegistry>, config: LoaderConfig) -> Self {
        let env_handler =
            EnvironmentHandler::new(config.env_prefix.clone(), config.env_source.clone());
        Self {
            registry,
            config,
            env_handler,
        }
    }

    /// Registry this loader consults for environment overlays
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Loader configuration
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Read a single source
    ///
    /// # Errors
    ///
    /// - [`Error::SourceUnreadable`] if a file cannot be read
    /// - [`Error::MalformedDocument`] if the content is not a structured object
    pub fn load(&self, source: &Source) -> Result<RawDocument> {
        let origin = source.describe();
        let doc = match source {
            Source::File(path) => {
                let path = self.config.resolve(path);
                let content = read_file(&path)?;
                let origin = path.display().to_string();
                let value = Format::from_path(&path).parse(&content, &origin)?;
                RawDocument::from_value(value, &origin)?
            }
            Source::Inline(value) => RawDocument::from_value(value.clone(), &origin)?,
            Source::Str { content, format } => {
                RawDocument::from_value(format.parse(content, &origin)?, &origin)?
            }
            Source::Env => self.env_handler.overlay(&self.registry),
        };
        debug!("Loaded settings source: {origin}");
        Ok(doc)
    }

    /// Read several sources and merge them in order; later sources win.
    ///
    /// # Errors
    ///
    /// Returns the first load error; nothing is merged in that case.
    pub fn load_layered(&self, sources: &[Source]) -> Result<RawDocument> {
        let mut merged = RawDocument::new();
        for source in sources {
            merged.merge(self.load(source)?);
        }
        info!("Loaded settings from {} source(s)", sources.len());
        Ok(merged)
    }

    /// Load layered sources and validate the merged document against this
    /// loader's registry.
    ///
    /// # Errors
    ///
    /// Load errors as in [`load_layered`](Self::load_layered), or
    /// [`Error::Validation`] carrying every violation found.
    pub fn load_validated(&self, sources: &[Source]) -> Result<ValidatedSettings> {
        let doc = self.load_layered(sources)?;
        let settings = validate(&doc, &self.registry)?;
        info!(
            "Validated {} setting(s) with {} warning(s)",
            settings.len(),
            settings.warnings().len()
        );
        Ok(settings)
    }
}

// =============================================================================
// Tests
// =============================================================================
