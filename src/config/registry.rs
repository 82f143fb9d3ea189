//! Schema registry
//!
//! Holds every [`SettingEntry`] a runtime recognizes. Entries are keyed by
//! path and kept sorted, so parents always come before their children when
//! iterating.

use super::schema::{SettingEntry, SettingType};
use crate::error::{Error, Result};
use log::debug;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("segment pattern is a valid regex")
    })
}

/// Registry of recognized settings keys
///
/// # Example
///
/// ```
/// use flowconf::{SchemaRegistry, SettingEntry};
///
/// let registry = SchemaRegistry::builder()
///     .entry(SettingEntry::string("userDir").required())
///     .entry(SettingEntry::object("editorTheme"))
///     .entry(SettingEntry::string("editorTheme.theme"))
///     .build()?;
///
/// assert!(registry.lookup("editorTheme.theme").is_ok());
/// assert!(registry.lookup("editorTheme.page").is_err());
/// # Ok::<(), flowconf::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaRegistry {
    entries: BTreeMap<String, SettingEntry>,
}

impl SchemaRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a builder that registers entries in order
    #[must_use]
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    /// Register a new entry.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateKey`] if the path is already registered
    /// - [`Error::InvalidSchema`] if a path segment is malformed, an ancestor
    ///   is not a registered object, or the entry definition is inconsistent
    pub fn register(&mut self, entry: SettingEntry) -> Result<()> {
        if entry.path.is_empty() {
            return Err(Error::invalid_schema("", "Path cannot be empty"));
        }

        if let Some(bad) = entry.segments().find(|s| !segment_pattern().is_match(s)) {
            return Err(Error::invalid_schema(
                &entry.path,
                format!("Invalid path segment '{bad}'"),
            ));
        }

        if self.entries.contains_key(&entry.path) {
            return Err(Error::DuplicateKey(entry.path));
        }

        let mut ancestor = entry.parent();
        while let Some(path) = ancestor {
            match self.entries.get(path) {
                Some(parent) if parent.setting_type == SettingType::Object => {}
                Some(parent) => {
                    return Err(Error::invalid_schema(
                        &entry.path,
                        format!("Ancestor '{path}' is a {}, not an object", parent.setting_type),
                    ));
                }
                None => {
                    return Err(Error::invalid_schema(
                        &entry.path,
                        format!("Ancestor '{path}' is not registered"),
                    ));
                }
            }
            ancestor = path.rsplit_once('.').map(|(p, _)| p);
        }

        entry
            .validate_schema()
            .map_err(|reason| Error::invalid_schema(&entry.path, reason))?;

        debug!("Registered setting {} ({})", entry.path, entry.setting_type);
        self.entries.insert(entry.path.clone(), entry);
        Ok(())
    }

    /// Look up an entry by path
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownKey`] if the path was never registered.
    pub fn lookup(&self, path: &str) -> Result<&SettingEntry> {
        self.entries
            .get(path)
            .ok_or_else(|| Error::UnknownKey(path.to_string()))
    }

    /// Whether a path is registered
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// All entries, sorted by path
    pub fn entries(&self) -> impl Iterator<Item = &SettingEntry> {
        self.entries.values()
    }

    /// Entries that hold values (everything except objects)
    pub fn leaves(&self) -> impl Iterator<Item = &SettingEntry> {
        self.entries.values().filter(|e| e.is_leaf())
    }

    /// Direct children of `parent`; pass `None` for top-level entries
    pub fn children<'a>(&'a self, parent: Option<&'a str>) -> impl Iterator<Item = &'a SettingEntry> {
        self.entries.values().filter(move |e| e.parent() == parent)
    }

    /// Number of registered entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder collecting entries for a [`SchemaRegistry`]
///
/// Registration errors are deferred to [`build`](Self::build), which reports
/// the first failure.
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    entries: Vec<SettingEntry>,
}

impl SchemaRegistryBuilder {
    /// Queue an entry for registration
    #[must_use]
    pub fn entry(mut self, entry: SettingEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Register all queued entries, in order
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`SchemaRegistry::register`].
    pub fn build(self) -> Result<SchemaRegistry> {
        let mut registry = SchemaRegistry::new();
        for entry in self.entries {
            registry.register(entry)?;
        }
        Ok(registry)
    }
}

// =============================================================================
// Tests
// =============================================================================
