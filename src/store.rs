//! Process-wide settings store
//!
//! [`SettingsStore`] holds the current [`ValidatedSettings`] snapshot behind
//! an `Arc`. Reloads replace the whole snapshot under a write lock; readers
//! that already hold an `Arc` keep seeing the snapshot they obtained.
//!
//! The store is an ordinary value: construct one per process and hand it
//! (usually as `Arc<SettingsStore>`) to the collaborators that need it.
//!
//! ```rust
//! use flowconf::{LoaderConfig, SettingsLoader, SettingsStore, Source, flow_registry};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(flow_registry());
//! let loader = SettingsLoader::new(registry.clone(), LoaderConfig::default());
//! let store = SettingsStore::new(registry);
//!
//! store.initialize(loader.load_validated(&[Source::Inline(json!({"userDir": "/data"}))])?)?;
//! assert_eq!(store.get_str("flowFile")?.as_deref(), Some("flow.json"));
//!
//! let before = store.snapshot()?;
//! store.reload(loader.load_validated(&[Source::Inline(json!({
//!     "userDir": "/data",
//!     "flowFile": "flows.json"
//! }))])?)?;
//!
//! assert_eq!(before.get("flowFile"), Some(&json!("flow.json")));
//! assert_eq!(store.get_str("flowFile")?.as_deref(), Some("flows.json"));
//! # Ok::<(), flowconf::Error>(())
//! ```

use crate::config::{SchemaRegistry, SettingType, value_kind};
use crate::error::{Error, Result};
use crate::events::EventManager;
use crate::loader::{SettingsLoader, Source};
use crate::sync::{MutexExt, RwLockExt};
use crate::validator::ValidatedSettings;
use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Read-mostly holder of the validated settings snapshot
pub struct SettingsStore {
    /// Registry the snapshots were validated against
    registry: Arc<SchemaRegistry>,

    /// Current snapshot; `None` until initialized
    current: RwLock<Option<Arc<ValidatedSettings>>>,

    /// Incremented on every successful initialize / reload
    generation: AtomicU64,

    /// Serializes snapshot installs with their change notifications
    reload_lock: Mutex<()>,

    /// Listeners notified of per-path changes after a reload
    events: EventManager,
}

impl SettingsStore {
    /// Create an uninitialized store
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
            reload_lock: Mutex::new(()),
            events: EventManager::new(),
        }
    }

    /// Registry backing this store
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Change listeners fired by [`reload`](Self::reload)
    pub fn events(&self) -> &EventManager {
        &self.events
    }

    /// Whether a snapshot has been installed
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.current.read_recovered().is_some()
    }

    /// Number of snapshots installed so far
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Install the first snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyInitialized`] if a snapshot is already held;
    /// use [`reload`](Self::reload) to replace it.
    pub fn initialize(&self, settings: ValidatedSettings) -> Result<()> {
        let _installing = self.reload_lock.lock_recovered();
        let mut guard = self.current.write_recovered();
        if guard.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        *guard = Some(Arc::new(settings));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        drop(guard);

        info!("Settings store initialized (generation {generation})");
        Ok(())
    }

    /// Atomically replace the snapshot.
    ///
    /// Readers holding the previous snapshot are unaffected. After the swap,
    /// listeners are notified for every leaf path whose value changed. On an
    /// uninitialized store this installs the first snapshot.
    ///
    /// Concurrent reloads are applied one at a time: a reload's listeners
    /// all run before the next swap, so the last value a listener sees is
    /// the value the store holds. Readers are never blocked by listeners.
    /// Listeners must not call `reload` or `initialize` on the same store.
    pub fn reload(&self, settings: ValidatedSettings) -> Result<()> {
        let _installing = self.reload_lock.lock_recovered();

        let next = Arc::new(settings);
        let (previous, generation) = {
            let mut guard = self.current.write_recovered();
            let previous = guard.replace(next.clone());
            (previous, self.generation.fetch_add(1, Ordering::AcqRel) + 1)
        };
        info!("Settings reloaded (generation {generation})");

        if let Some(previous) = previous {
            self.notify_changes(&previous, &next);
        }
        Ok(())
    }

    /// Load, validate and install a new snapshot in one step.
    ///
    /// # Errors
    ///
    /// Any load or validation error; the previous snapshot stays active.
    pub fn reload_from(&self, loader: &SettingsLoader, sources: &[Source]) -> Result<()> {
        match loader.load_validated(sources) {
            Ok(settings) => self.reload(settings),
            Err(e) => {
                error!("Settings reload rejected, keeping previous snapshot: {e}");
                Err(e)
            }
        }
    }

    /// Current snapshot
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before the first snapshot.
    pub fn snapshot(&self) -> Result<Arc<ValidatedSettings>> {
        self.current
            .read_recovered()
            .clone()
            .ok_or(Error::NotInitialized)
    }

    /// Value at a registered path.
    ///
    /// Leaves return their value (`None` for optional settings left unset).
    /// Object paths return the nested object of everything beneath them.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownKey`] if the path was never registered
    /// - [`Error::NotInitialized`] before the first snapshot
    pub fn get(&self, path: &str) -> Result<Option<Value>> {
        let entry = self.registry.lookup(path)?;
        let snapshot = self.snapshot()?;
        if entry.setting_type == SettingType::Object {
            return Ok(Some(snapshot.subtree(path)));
        }
        Ok(snapshot.get(path).cloned())
    }

    /// String (or enum) value at a registered path
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get), plus [`Error::TypeMismatch`] if the entry is
    /// not a string or enum.
    pub fn get_str(&self, path: &str) -> Result<Option<String>> {
        self.expect_type(path, &[SettingType::String, SettingType::Enum])?;
        Ok(self
            .get(path)?
            .and_then(|v| v.as_str().map(str::to_string)))
    }

    /// Boolean value at a registered path
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get), plus [`Error::TypeMismatch`] if the entry is
    /// not a boolean.
    pub fn get_bool(&self, path: &str) -> Result<Option<bool>> {
        self.expect_type(path, &[SettingType::Boolean])?;
        Ok(self.get(path)?.and_then(|v| v.as_bool()))
    }

    /// Deserialize the current snapshot into a typed view
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] or [`Error::Deserialize`].
    pub fn settings<T: DeserializeOwned>(&self) -> Result<T> {
        self.snapshot()?.deserialize()
    }

    fn expect_type(&self, path: &str, accepted: &[SettingType]) -> Result<()> {
        let entry = self.registry.lookup(path)?;
        if accepted.contains(&entry.setting_type) {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                path: path.to_string(),
                expected: accepted
                    .iter()
                    .map(|t| t.name())
                    .collect::<Vec<_>>()
                    .join(" or "),
                actual: entry.setting_type.name().to_string(),
            })
        }
    }

    fn notify_changes(&self, previous: &ValidatedSettings, next: &ValidatedSettings) {
        let paths: BTreeSet<&str> = previous
            .iter()
            .chain(next.iter())
            .map(|(path, _)| path)
            .collect();

        for path in paths {
            let old = previous.get(path).unwrap_or(&Value::Null);
            let new = next.get(path).unwrap_or(&Value::Null);
            if old != new {
                debug!(
                    "Setting {path} changed ({} -> {})",
                    value_kind(old),
                    value_kind(new)
                );
                self.events.notify(path, old, new);
            }
        }
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("entries", &self.registry.len())
            .field("initialized", &self.is_initialized())
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
