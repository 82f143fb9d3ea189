//! Change notifications for settings reloads
//!
//! Collaborators that cache derived state (a theme service, a collaboration
//! gate) register listeners here and are told which paths changed after a
//! snapshot swap.

use crate::sync::RwLockExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Type alias for a change callback
pub type ChangeCallback = Arc<dyn Fn(&str, &Value, &Value) + Send + Sync>;

/// Manages event listeners for settings changes
pub struct EventManager {
    /// Global listeners (called for all changes)
    global_listeners: RwLock<Vec<ChangeCallback>>,

    /// Per-path listeners (called only for specific setting changes)
    key_listeners: RwLock<HashMap<String, Vec<ChangeCallback>>>,
}

impl EventManager {
    /// Create a new event manager
    #[must_use]
    pub fn new() -> Self {
        Self {
            global_listeners: RwLock::new(Vec::new()),
            key_listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Register a global change listener (called for all settings changes)
    ///
    /// # Arguments
    /// * `callback` - Function receiving (`path`, `old_value`, `new_value`)
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&str, &Value, &Value) + Send + Sync + 'static,
    {
        self.global_listeners
            .write_recovered()
            .push(Arc::new(callback));
    }

    /// Register a listener for a specific setting path
    ///
    /// # Arguments
    /// * `path` - The setting path (e.g., "`editorTheme.multiplayer.enabled`")
    /// * `callback` - Function receiving (`path`, `old_value`, `new_value`)
    pub fn watch<F>(&self, path: &str, callback: F)
    where
        F: Fn(&str, &Value, &Value) + Send + Sync + 'static,
    {
        self.key_listeners
            .write_recovered()
            .entry(path.to_string())
            .or_default()
            .push(Arc::new(callback));
    }

    /// Notify all listeners about a change
    ///
    /// Absent values are passed as `Value::Null`. Listeners are cloned out
    /// of the lock before being called, so a callback may register others.
    pub fn notify(&self, path: &str, old_value: &Value, new_value: &Value) {
        let mut callbacks: Vec<ChangeCallback> = self.global_listeners.read_recovered().clone();
        if let Some(listeners) = self.key_listeners.read_recovered().get(path) {
            callbacks.extend(listeners.iter().cloned());
        }

        for callback in callbacks {
            callback(path, old_value, new_value);
        }
    }

    /// Remove all listeners for a specific path
    pub fn unwatch(&self, path: &str) {
        self.key_listeners.write_recovered().remove(path);
    }

    /// Clear all listeners
    pub fn clear(&self) {
        self.global_listeners.write_recovered().clear();
        self.key_listeners.write_recovered().clear();
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
