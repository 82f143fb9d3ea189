//! Setting entry definitions
//!
//! A [`SettingEntry`] declares one recognized key of a settings document:
//! its dot-separated path, its type, an optional default, whether it must be
//! present, and (for enums) the exact set of accepted strings.
//!
//! ```
//! use flowconf::SettingEntry;
//!
//! let mode = SettingEntry::enumeration("editorTheme.projects.workflow.mode", ["manual", "auto"])
//!     .default("manual")
//!     .description("How project changes are committed");
//!
//! assert!(mode.validate_schema().is_ok());
//! assert!(mode.check(&serde_json::json!("auto")).is_ok());
//! assert!(mode.check(&serde_json::json!("Auto")).is_err());
//! ```

use crate::validator::ViolationReason;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Setting Types
// =============================================================================

/// Declared type of a setting
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    /// UTF-8 string leaf
    #[default]
    String,
    /// Boolean leaf
    Boolean,
    /// String leaf restricted to `allowed_values`
    Enum,
    /// Structural node holding nested entries
    Object,
}

impl SettingType {
    /// Human readable type name used in reports
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SettingType::String => "string",
            SettingType::Boolean => "boolean",
            SettingType::Enum => "enum",
            SettingType::Object => "object",
        }
    }
}

impl std::fmt::Display for SettingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Name of the JSON kind of `value`, for mismatch messages
#[must_use]
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Setting Entry
// =============================================================================

/// Declaration of a single recognized settings key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingEntry {
    /// Dot-separated path (e.g. `editorTheme.multiplayer.enabled`)
    pub path: String,

    /// Declared type
    #[serde(rename = "type")]
    pub setting_type: SettingType,

    /// Value filled in when the document omits the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Whether the key must end up with a value
    #[serde(default)]
    pub required: bool,

    /// Accepted values for `Enum` entries (exact, case-sensitive)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,

    /// Free-form description, used by the docs generator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SettingEntry {
    fn with_type(path: impl Into<String>, setting_type: SettingType) -> Self {
        Self {
            path: path.into(),
            setting_type,
            default: None,
            required: false,
            allowed_values: Vec::new(),
            description: None,
        }
    }

    // =========================================================================
    // Type-specific constructors
    // =========================================================================

    /// Create a string setting
    pub fn string(path: impl Into<String>) -> Self {
        Self::with_type(path, SettingType::String)
    }

    /// Create a boolean setting
    pub fn boolean(path: impl Into<String>) -> Self {
        Self::with_type(path, SettingType::Boolean)
    }

    /// Create an enum setting
    ///
    /// **Allowed values are required** - you must provide them at construction time.
    pub fn enumeration<I, V>(path: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            allowed_values: allowed.into_iter().map(Into::into).collect(),
            ..Self::with_type(path, SettingType::Enum)
        }
    }

    /// Create a nested-object node
    pub fn object(path: impl Into<String>) -> Self {
        Self::with_type(path, SettingType::Object)
    }

    // =========================================================================
    // Builder setters
    // =========================================================================

    /// Set the default value
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Mark the setting as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a description
    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    // =========================================================================
    // Path helpers
    // =========================================================================

    /// Path segments, in order
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('.')
    }

    /// Path of the enclosing object, if nested
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.path.rsplit_once('.').map(|(parent, _)| parent)
    }

    /// Last path segment
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.rsplit_once('.').map_or(&self.path, |(_, name)| name)
    }

    /// Whether this entry holds a value (as opposed to nesting other entries)
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.setting_type != SettingType::Object
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check a present value against the declared type.
    ///
    /// Returns the value as it should be stored. Boolean entries accept the
    /// strings `"true"` / `"false"` (any case), which is how values arrive from
    /// environment overlays.
    pub fn check(&self, value: &Value) -> Result<Value, ViolationReason> {
        match (self.setting_type, value) {
            (SettingType::String, Value::String(_)) => Ok(value.clone()),
            (SettingType::Boolean, Value::Bool(_)) => Ok(value.clone()),
            (SettingType::Boolean, Value::String(s)) if s.eq_ignore_ascii_case("true") => {
                Ok(Value::Bool(true))
            }
            (SettingType::Boolean, Value::String(s)) if s.eq_ignore_ascii_case("false") => {
                Ok(Value::Bool(false))
            }
            (SettingType::Enum, Value::String(s)) => {
                if self.allowed_values.iter().any(|allowed| allowed == s) {
                    Ok(value.clone())
                } else {
                    Err(ViolationReason::InvalidEnumValue)
                }
            }
            (SettingType::Object, Value::Object(_)) => Ok(value.clone()),
            _ => Err(ViolationReason::TypeMismatch),
        }
    }

    /// Validate the entry definition itself
    ///
    /// Checks that:
    /// - Enum entries declare at least one allowed value, without duplicates
    /// - Object entries carry neither a default nor a `required` flag
    /// - The default, if any, satisfies the declared type
    pub fn validate_schema(&self) -> Result<(), String> {
        match self.setting_type {
            SettingType::Enum => {
                if self.allowed_values.is_empty() {
                    return Err("Enum type must have allowed values defined".to_string());
                }
                let mut seen = std::collections::HashSet::new();
                if let Some(dup) = self.allowed_values.iter().find(|v| !seen.insert(*v)) {
                    return Err(format!("Allowed value '{dup}' is listed twice"));
                }
            }
            SettingType::Object => {
                if self.default.is_some() {
                    return Err("Object entries cannot declare a default".to_string());
                }
                if self.required {
                    return Err("Object entries cannot be required".to_string());
                }
            }
            SettingType::String | SettingType::Boolean => {}
        }

        if let Some(ref default) = self.default {
            // Defaults must already be in stored form, no coercion.
            match self.check(default) {
                Ok(stored) if stored == *default => {}
                _ => {
                    return Err(format!(
                        "Default value {default} is not a valid {}",
                        self.setting_type
                    ));
                }
            }
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
