//! Settings validation
//!
//! [`validate`] checks a [`RawDocument`] against a [`SchemaRegistry`] in a
//! single pass. It never stops at the first problem: every registered entry
//! and every document key is inspected, and all findings are returned
//! together.
//!
//! Unknown keys are reported as warnings and do not fail validation.

use crate::config::{SchemaRegistry, SettingEntry, SettingType, value_kind};
use crate::error::{Error, Result};
use crate::loader::RawDocument;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Violations
// =============================================================================

/// Why a document path failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationReason {
    /// A required entry with no default is absent
    MissingRequired,
    /// The value's kind does not match the declared type
    TypeMismatch,
    /// The document holds a key the registry does not declare (warning only)
    UnknownKey,
    /// An enum value is not one of the allowed values
    InvalidEnumValue,
}

impl ViolationReason {
    /// Unknown keys are tolerated; everything else fails validation
    #[must_use]
    pub fn is_warning(self) -> bool {
        self == ViolationReason::UnknownKey
    }
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ViolationReason::MissingRequired => "missing required setting",
            ViolationReason::TypeMismatch => "type mismatch",
            ViolationReason::UnknownKey => "unknown key",
            ViolationReason::InvalidEnumValue => "invalid enum value",
        })
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationViolation {
    /// Dot-separated path of the offending key
    pub path: String,
    /// Category of the problem
    pub reason: ViolationReason,
    /// Value found in the document, if there was one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_value: Option<Value>,
    /// Human readable explanation
    pub message: String,
}

impl ValidationViolation {
    fn missing(entry: &SettingEntry) -> Self {
        Self {
            path: entry.path.clone(),
            reason: ViolationReason::MissingRequired,
            observed_value: None,
            message: format!("required {} setting is not set", entry.setting_type),
        }
    }

    fn rejected(entry: &SettingEntry, reason: ViolationReason, observed: &Value) -> Self {
        let message = match reason {
            ViolationReason::InvalidEnumValue => format!(
                "{observed} is not one of: {}",
                entry.allowed_values.join(", ")
            ),
            _ => format!(
                "expected {}, got {}",
                entry.setting_type,
                value_kind(observed)
            ),
        };
        Self {
            path: entry.path.clone(),
            reason,
            observed_value: Some(observed.clone()),
            message,
        }
    }

    fn unknown(path: String, observed: &Value) -> Self {
        Self {
            path,
            reason: ViolationReason::UnknownKey,
            observed_value: Some(observed.clone()),
            message: "not a recognized setting".to_string(),
        }
    }
}

impl fmt::Display for ValidationViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path, self.reason, self.message)
    }
}

/// Every finding from one validation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Findings that reject the document
    pub violations: Vec<ValidationViolation>,
    /// Tolerated findings (unknown keys)
    pub warnings: Vec<ValidationViolation>,
}

impl ValidationReport {
    /// Whether the document was accepted
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations with the given reason
    pub fn with_reason(&self, reason: ViolationReason) -> impl Iterator<Item = &ValidationViolation> {
        self.violations
            .iter()
            .chain(&self.warnings)
            .filter(move |v| v.reason == reason)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "settings validation failed with {} violation(s)",
            self.violations.len()
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {violation}")?;
        }
        for warning in &self.warnings {
            write!(f, "\n  - warning: {warning}")?;
        }
        Ok(())
    }
}

impl From<ValidationReport> for Error {
    fn from(report: ValidationReport) -> Self {
        Error::Validation(report)
    }
}

// =============================================================================
// Validated Settings
// =============================================================================

/// Immutable, schema-checked settings.
///
/// Holds a value (supplied or default) for every leaf that has one, and only
/// values that match their declared type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedSettings {
    values: BTreeMap<String, Value>,
    warnings: Vec<ValidationViolation>,
}

impl ValidatedSettings {
    /// Value of a leaf path, if set
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.values.get(path)
    }

    /// Whether a leaf path has a value
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.values.contains_key(path)
    }

    /// All leaf values, sorted by path
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of leaf values
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no values
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Unknown-key warnings found while validating
    #[must_use]
    pub fn warnings(&self) -> &[ValidationViolation] {
        &self.warnings
    }

    /// Nested object holding every value under `prefix`
    #[must_use]
    pub fn subtree(&self, prefix: &str) -> Value {
        let mut doc = RawDocument::new();
        let scope = format!("{prefix}.");
        for (path, value) in &self.values {
            if let Some(rest) = path.strip_prefix(&scope) {
                doc.set_path(rest, value.clone());
            }
        }
        doc.into_value()
    }

    /// Reassemble the full nested document
    #[must_use]
    pub fn to_document(&self) -> Value {
        let mut doc = RawDocument::new();
        for (path, value) in &self.values {
            doc.set_path(path, value.clone());
        }
        doc.into_value()
    }

    /// Deserialize the settings into a typed view
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deserialize`] if the document does not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.to_document()).map_err(Error::from)
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Validate a raw document against a registry.
///
/// Absent entries get their default; required entries with no default are
/// reported as [`ViolationReason::MissingRequired`]. Present values are
/// checked (and, for booleans given as strings, coerced) against the declared
/// type. An explicit `null` counts as absent.
///
/// # Errors
///
/// Returns the full [`ValidationReport`] if any non-warning violation was
/// found.
pub fn validate(
    doc: &RawDocument,
    registry: &SchemaRegistry,
) -> std::result::Result<ValidatedSettings, ValidationReport> {
    let mut values = BTreeMap::new();
    let mut violations = Vec::new();
    // Objects whose document value had the wrong kind; their descendants are
    // not inspected.
    let mut broken: Vec<String> = Vec::new();

    for entry in registry.entries() {
        if broken
            .iter()
            .any(|b| entry.path.strip_prefix(b.as_str()).is_some_and(|r| r.starts_with('.')))
        {
            continue;
        }

        let present = doc.get_path(&entry.path).filter(|v| !v.is_null());

        if entry.setting_type == SettingType::Object {
            if let Some(value) = present {
                if !value.is_object() {
                    violations.push(ValidationViolation::rejected(
                        entry,
                        ViolationReason::TypeMismatch,
                        value,
                    ));
                    broken.push(entry.path.clone());
                }
            }
            continue;
        }

        match present {
            Some(value) => match entry.check(value) {
                Ok(stored) => {
                    values.insert(entry.path.clone(), stored);
                }
                Err(reason) => {
                    violations.push(ValidationViolation::rejected(entry, reason, value));
                }
            },
            None => {
                if let Some(ref default) = entry.default {
                    values.insert(entry.path.clone(), default.clone());
                } else if entry.required {
                    violations.push(ValidationViolation::missing(entry));
                }
            }
        }
    }

    let mut warnings = Vec::new();
    collect_unknown(doc.as_map(), None, registry, &mut warnings);
    for warning in &warnings {
        warn!("Ignoring unknown setting '{}'", warning.path);
    }

    if violations.is_empty() {
        Ok(ValidatedSettings { values, warnings })
    } else {
        Err(ValidationReport {
            violations,
            warnings,
        })
    }
}

fn collect_unknown(
    map: &Map<String, Value>,
    prefix: Option<&str>,
    registry: &SchemaRegistry,
    warnings: &mut Vec<ValidationViolation>,
) {
    for (key, value) in map {
        let path = prefix.map_or_else(|| key.clone(), |p| format!("{p}.{key}"));

        // A literal dot inside a key can never address a registered path.
        let entry = if key.contains('.') {
            None
        } else {
            registry.lookup(&path).ok()
        };

        match entry {
            None => warnings.push(ValidationViolation::unknown(path, value)),
            Some(entry) if entry.setting_type == SettingType::Object => {
                if let Value::Object(children) = value {
                    collect_unknown(children, Some(&path), registry, warnings);
                }
            }
            Some(_) => {}
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builder()
            .entry(SettingEntry::string("flowFile").default("flow.json"))
            .entry(SettingEntry::boolean("flowFilePretty").default(false))
            .entry(SettingEntry::string("userDir").required())
            .entry(SettingEntry::object("editorTheme"))
            .entry(SettingEntry::string("editorTheme.theme"))
            .entry(SettingEntry::object("editorTheme.projects"))
            .entry(SettingEntry::object("editorTheme.projects.workflow"))
            .entry(
                SettingEntry::enumeration("editorTheme.projects.workflow.mode", ["manual", "auto"])
                    .default("manual"),
            )
            .build()
            .unwrap()
    }

    fn doc(value: Value) -> RawDocument {
        RawDocument::from_value(value, "test").unwrap()
    }

    #[test]
    fn test_defaults_are_filled() {
        let settings = validate(&doc(json!({"userDir": "/data"})), &registry()).unwrap();

        assert_eq!(settings.get("flowFile"), Some(&json!("flow.json")));
        assert_eq!(settings.get("flowFilePretty"), Some(&json!(false)));
        assert_eq!(
            settings.get("editorTheme.projects.workflow.mode"),
            Some(&json!("manual"))
        );
        // Optional with no default stays absent
        assert!(!settings.contains("editorTheme.theme"));
        assert!(settings.warnings().is_empty());
    }

    #[test]
    fn test_missing_required() {
        let report = validate(&doc(json!({})), &registry()).unwrap_err();

        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].path, "userDir");
        assert_eq!(report.violations[0].reason, ViolationReason::MissingRequired);
    }

    #[test]
    fn test_null_counts_as_absent() {
        let settings =
            validate(&doc(json!({"userDir": "/d", "flowFile": null})), &registry()).unwrap();
        assert_eq!(settings.get("flowFile"), Some(&json!("flow.json")));

        let report = validate(&doc(json!({"userDir": null})), &registry()).unwrap_err();
        assert_eq!(report.violations[0].reason, ViolationReason::MissingRequired);
    }

    #[test]
    fn test_all_violations_reported_in_one_pass() {
        let report = validate(
            &doc(json!({
                "flowFile": 7,
                "flowFilePretty": "sometimes",
                "editorTheme": {"projects": {"workflow": {"mode": "AUTO"}}},
                "foo": 1
            })),
            &registry(),
        )
        .unwrap_err();

        let reasons: Vec<_> = report
            .violations
            .iter()
            .map(|v| (v.path.as_str(), v.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (
                    "editorTheme.projects.workflow.mode",
                    ViolationReason::InvalidEnumValue
                ),
                ("flowFile", ViolationReason::TypeMismatch),
                ("flowFilePretty", ViolationReason::TypeMismatch),
                ("userDir", ViolationReason::MissingRequired),
            ]
        );
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(
            report.violations[0].observed_value,
            Some(json!("AUTO"))
        );
    }

    #[test]
    fn test_unknown_keys_are_warnings() {
        let settings = validate(
            &doc(json!({
                "userDir": "/data",
                "foo": 1,
                "editorTheme": {"page": {"title": "x"}, "theme": "dark"}
            })),
            &registry(),
        )
        .unwrap();

        let paths: Vec<_> = settings.warnings().iter().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, vec!["editorTheme.page", "foo"]);
        assert!(settings.warnings().iter().all(|w| w.reason.is_warning()));
    }

    #[test]
    fn test_dotted_key_is_unknown() {
        let settings = validate(
            &doc(json!({"userDir": "/data", "editorTheme.theme": "dark"})),
            &registry(),
        )
        .unwrap();

        assert!(!settings.contains("editorTheme.theme"));
        assert_eq!(settings.warnings()[0].path, "editorTheme.theme");
    }

    #[test]
    fn test_object_type_mismatch_skips_descendants() {
        let report = validate(
            &doc(json!({"userDir": "/data", "editorTheme": "dark"})),
            &registry(),
        )
        .unwrap_err();

        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].path, "editorTheme");
        assert_eq!(report.violations[0].reason, ViolationReason::TypeMismatch);
    }

    #[test]
    fn test_boolean_strings_are_coerced() {
        let settings = validate(
            &doc(json!({"userDir": "/data", "flowFilePretty": "True"})),
            &registry(),
        )
        .unwrap();
        assert_eq!(settings.get("flowFilePretty"), Some(&json!(true)));
    }

    #[test]
    fn test_idempotent() {
        let input = doc(json!({"userDir": "/data", "foo": true}));
        let first = validate(&input, &registry()).unwrap();
        let second = validate(&input, &registry()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_to_document_and_subtree() {
        let settings = validate(
            &doc(json!({"userDir": "/data", "editorTheme": {"theme": "midnight-red"}})),
            &registry(),
        )
        .unwrap();

        let document = settings.to_document();
        assert_eq!(document["editorTheme"]["theme"], json!("midnight-red"));
        assert_eq!(
            document["editorTheme"]["projects"]["workflow"]["mode"],
            json!("manual")
        );

        assert_eq!(
            settings.subtree("editorTheme.projects"),
            json!({"workflow": {"mode": "manual"}})
        );
    }

    #[test]
    fn test_report_display_lists_everything() {
        let report = validate(
            &doc(json!({"flowFile": false, "foo": 1})),
            &registry(),
        )
        .unwrap_err();

        let text = report.to_string();
        assert!(text.starts_with("settings validation failed with 2 violation(s)"));
        assert!(text.contains("flowFile: type mismatch (expected string, got boolean)"));
        assert!(text.contains("userDir: missing required setting"));
        assert!(text.contains("warning: foo: unknown key"));
    }
}
