//! Documentation generator for settings schemas
//!
//! Generates markdown documentation from a [`SchemaRegistry`].

use crate::config::{SchemaRegistry, SettingEntry, SettingType};

/// Configuration for docs generation
#[derive(Debug, Clone, Default)]
pub struct DocsConfig {
    /// Title for the documentation
    pub title: Option<String>,
    /// Description/introduction text
    pub description: Option<String>,
    /// Whether to list object entries that only group other settings
    pub show_objects: bool,
}

impl DocsConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            show_objects: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    #[must_use]
    pub fn hide_objects(mut self) -> Self {
        self.show_objects = false;
        self
    }
}

/// Generate markdown documentation for every entry in `registry`
#[must_use]
pub fn generate_docs(registry: &SchemaRegistry, config: DocsConfig) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    let title = config
        .title
        .unwrap_or_else(|| "Settings Reference".to_string());
    let _ = writeln!(output, "# {title}\n");

    if let Some(desc) = config.description {
        let _ = writeln!(output, "{desc}\n");
    }

    // Group by top-level segment; registry order keeps parents first.
    let mut current_section: Option<&str> = None;
    for entry in registry.entries() {
        if !config.show_objects && entry.setting_type == SettingType::Object {
            continue;
        }

        let section = entry.segments().next().unwrap_or_default();
        let nested = entry.parent().is_some() || entry.setting_type == SettingType::Object;
        let heading = if nested { section } else { "General" };
        if current_section != Some(heading) {
            let _ = writeln!(output, "\n## {heading}\n");
            current_section = Some(heading);
        }

        format_entry(&mut output, entry);
    }

    output
}

fn format_entry(out: &mut String, entry: &SettingEntry) {
    use std::fmt::Write;

    let _ = writeln!(out, "### `{}`\n", entry.path);

    if entry.required {
        out.push_str("Required\n\n");
    }

    if let Some(ref desc) = entry.description {
        let _ = writeln!(out, "{desc}\n");
    }

    out.push_str("| Property | Value |\n");
    out.push_str("|----------|-------|\n");
    let _ = writeln!(out, "| **Type** | {} |", format_type(entry.setting_type));
    match entry.default {
        Some(ref default) => {
            let _ = writeln!(out, "| **Default** | `{default}` |");
        }
        None if entry.is_leaf() => out.push_str("| **Default** | *(none)* |\n"),
        None => {}
    }
    out.push('\n');

    if !entry.allowed_values.is_empty() {
        out.push_str("**Allowed values:**\n\n");
        for value in &entry.allowed_values {
            let _ = writeln!(out, "- `\"{value}\"`");
        }
        out.push('\n');
    }

    out.push_str("---\n\n");
}

fn format_type(t: SettingType) -> &'static str {
    match t {
        SettingType::String => "String",
        SettingType::Boolean => "Boolean",
        SettingType::Enum => "Enum",
        SettingType::Object => "Object",
    }
}

// =============================================================================
// Tests
// =============================================================================
