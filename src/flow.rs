//! Flow runtime settings
//!
//! The schema a flow-based runtime recognizes, plus typed views for the
//! collaborators that consume it:
//!
//! | Collaborator      | Reads                                        |
//! |-------------------|----------------------------------------------|
//! | flow persistence  | `flowFile`, `flowFilePretty`, `userDir`      |
//! | editor theming    | `editorTheme.*`                              |
//! | collaboration     | `editorTheme.multiplayer.enabled`            |
//! | module sandbox    | `functionExternalModules`                    |

use crate::config::{SchemaRegistry, SchemaRegistryBuilder, SettingEntry, expand_home};
use crate::error::Result;
use crate::validator::ValidatedSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Setting paths, for use with [`SettingsStore::get`](crate::SettingsStore::get)
pub mod keys {
    pub const FLOW_FILE: &str = "flowFile";
    pub const FLOW_FILE_PRETTY: &str = "flowFilePretty";
    pub const USER_DIR: &str = "userDir";
    pub const EDITOR_THEME: &str = "editorTheme";
    pub const THEME: &str = "editorTheme.theme";
    pub const PROJECTS: &str = "editorTheme.projects";
    pub const PROJECTS_ENABLED: &str = "editorTheme.projects.enabled";
    pub const PROJECTS_WORKFLOW: &str = "editorTheme.projects.workflow";
    pub const WORKFLOW_MODE: &str = "editorTheme.projects.workflow.mode";
    pub const MULTIPLAYER: &str = "editorTheme.multiplayer";
    pub const MULTIPLAYER_ENABLED: &str = "editorTheme.multiplayer.enabled";
    pub const FUNCTION_EXTERNAL_MODULES: &str = "functionExternalModules";
}

/// Build the registry of settings recognized by the flow runtime
#[must_use]
pub fn flow_registry() -> SchemaRegistry {
    // Entries are ordered parents-first.
    flow_entries()
        .into_iter()
        .fold(SchemaRegistry::builder(), SchemaRegistryBuilder::entry)
        .build()
        .expect("built-in flow schema is valid")
}

fn flow_entries() -> Vec<SettingEntry> {
    vec![
        SettingEntry::string(keys::FLOW_FILE)
            .default("flow.json")
            .description("File the flow definitions are persisted to, relative to userDir"),
        SettingEntry::boolean(keys::FLOW_FILE_PRETTY)
            .default(false)
            .description("Pretty-print the flow file"),
        SettingEntry::string(keys::USER_DIR)
            .required()
            .description("Directory holding flows, credentials and installed nodes"),
        SettingEntry::object(keys::EDITOR_THEME).description("Editor appearance and features"),
        SettingEntry::string(keys::THEME)
            .description("Editor theme name; the built-in theme is used when unset"),
        SettingEntry::object(keys::PROJECTS),
        SettingEntry::boolean(keys::PROJECTS_ENABLED)
            .default(false)
            .description("Enable the projects feature"),
        SettingEntry::object(keys::PROJECTS_WORKFLOW),
        SettingEntry::enumeration(
            keys::WORKFLOW_MODE,
            WorkflowMode::ALL.map(WorkflowMode::as_str),
        )
        .default(WorkflowMode::Manual.as_str())
        .description("Whether project changes are committed manually or automatically"),
        SettingEntry::object(keys::MULTIPLAYER),
        SettingEntry::boolean(keys::MULTIPLAYER_ENABLED)
            .default(false)
            .description("Allow several users to edit flows at the same time"),
        SettingEntry::boolean(keys::FUNCTION_EXTERNAL_MODULES)
            .default(false)
            .description("Allow function nodes to import external modules"),
    ]
}

// =============================================================================
// Typed Views
// =============================================================================

/// Project commit workflow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowMode {
    #[default]
    Manual,
    Auto,
}

impl WorkflowMode {
    pub const ALL: [WorkflowMode; 2] = [WorkflowMode::Manual, WorkflowMode::Auto];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowMode::Manual => "manual",
            WorkflowMode::Auto => "auto",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSettings {
    pub mode: WorkflowMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectsSettings {
    pub enabled: bool,
    pub workflow: WorkflowSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplayerSettings {
    pub enabled: bool,
}

/// Editor theming settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorTheme {
    /// Theme name; `None` means the built-in default theme
    #[serde(default)]
    pub theme: Option<String>,
    pub projects: ProjectsSettings,
    pub multiplayer: MultiplayerSettings,
}

/// Typed view over a validated flow runtime document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSettings {
    pub flow_file: String,
    pub flow_file_pretty: bool,
    pub user_dir: String,
    pub editor_theme: EditorTheme,
    pub function_external_modules: bool,
}

impl FlowSettings {
    /// Build the typed view from a snapshot validated against [`flow_registry`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deserialize`](crate::Error::Deserialize) if the
    /// snapshot was validated against a different schema.
    pub fn from_settings(settings: &ValidatedSettings) -> Result<Self> {
        settings.deserialize()
    }

    /// Where the flow file lives: `flowFile` under `userDir`, with `~`
    /// expanded. An absolute `flowFile` is used as-is.
    #[must_use]
    pub fn flow_file_path(&self) -> PathBuf {
        let user_dir = expand_home(Path::new(&self.user_dir));
        user_dir.join(expand_home(Path::new(&self.flow_file)))
    }

    /// Theme name to apply, if one was configured
    #[must_use]
    pub fn theme(&self) -> Option<&str> {
        self.editor_theme.theme.as_deref()
    }

    /// Whether collaborative multi-user editing is switched on
    #[must_use]
    pub fn collaboration_enabled(&self) -> bool {
        self.editor_theme.multiplayer.enabled
    }

    /// Whether user-authored function nodes may import external modules.
    ///
    /// This is only the flag; enforcement belongs to the sandbox.
    #[must_use]
    pub fn external_modules_allowed(&self) -> bool {
        self.function_external_modules
    }

    /// Whether the projects feature is on, and in which workflow mode
    #[must_use]
    pub fn projects(&self) -> Option<WorkflowMode> {
        let projects = &self.editor_theme.projects;
        projects.enabled.then_some(projects.workflow.mode)
    }
}

// =============================================================================
// Tests
// =============================================================================
