//! Loader configuration types

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of environment variables
///
/// Abstracted so tests can supply variables without touching the process
/// environment.
pub trait EnvSource: Send + Sync {
    /// Look up a variable by name
    fn var(&self, name: &str) -> Result<String, std::env::VarError>;
}

/// Reads from the real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEnvSource;

impl EnvSource for DefaultEnvSource {
    fn var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(name)
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Result<String, std::env::VarError> {
        self.get(name).cloned().ok_or(std::env::VarError::NotPresent)
    }
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(path.strip_prefix("~").unwrap_or(path));
        }
    }
    path.to_path_buf()
}

/// Configuration for [`SettingsLoader`](crate::SettingsLoader)
#[derive(Clone)]
pub struct LoaderConfig {
    /// Directory that relative file sources resolve against
    pub base_dir: PathBuf,

    /// Environment variable prefix for overlays (e.g. "FLOW" -> `FLOW_USERDIR`).
    /// If None, [`Source::Env`](crate::Source::Env) layers contribute nothing.
    pub env_prefix: Option<String>,

    /// Where environment variables are read from
    pub env_source: Arc<dyn EnvSource>,
}

impl std::fmt::Debug for LoaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderConfig")
            .field("base_dir", &self.base_dir)
            .field("env_prefix", &self.env_prefix)
            .finish_non_exhaustive()
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            env_prefix: None,
            env_source: Arc::new(DefaultEnvSource),
        }
    }
}

impl LoaderConfig {
    /// Create a new builder
    ///
    /// # Example
    /// ```rust
    /// use flowconf::LoaderConfig;
    ///
    /// let config = LoaderConfig::builder()
    ///     .base_dir("~/.node-red")
    ///     .with_env_prefix("FLOW")
    ///     .build();
    /// assert_eq!(config.env_prefix.as_deref(), Some("FLOW"));
    /// ```
    #[must_use]
    pub fn builder() -> LoaderConfigBuilder {
        LoaderConfigBuilder::default()
    }

    /// Resolve a file source path against `base_dir`
    pub fn resolve(&self, path: &Path) -> PathBuf {
        let expanded = expand_home(path);
        if expanded.is_absolute() {
            expanded
        } else {
            self.base_dir.join(expanded)
        }
    }
}

/// Builder for [`LoaderConfig`]
#[derive(Default)]
pub struct LoaderConfigBuilder {
    base_dir: Option<PathBuf>,
    env_prefix: Option<String>,
    env_source: Option<Arc<dyn EnvSource>>,
}

impl LoaderConfigBuilder {
    /// Set the directory relative file sources resolve against
    ///
    /// Supports `~` expansion for home directory.
    #[must_use]
    pub fn base_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(expand_home(&path.into()));
        self
    }

    /// Enable environment variable overlays
    ///
    /// The variable name for a setting is `{PREFIX}_{PATH}`, uppercased, with
    /// dots replaced by underscores: `FLOW_EDITORTHEME_MULTIPLAYER_ENABLED`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Read environment variables from a custom source
    #[must_use]
    pub fn with_env_source(mut self, source: impl EnvSource + 'static) -> Self {
        self.env_source = Some(Arc::new(source));
        self
    }

    /// Build the [`LoaderConfig`]
    #[must_use]
    pub fn build(self) -> LoaderConfig {
        let defaults = LoaderConfig::default();
        LoaderConfig {
            base_dir: self.base_dir.unwrap_or(defaults.base_dir),
            env_prefix: self.env_prefix,
            env_source: self.env_source.unwrap_or(defaults.env_source),
        }
    }
}
