//! Schema and loader configuration types
//!
//! This module contains the foundational types for settings resolution:
//! - `SettingEntry` - Declaration of one recognized key (type, default, required)
//! - `SchemaRegistry` - The immutable set of recognized keys
//! - `LoaderConfig` - Where sources and environment overlays come from

mod registry;
mod schema;
mod types;

pub use registry::{SchemaRegistry, SchemaRegistryBuilder};
pub use schema::{SettingEntry, SettingType, value_kind};
pub use types::{DefaultEnvSource, EnvSource, LoaderConfig, LoaderConfigBuilder, expand_home};
