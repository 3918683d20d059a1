//! Typed configuration registry and layered sources.
//!
//! Sources (config files in several formats, environment variables) produce
//! raw key/value bags. The registry converts them into typed properties,
//! keeps one bucket per kind, and resolves conflicts by source priority.

mod convert;
mod error;
mod loader;
mod model;
mod registry;

/// Public error type returned by sources and conversions.
pub use error::ConfigError;
/// Source trait, built-in sources and the default layout.
pub use loader::{
    DEFAULT_ENV_PRIORITY, DEFAULT_JSON_PRIORITY, DEFAULT_TOML_PRIORITY, DEFAULT_YAML_PRIORITY,
    EnvSource, FileFormat, FileSource, RawEntry, SourceLayout, SourceLoader,
};
/// Property model.
pub use model::*;
/// Registry and load bookkeeping.
pub use registry::{ConfigRegistry, LoadSummary};

pub use convert::parse_duration;
