//! Configuration sources and the default layered source layout.
//!
//! A source produces an unordered bag of `(dotted.key, raw value)` entries
//! tagged with a priority. The registry converts and ranks them.

mod env;
mod file;
mod flatten;


pub use env::EnvSource;
pub use file::{FileFormat, FileSource};

use crate::ConfigError;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// A raw `(dotted.key, value)` pair read from a source.
pub type RawEntry = (String, Value);

/// Priority of YAML file values in the default layout.
pub const DEFAULT_YAML_PRIORITY: u16 = 10;
/// Priority of TOML file values in the default layout.
pub const DEFAULT_TOML_PRIORITY: u16 = 20;
/// Priority of JSON file values in the default layout.
pub const DEFAULT_JSON_PRIORITY: u16 = 30;
/// Priority of environment variables in the default layout (highest).
pub const DEFAULT_ENV_PRIORITY: u16 = 100;

/// An origin of configuration data.
pub trait SourceLoader: Send + Sync {
    /// Human-readable label for logs.
    fn name(&self) -> String;

    /// Rank of this source; higher values override lower ones for the same key.
    fn priority(&self) -> u16;

    /// Read the raw key/value bag.
    fn load(&self) -> Result<Vec<RawEntry>, ConfigError>;
}

/// Options controlling the default source stack for a base name.
///
/// Load order (low -> high priority): YAML file, TOML file, JSON file,
/// environment variables prefixed with the upper-cased base name.
#[derive(Debug, Clone)]
pub struct SourceLayout {
    /// Base name: file stem and environment prefix.
    pub base_name: String,
    /// Directory holding the config file.
    pub dir: PathBuf,
    /// Priority per file format.
    pub file_priorities: Vec<(FileFormat, u16)>,
    /// Priority for environment variables; `None` skips the environment.
    pub env_priority: Option<u16>,
    /// Fixed environment snapshot; `None` reads the process environment.
    pub env_vars: Option<Vec<(String, String)>>,
}

impl SourceLayout {
    /// Default layout for `base_name`, with files resolved against `dir`.
    pub fn new(base_name: impl Into<String>, dir: impl AsRef<Path>) -> Self {
        Self {
            base_name: base_name.into(),
            dir: dir.as_ref().to_path_buf(),
            file_priorities: vec![
                (FileFormat::Yaml, DEFAULT_YAML_PRIORITY),
                (FileFormat::Toml, DEFAULT_TOML_PRIORITY),
                (FileFormat::Json, DEFAULT_JSON_PRIORITY),
            ],
            env_priority: Some(DEFAULT_ENV_PRIORITY),
            env_vars: None,
        }
    }

    /// Use a fixed environment snapshot instead of the process environment.
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    /// Build the ordered source list for this layout.
    pub fn sources(&self) -> Vec<Box<dyn SourceLoader>> {
        let mut sources: Vec<Box<dyn SourceLoader>> = self
            .file_priorities
            .iter()
            .map(|(format, priority)| {
                Box::new(FileSource::from_stem(
                    &self.dir,
                    &self.base_name,
                    *format,
                    *priority,
                )) as Box<dyn SourceLoader>
            })
            .collect();

        if let Some(priority) = self.env_priority {
            let env = EnvSource::new(&self.base_name, priority);
            let env = match &self.env_vars {
                Some(vars) => env.with_vars(vars.clone()),
                None => env,
            };
            sources.push(Box::new(env));
        }
        sources
    }
}
