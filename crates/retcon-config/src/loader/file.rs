//! File-backed sources parsed as YAML, TOML or JSON.

use super::{RawEntry, SourceLoader, flatten};
use crate::ConfigError;
use log::debug;
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Wire format used to parse a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Toml,
    /// JSON, read with the JSON5 parser so comments and trailing commas pass.
    Json,
}

impl FileFormat {
    /// Short label used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Yaml => "yaml",
            FileFormat::Toml => "toml",
            FileFormat::Json => "json",
        }
    }

    /// File extensions probed for this format, in order.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileFormat::Yaml => &["yaml", "yml"],
            FileFormat::Toml => &["toml"],
            FileFormat::Json => &["json", "json5"],
        }
    }

    /// Parse file contents into a JSON document.
    pub fn parse(&self, contents: &str) -> Result<Value, ConfigError> {
        let parsed = match self {
            FileFormat::Yaml => serde_yaml::from_str::<Value>(contents).map_err(|err| {
                ConfigError::ParseFailed {
                    format: self.as_str(),
                    message: err.to_string(),
                }
            })?,
            FileFormat::Toml => contents
                .parse::<toml::Table>()
                .map(|table| toml_to_json(toml::Value::Table(table)))
                .map_err(|err| ConfigError::ParseFailed {
                    format: self.as_str(),
                    message: err.to_string(),
                })?,
            FileFormat::Json => {
                json5::from_str::<Value>(contents).map_err(|err| ConfigError::ParseFailed {
                    format: self.as_str(),
                    message: err.to_string(),
                })?
            }
        };
        match parsed {
            Value::Object(_) => Ok(parsed),
            Value::Null => Ok(Value::Object(Map::new())),
            _ => Err(ConfigError::ParseFailed {
                format: self.as_str(),
                message: "top-level value is not a mapping".to_string(),
            }),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A config file read in a single format.
///
/// Candidate paths are probed in order; the first existing candidate that
/// parses supplies the keys. Missing files produce an empty bag.
#[derive(Debug, Clone)]
pub struct FileSource {
    format: FileFormat,
    candidates: Vec<PathBuf>,
    priority: u16,
}

impl FileSource {
    /// Source reading exactly `path` in `format`.
    pub fn new(path: impl AsRef<Path>, format: FileFormat, priority: u16) -> Self {
        Self {
            format,
            candidates: vec![path.as_ref().to_path_buf()],
            priority,
        }
    }

    /// Source probing `dir/stem` and then `dir/stem.<ext>` for each format extension.
    pub fn from_stem(dir: impl AsRef<Path>, stem: &str, format: FileFormat, priority: u16) -> Self {
        let dir = dir.as_ref();
        let mut candidates = vec![dir.join(stem)];
        candidates.extend(
            format
                .extensions()
                .iter()
                .map(|ext| dir.join(format!("{stem}.{ext}"))),
        );
        Self {
            format,
            candidates,
            priority,
        }
    }
}

impl SourceLoader for FileSource {
    fn name(&self) -> String {
        let first = self
            .candidates
            .first()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        format!("{}({first})", self.format)
    }

    fn priority(&self) -> u16 {
        self.priority
    }

    fn load(&self) -> Result<Vec<RawEntry>, ConfigError> {
        let mut last_error = None;
        for path in self.candidates.iter().filter(|path| path.is_file()) {
            debug!(
                "reading config file (format={}, path={})",
                self.format,
                path.display()
            );
            let parsed = fs::read_to_string(path)
                .map_err(ConfigError::from)
                .and_then(|contents| self.format.parse(&contents));
            match parsed {
                Ok(document) => return Ok(flatten::flatten_document(document)),
                Err(err) => {
                    debug!(
                        "candidate rejected (format={}, path={}, error={})",
                        self.format,
                        path.display(),
                        err
                    );
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) => Err(err),
            None => {
                debug!("no config file found (source={})", self.name());
                Ok(Vec::new())
            }
        }
    }
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(text) => Value::String(text),
        toml::Value::Integer(number) => Value::from(number),
        toml::Value::Float(number) => Value::from(number),
        toml::Value::Boolean(flag) => Value::Bool(flag),
        toml::Value::Datetime(datetime) => Value::String(datetime.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}
