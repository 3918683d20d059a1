//! Error types for source loading and value conversion.

use crate::PropertyKind;
use thiserror::Error;

/// Errors raised while reading sources or converting raw values.
///
/// `ConfigRegistry::load` recovers from all of them: the offending source or
/// key is logged and skipped.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a config file failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a config file in a given format failed.
    #[error("failed to parse {format} config: {message}")]
    ParseFailed {
        format: &'static str,
        message: String,
    },
    /// A raw value could not be converted to its declared kind.
    #[error("cannot convert {name} to {kind}: {message}")]
    Convert {
        name: String,
        kind: PropertyKind,
        message: String,
    },
}
