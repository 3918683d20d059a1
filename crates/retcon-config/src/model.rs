//! Typed property model for the configuration registry.

use chrono::{DateTime, Utc};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::time::Duration;

/// Semantic kind of a configuration property; one bucket per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Boolean,
    String,
    Timestamp,
    Duration,
    Number,
    Object,
    Sequence,
}

impl PropertyKind {
    /// Every kind, in bucket order.
    pub const ALL: [PropertyKind; 7] = [
        PropertyKind::Boolean,
        PropertyKind::String,
        PropertyKind::Timestamp,
        PropertyKind::Duration,
        PropertyKind::Number,
        PropertyKind::Object,
        PropertyKind::Sequence,
    ];

    /// Lower-case label used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Boolean => "boolean",
            PropertyKind::String => "string",
            PropertyKind::Timestamp => "timestamp",
            PropertyKind::Duration => "duration",
            PropertyKind::Number => "number",
            PropertyKind::Object => "object",
            PropertyKind::Sequence => "sequence",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed payload of a property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Boolean(bool),
    String(String),
    Timestamp(DateTime<Utc>),
    Duration(Duration),
    Number(Number),
    Object(Map<String, Value>),
    Sequence(Vec<Value>),
}

impl PropertyValue {
    /// Kind of the payload, which decides the bucket it lives in.
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Boolean(_) => PropertyKind::Boolean,
            PropertyValue::String(_) => PropertyKind::String,
            PropertyValue::Timestamp(_) => PropertyKind::Timestamp,
            PropertyValue::Duration(_) => PropertyKind::Duration,
            PropertyValue::Number(_) => PropertyKind::Number,
            PropertyValue::Object(_) => PropertyKind::Object,
            PropertyValue::Sequence(_) => PropertyKind::Sequence,
        }
    }
}

/// A single resolved configuration value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigProperty {
    /// Registry-wide insertion id.
    pub id: u32,
    /// Dotted key path.
    pub name: String,
    /// Rank of the source that produced the value.
    pub priority: u16,
    /// Whether consumers accept absence of this key.
    pub nullable: bool,
    /// Typed payload.
    pub value: PropertyValue,
}

impl ConfigProperty {
    /// Kind of the stored payload.
    pub fn kind(&self) -> PropertyKind {
        self.value.kind()
    }
}

/// Declared kind and nullability for a key, registered before loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDeclaration {
    pub kind: PropertyKind,
    pub nullable: bool,
}

impl KeyDeclaration {
    /// Declaration for a key that may be absent.
    pub fn optional(kind: PropertyKind) -> Self {
        Self {
            kind,
            nullable: true,
        }
    }

    /// Declaration for a key consumers expect to be present.
    pub fn required(kind: PropertyKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }
}
