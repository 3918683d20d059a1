//! Typed, concurrency-safe configuration registry.

use crate::convert;
use crate::loader::{SourceLayout, SourceLoader};
use crate::{ConfigProperty, KeyDeclaration, PropertyKind, PropertyValue};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use parking_lot::RwLock;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Name -> properties seen for that name, most authoritative first.
type Bucket = RwLock<HashMap<String, Vec<ConfigProperty>>>;

/// Counters describing a `ConfigRegistry::load` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Sources whose bag was read.
    pub sources_loaded: usize,
    /// Sources skipped because they could not be read or parsed.
    pub sources_skipped: usize,
    /// Properties inserted.
    pub inserted: usize,
    /// Entries dropped because they were null or failed conversion.
    pub rejected: usize,
}

/// Registry of typed configuration properties, one bucket per kind.
///
/// Each bucket is an independent map guarded by its own lock, so readers of
/// one kind never contend with writers of another. Within a bucket a name
/// maps to every property loaded for it, ordered by descending priority;
/// lookups return the first.
#[derive(Debug, Default)]
pub struct ConfigRegistry {
    booleans: Bucket,
    strings: Bucket,
    timestamps: Bucket,
    durations: Bucket,
    numbers: Bucket,
    objects: Bucket,
    sequences: Bucket,
    declarations: RwLock<HashMap<String, KeyDeclaration>>,
    next_id: AtomicU32,
}

impl ConfigRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the default source layout.
    pub fn from_layout(layout: &SourceLayout) -> Self {
        let registry = Self::new();
        registry.load(&layout.sources());
        registry
    }

    /// Declare the kind and nullability of a key before loading.
    ///
    /// Declared keys are converted to their kind instead of having one
    /// inferred, and their spelling is used for case-folded source keys.
    pub fn declare(&self, name: impl Into<String>, declaration: KeyDeclaration) {
        let name = name.into();
        debug!(
            "declaring key (name={}, kind={}, nullable={})",
            name, declaration.kind, declaration.nullable
        );
        self.declarations.write().insert(name, declaration);
    }

    /// Load every source in order, skipping sources that fail.
    pub fn load(&self, sources: &[Box<dyn SourceLoader>]) -> LoadSummary {
        let mut summary = LoadSummary::default();
        for source in sources {
            let entries = match source.load() {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("skipping source (source={}, error={})", source.name(), err);
                    summary.sources_skipped += 1;
                    continue;
                }
            };
            debug!(
                "loaded source (source={}, priority={}, entries={})",
                source.name(),
                source.priority(),
                entries.len()
            );
            summary.sources_loaded += 1;

            for (name, raw) in entries {
                if self.load_entry(name, raw, source.priority()) {
                    summary.inserted += 1;
                } else {
                    summary.rejected += 1;
                }
            }
        }
        info!(
            "config registry loaded (sources={}, skipped={}, properties={}, rejected={})",
            summary.sources_loaded, summary.sources_skipped, summary.inserted, summary.rejected
        );
        summary
    }

    fn load_entry(&self, name: String, raw: Value, priority: u16) -> bool {
        let name = self.canonical_name(name);
        let declaration = self.declarations.read().get(&name).copied();
        let converted = match declaration {
            Some(_) if raw.is_null() => None,
            Some(declaration) => match convert::convert(&name, raw, declaration.kind) {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!("dropping config value (error={})", err);
                    return false;
                }
            },
            None => convert::infer(raw),
        };
        let Some(value) = converted else {
            debug!("skipping null config value (name={})", name);
            return false;
        };
        let nullable = declaration.is_none_or(|declaration| declaration.nullable);
        self.insert_property(name, priority, nullable, value);
        true
    }

    /// Insert a typed value under `name` with the given priority.
    pub fn insert(&self, name: impl Into<String>, priority: u16, value: PropertyValue) -> u32 {
        let name = name.into();
        let nullable = self
            .declarations
            .read()
            .get(&name)
            .is_none_or(|declaration| declaration.nullable);
        self.insert_property(name, priority, nullable, value)
    }

    fn insert_property(
        &self,
        name: String,
        priority: u16,
        nullable: bool,
        value: PropertyValue,
    ) -> u32 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let kind = value.kind();
        let property = ConfigProperty {
            id,
            name: name.clone(),
            priority,
            nullable,
            value,
        };
        let mut bucket = self.bucket(kind).write();
        let entries = bucket.entry(name).or_default();
        // Stable for equal priorities: the earlier entry stays first.
        let position = entries
            .iter()
            .position(|existing| existing.priority < priority)
            .unwrap_or(entries.len());
        entries.insert(position, property);
        id
    }

    /// Boolean value for `name`.
    pub fn get_boolean(&self, name: &str) -> Option<bool> {
        self.first(PropertyKind::Boolean, name)
            .map(|value| match value {
                PropertyValue::Boolean(flag) => flag,
                other => mismatch(PropertyKind::Boolean, name, &other),
            })
    }

    /// String value for `name`.
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.first(PropertyKind::String, name)
            .map(|value| match value {
                PropertyValue::String(text) => text,
                other => mismatch(PropertyKind::String, name, &other),
            })
    }

    /// Timestamp value for `name`.
    pub fn get_timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        self.first(PropertyKind::Timestamp, name)
            .map(|value| match value {
                PropertyValue::Timestamp(timestamp) => timestamp,
                other => mismatch(PropertyKind::Timestamp, name, &other),
            })
    }

    /// Duration value for `name`.
    pub fn get_duration(&self, name: &str) -> Option<Duration> {
        self.first(PropertyKind::Duration, name)
            .map(|value| match value {
                PropertyValue::Duration(duration) => duration,
                other => mismatch(PropertyKind::Duration, name, &other),
            })
    }

    /// Number value for `name`.
    pub fn get_number(&self, name: &str) -> Option<Number> {
        self.first(PropertyKind::Number, name)
            .map(|value| match value {
                PropertyValue::Number(number) => number,
                other => mismatch(PropertyKind::Number, name, &other),
            })
    }

    /// Object value for `name`.
    pub fn get_object(&self, name: &str) -> Option<Map<String, Value>> {
        self.first(PropertyKind::Object, name)
            .map(|value| match value {
                PropertyValue::Object(map) => map,
                other => mismatch(PropertyKind::Object, name, &other),
            })
    }

    /// Sequence value for `name`.
    pub fn get_sequence(&self, name: &str) -> Option<Vec<Value>> {
        self.first(PropertyKind::Sequence, name)
            .map(|value| match value {
                PropertyValue::Sequence(items) => items,
                other => mismatch(PropertyKind::Sequence, name, &other),
            })
    }

    /// Winning property for `name` in the `kind` bucket.
    pub fn get_property(&self, kind: PropertyKind, name: &str) -> Option<ConfigProperty> {
        self.bucket(kind)
            .read()
            .get(name)
            .and_then(|entries| entries.first())
            .cloned()
    }

    /// Every property stored for `name` in the `kind` bucket, winner first.
    pub fn entries(&self, kind: PropertyKind, name: &str) -> Vec<ConfigProperty> {
        self.bucket(kind)
            .read()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Sorted names present in the `kind` bucket.
    pub fn names(&self, kind: PropertyKind) -> Vec<String> {
        let mut names = self.bucket(kind).read().keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    /// Number of distinct names across all buckets.
    pub fn len(&self) -> usize {
        PropertyKind::ALL
            .iter()
            .map(|kind| self.bucket(*kind).read().len())
            .sum()
    }

    /// Whether no property has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Declared non-nullable keys with no value in their bucket, sorted.
    pub fn missing_required(&self) -> Vec<String> {
        let declarations = self.declarations.read();
        let mut missing = declarations
            .iter()
            .filter(|(_, declaration)| !declaration.nullable)
            .filter(|(name, declaration)| self.get_property(declaration.kind, name).is_none())
            .map(|(name, _)| name.clone())
            .collect::<Vec<_>>();
        missing.sort();
        missing
    }

    fn first(&self, kind: PropertyKind, name: &str) -> Option<PropertyValue> {
        self.get_property(kind, name).map(|property| property.value)
    }

    fn bucket(&self, kind: PropertyKind) -> &Bucket {
        match kind {
            PropertyKind::Boolean => &self.booleans,
            PropertyKind::String => &self.strings,
            PropertyKind::Timestamp => &self.timestamps,
            PropertyKind::Duration => &self.durations,
            PropertyKind::Number => &self.numbers,
            PropertyKind::Object => &self.objects,
            PropertyKind::Sequence => &self.sequences,
        }
    }

    /// Map a source key onto a declared key that differs only in ASCII case.
    fn canonical_name(&self, name: String) -> String {
        let declarations = self.declarations.read();
        if declarations.contains_key(&name) {
            return name;
        }
        declarations
            .keys()
            .find(|declared| declared.eq_ignore_ascii_case(&name))
            .cloned()
            .unwrap_or(name)
    }
}

fn mismatch(expected: PropertyKind, name: &str, found: &PropertyValue) -> ! {
    panic!(
        "{expected} bucket holds a {} value for {name}",
        found.kind()
    )
}
