use retcon_config::{ConfigError, RawEntry, SourceLoader};
use serde_json::Value;

/// Source returning a fixed bag.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    priority: u16,
    entries: Vec<RawEntry>,
}

impl StaticSource {
    /// Top-level keys of `document` become the bag's entries.
    pub fn new(name: impl Into<String>, priority: u16, document: Value) -> Self {
        let entries = match document {
            Value::Object(map) => map.into_iter().collect(),
            _ => Vec::new(),
        };
        Self {
            name: name.into(),
            priority,
            entries,
        }
    }

    pub fn boxed(self) -> Box<dyn SourceLoader> {
        Box::new(self)
    }
}

impl SourceLoader for StaticSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn priority(&self) -> u16 {
        self.priority
    }

    fn load(&self) -> Result<Vec<RawEntry>, ConfigError> {
        Ok(self.entries.clone())
    }
}
