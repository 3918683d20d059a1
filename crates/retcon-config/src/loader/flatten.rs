//! Flatten nested documents into dotted key paths.

use super::RawEntry;
use serde_json::Value;

/// Key path delimiter.
pub(super) const DELIMITER: char = '.';

/// Flatten a parsed document into `(dotted.key, value)` entries.
///
/// Nested objects are emitted both as a whole under their own path and leaf
/// by leaf. Arrays are kept whole. The root object itself is not emitted.
pub(super) fn flatten_document(document: Value) -> Vec<RawEntry> {
    let mut entries = Vec::new();
    if let Value::Object(map) = document {
        for (key, value) in map {
            flatten_into(key, value, &mut entries);
        }
    }
    entries
}

fn flatten_into(path: String, value: Value, entries: &mut Vec<RawEntry>) {
    if let Value::Object(map) = &value {
        for (key, child) in map {
            flatten_into(join_path(&path, key), child.clone(), entries);
        }
    }
    entries.push((path, value));
}

fn join_path(base: &str, key: &str) -> String {
    let mut joined = String::with_capacity(base.len() + key.len() + 1);
    joined.push_str(base);
    joined.push(DELIMITER);
    joined.push_str(key);
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn emits_objects_and_their_leaves() {
        let entries = flatten_document(json!({
            "host": "localhost",
            "db": { "pool": { "size": 4 }, "name": "main" },
            "tags": ["a", "b"],
        }));
        let mut names = entries
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>();
        names.sort();
        assert_eq!(
            names,
            vec!["db", "db.name", "db.pool", "db.pool.size", "host", "tags"]
        );
        let tags = entries
            .iter()
            .find(|(name, _)| name == "tags")
            .map(|(_, value)| value.clone());
        assert_eq!(tags, Some(json!(["a", "b"])));
    }

    #[test]
    fn non_object_documents_yield_nothing() {
        assert!(flatten_document(json!("scalar")).is_empty());
        assert!(flatten_document(Value::Null).is_empty());
    }
}
