//! G-code file list reported by the host

use serde_json::Value;
use std::collections::BTreeMap;

/// Mapping of file name to host-provided metadata
///
/// Replaced wholesale on every file-list notification, never merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileList {
    entries: BTreeMap<String, Value>,
}

impl FileList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from a notification payload.
    ///
    /// Accepts either a mapping of name to metadata or an array of metadata
    /// objects carrying a `path` or `filename` key. Anything else yields an
    /// empty list.
    pub fn from_payload(payload: &Value) -> Self {
        let entries = match payload {
            Value::Object(map) => map
                .iter()
                .map(|(name, meta)| (name.clone(), meta.clone()))
                .collect(),
            Value::Array(items) => items
                .iter()
                .filter_map(|item| {
                    let name = item
                        .get("path")
                        .or_else(|| item.get("filename"))
                        .and_then(Value::as_str)?;
                    Some((name.to_string(), item.clone()))
                })
                .collect(),
            _ => BTreeMap::new(),
        };
        Self { entries }
    }

    /// Metadata for one file
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// True if the file is listed
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no files are listed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_mapping() {
        let files = FileList::from_payload(&json!({
            "benchy.gcode": {"size": 1024},
            "cube.gcode": {"size": 64}
        }));
        assert_eq!(files.len(), 2);
        assert_eq!(files.get("benchy.gcode"), Some(&json!({"size": 1024})));
        assert_eq!(files.names().collect::<Vec<_>>(), vec!["benchy.gcode", "cube.gcode"]);
    }

    #[test]
    fn test_from_array() {
        let files = FileList::from_payload(&json!([
            {"path": "a.gcode", "size": 1},
            {"filename": "b.gcode"},
            {"size": 3}
        ]));
        assert_eq!(files.len(), 2);
        assert!(files.contains("a.gcode"));
        assert!(files.contains("b.gcode"));
    }

    #[test]
    fn test_from_unusable_payload() {
        assert!(FileList::from_payload(&json!("nope")).is_empty());
    }
}
