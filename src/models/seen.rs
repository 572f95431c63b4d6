//! Record of every item identity already notified about.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Item;

/// Current on-disk document version.
pub const SEEN_DOCUMENT_VERSION: u32 = 1;

/// Mapping `identity_key -> last known title`.
///
/// Keys are kept sorted so the persisted file is stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenRecord {
    posts: BTreeMap<String, String>,
}

impl SeenRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known title for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.posts.get(key).map(String::as_str)
    }

    /// Store `title` for `key`, returning the previous title if any.
    pub fn insert(&mut self, key: impl Into<String>, title: impl Into<String>) -> Option<String> {
        self.posts.insert(key.into(), title.into())
    }

    /// Upsert every item's current title.
    pub fn record_all<'a>(&mut self, items: impl IntoIterator<Item = &'a Item>) {
        for item in items {
            self.insert(item.identity_key(), item.title.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl FromIterator<(String, String)> for SeenRecord {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            posts: iter.into_iter().collect(),
        }
    }
}

/// Versioned file layout: `{ "version": 1, "seen_posts": { ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeenDocument {
    /// Missing in files written before versioning; read as version 1.
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub seen_posts: SeenRecord,
}

impl SeenDocument {
    pub fn new(record: SeenRecord) -> Self {
        Self {
            version: SEEN_DOCUMENT_VERSION,
            seen_posts: record,
        }
    }
}

fn default_version() -> u32 {
    SEEN_DOCUMENT_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_returns_previous_title() {
        let mut record = SeenRecord::new();
        assert_eq!(record.insert("01.01_/a", "Old"), None);
        assert_eq!(record.insert("01.01_/a", "New"), Some("Old".to_string()));
        assert_eq!(record.get("01.01_/a"), Some("New"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_record_all_overwrites() {
        let mut record = SeenRecord::new();
        record.insert("01.01_/a", "Old");

        let items = vec![
            Item::new("01.01", "New", "/a", "").unwrap(),
            Item::new("02.01", "Other", "/b", "").unwrap(),
        ];
        record.record_all(&items);

        assert_eq!(record.get("01.01_/a"), Some("New"));
        assert_eq!(record.get("02.01_/b"), Some("Other"));
    }

    #[test]
    fn test_legacy_document_without_version() {
        let json = r#"{ "seen_posts": { "01.01_/a": "Patch Notes" } }"#;
        let doc: SeenDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.version, SEEN_DOCUMENT_VERSION);
        assert_eq!(doc.seen_posts.get("01.01_/a"), Some("Patch Notes"));
    }

    #[test]
    fn test_document_layout() {
        let record: SeenRecord = [("01.01_/a".to_string(), "메이플".to_string())]
            .into_iter()
            .collect();
        let value = serde_json::to_value(SeenDocument::new(record)).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["seen_posts"]["01.01_/a"], "메이플");
    }
}
