//! Change classification against the seen record.
//!
//! Splits a freshly fetched batch into new and updated items. Items are
//! identified by `date + "_" + url`; a known identity whose title differs
//! byte-for-byte from the recorded one counts as updated.

use std::collections::HashSet;

use crate::models::{Item, SeenRecord};

/// Items that need a notification, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationResult {
    pub new_items: Vec<Item>,
    pub updated_items: Vec<Item>,
}

impl ClassificationResult {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.new_items.is_empty() || !self.updated_items.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.new_items.len() + self.updated_items.len()
    }
}

/// Classify `current` against `record`, recording every new or changed title.
///
/// Unchanged items leave the record untouched. A key seen twice in the same
/// batch is only classified on its first occurrence.
pub fn classify(current: &[Item], record: &mut SeenRecord) -> ClassificationResult {
    let mut result = ClassificationResult::default();
    let mut emitted: HashSet<String> = HashSet::new();

    for item in current {
        let key = item.identity_key();
        if emitted.contains(&key) {
            log::debug!("Skipping duplicate key in batch: {key}");
            continue;
        }

        match record.get(&key) {
            None => {
                log::debug!("New post: {item}");
                record.insert(key.clone(), item.title.clone());
                result.new_items.push(item.clone());
                emitted.insert(key);
            }
            Some(previous) if previous != item.title => {
                log::debug!("Updated post: [{}] {} -> {}", item.date, previous, item.title);
                record.insert(key.clone(), item.title.clone());
                result.updated_items.push(item.clone());
                emitted.insert(key);
            }
            Some(_) => {}
        }
    }

    result
}
