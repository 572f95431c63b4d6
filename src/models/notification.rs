//! Transport-independent notification batches.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest batch a single webhook message may carry.
pub const MAX_BATCH_SIZE: usize = 10;

/// One item inside a notification batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEntry {
    pub title: String,
    pub url: String,
    pub date: String,

    /// The item was already known under a different title.
    pub is_update: bool,

    /// Title text reads like an update notice. Presentation hint only.
    pub looks_like_update: bool,
}

impl NotificationEntry {
    /// Whether the entry should be rendered with the "updated" styling.
    pub fn highlighted(&self) -> bool {
        self.is_update || self.looks_like_update
    }
}

/// Ordered group of at most `MAX_BATCH_SIZE` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationBatch {
    pub entries: Vec<NotificationEntry>,
}

impl NotificationBatch {
    pub fn new(entries: Vec<NotificationEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count new vs updated entries.
    pub fn summary(&self) -> BatchSummary {
        let updated_count = self.entries.iter().filter(|e| e.is_update).count();
        BatchSummary {
            new_count: self.entries.len() - updated_count,
            updated_count,
        }
    }
}

/// Per-batch counts used for the header line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub new_count: usize,
    pub updated_count: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.new_count > 0 {
            parts.push(format!("{} new", self.new_count));
        }
        if self.updated_count > 0 {
            parts.push(format!("{} updated", self.updated_count));
        }
        if parts.is_empty() {
            return write!(f, "no changes");
        }
        write!(f, "{}", parts.join(", "))
    }
}
