//! Announcement item data structure.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// One announcement scraped from an updates page.
///
/// Identity is derived from `date` and `url`; the title is the only field
/// compared when deciding whether a known item changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    /// Posting date as shown on the page (`DD.MM`)
    pub date: String,

    /// Announcement title
    pub title: String,

    /// Full URL to the announcement
    pub url: String,

    /// Unprocessed list entry text the item was extracted from
    pub raw_text: String,
}

impl Item {
    /// Build an item, rejecting empty date, title or url.
    pub fn new(
        date: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Result<Self> {
        let item = Self {
            date: date.into(),
            title: title.into(),
            url: url.into(),
            raw_text: raw_text.into(),
        };

        for (field, value) in [("date", &item.date), ("title", &item.title), ("url", &item.url)] {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("item {field} is empty")));
            }
        }

        Ok(item)
    }

    /// Key under which this item is tracked in the seen record.
    pub fn identity_key(&self) -> String {
        identity_key(&self.date, &self.url)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.date, self.title)
    }
}

/// `{date}_{url}`
pub fn identity_key(date: &str, url: &str) -> String {
    format!("{date}_{url}")
}
