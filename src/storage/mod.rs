//! Storage abstractions for the seen record.
//!
//! The record is a single JSON document that is rewritten in full on every
//! save:
//!
//! ```text
//! {
//!   "version": 1,
//!   "seen_posts": {
//!     "01.01_https://www.maplesea.com/updates/123": "Patch Notes"
//!   }
//! }
//! ```
//!
//! Only one process may write a given store at a time.

pub mod local;

use crate::error::Result;
use crate::models::{Item, SeenRecord};

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for seen-record storage backends.
pub trait SeenStore: Send + Sync {
    /// Read the stored record.
    ///
    /// Missing or unreadable state yields an empty record and a warning.
    fn load(&self) -> SeenRecord;

    /// Replace the stored record. Either the new record or the previous one is
    /// left in place, never a partial write.
    fn persist(&self, record: &SeenRecord) -> Result<()>;

    /// Record every item's current title as seen and save.
    fn mark_seen(&self, record: &mut SeenRecord, items: &[Item]) -> Result<()> {
        record.record_all(items);
        self.persist(record)?;
        log::info!("Marked {} posts as seen", items.len());
        Ok(())
    }
}
