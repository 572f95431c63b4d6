//! Change detection and notification pipeline.
//!
//! - `classify`: split fetched items into new and updated against the seen record
//! - `build_batches`: group changes into webhook-sized notification batches
//! - `Watcher`: run check cycles and the scheduler

pub mod batch;
pub mod classify;
pub mod watcher;

pub use batch::{UPDATE_KEYWORDS, build_batches, looks_like_update};
pub use classify::{ClassificationResult, classify};
pub use watcher::{CheckReport, Watcher};
