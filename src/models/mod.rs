// src/models/mod.rs

//! Domain models for the watcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod item;
mod notification;
mod seen;

// Re-export all public types
pub use config::{
    Config, DiscordConfig, MAX_CHECK_INTERVAL_MINUTES, NotifyConfig, StorageConfig, WatcherConfig,
};
pub use item::{Item, identity_key};
pub use notification::{BatchSummary, MAX_BATCH_SIZE, NotificationBatch, NotificationEntry};
pub use seen::{SEEN_DOCUMENT_VERSION, SeenDocument, SeenRecord};
