// src/lib.rs

//! Updates Watcher Library
//!
//! Detects new and updated announcements on a web page and turns them into
//! batched webhook notifications.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
