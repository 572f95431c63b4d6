// src/pipeline/watcher.rs

//! Check cycle and scheduler.
//!
//! One cycle runs fetch, classify, persist, batch and dispatch in that
//! order. The seen record is only replaced in memory once it has been saved,
//! so a failed save leaves both the file and the in-memory record as they
//! were and the next cycle reports the same items again.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::models::SeenRecord;
use crate::pipeline::{build_batches, classify};
use crate::services::{Dispatcher, Fetcher};
use crate::storage::SeenStore;

/// Outcome of one check cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub checked_at: DateTime<Utc>,
    /// Items returned by the fetcher
    pub fetched: usize,
    pub new_count: usize,
    pub updated_count: usize,
    /// Batches built from the new and updated items
    pub batches: usize,
    /// Batches the dispatcher accepted
    pub delivered: usize,
}

impl CheckReport {
    fn new(fetched: usize) -> Self {
        Self {
            checked_at: Utc::now(),
            fetched,
            new_count: 0,
            updated_count: 0,
            batches: 0,
            delivered: 0,
        }
    }

    pub fn has_changes(&self) -> bool {
        self.new_count + self.updated_count > 0
    }
}

/// Owns the seen record and drives check cycles against its collaborators.
pub struct Watcher {
    fetcher: Box<dyn Fetcher>,
    store: Box<dyn SeenStore>,
    dispatcher: Box<dyn Dispatcher>,
    record: SeenRecord,
    max_batch_size: usize,
}

impl Watcher {
    /// Create a watcher, loading the seen record from `store`.
    pub fn new(
        fetcher: Box<dyn Fetcher>,
        store: Box<dyn SeenStore>,
        dispatcher: Box<dyn Dispatcher>,
        max_batch_size: usize,
    ) -> Self {
        let record = store.load();
        log::info!("Loaded {} seen posts", record.len());
        Self {
            fetcher,
            store,
            dispatcher,
            record,
            max_batch_size,
        }
    }

    pub fn record(&self) -> &SeenRecord {
        &self.record
    }

    /// Run one check cycle.
    ///
    /// Only a failed save is returned as an error. Dispatch failures are
    /// logged per batch and counted in the report.
    pub async fn check(&mut self) -> Result<CheckReport> {
        log::info!("Checking for updates...");

        let items = self.fetcher.fetch().await;
        let mut report = CheckReport::new(items.len());

        if items.is_empty() {
            log::warn!("No updates found or error occurred while scraping");
            return Ok(report);
        }

        let mut next = self.record.clone();
        let result = classify(&items, &mut next);

        if !result.has_changes() {
            log::info!("No new or updated posts found");
            return Ok(report);
        }

        report.new_count = result.new_items.len();
        report.updated_count = result.updated_items.len();

        if report.new_count > 0 {
            log::info!("Found {} new post(s):", report.new_count);
            for item in &result.new_items {
                log::info!("  - {item}");
            }
        }
        if report.updated_count > 0 {
            log::info!("Found {} updated post(s):", report.updated_count);
            for item in &result.updated_items {
                log::info!("  - {item}");
            }
        }

        self.store.persist(&next)?;
        self.record = next;

        let batches = build_batches(
            &result.new_items,
            &result.updated_items,
            self.max_batch_size,
        );
        report.batches = batches.len();

        for (i, batch) in batches.iter().enumerate() {
            match self.dispatcher.dispatch(batch).await {
                Ok(()) => report.delivered += 1,
                Err(e) => log::error!(
                    "Failed to send notification batch {}/{} ({}): {}",
                    i + 1,
                    batches.len(),
                    batch.summary(),
                    e
                ),
            }
        }

        Ok(report)
    }

    /// Mark everything currently listed as seen without notifying.
    ///
    /// Returns the number of items recorded.
    pub async fn initialize(&mut self) -> Result<usize> {
        log::info!("Initializing storage with current posts...");

        let items = self.fetcher.fetch().await;
        if items.is_empty() {
            log::warn!("No posts found, storage left unchanged");
            return Ok(0);
        }

        let mut next = self.record.clone();
        self.store.mark_seen(&mut next, &items)?;
        self.record = next;

        Ok(items.len())
    }

    /// Send a test notification.
    pub async fn test_dispatcher(&self) -> Result<()> {
        log::info!("Testing notification webhook...");
        self.dispatcher.self_test().await
    }

    /// Check immediately, then every `interval` until `shutdown` resolves.
    ///
    /// A failed cycle is logged and the schedule continues.
    pub async fn run_scheduled<F>(&mut self, interval: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = ticker.tick() => {
                    if let Err(e) = self.check().await {
                        log::error!("Error during update check: {e}");
                    }
                }
                _ = &mut shutdown => {
                    log::info!("Watcher stopped");
                    break;
                }
            }
        }
    }
}
