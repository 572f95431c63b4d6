//! Service layer for the watcher.
//!
//! - Fetching announcement items (`UpdatesScraper`)
//! - Delivering notification batches (`DiscordNotifier`)

mod discord;
mod updates;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Item, NotificationBatch};

pub use discord::{AllowedMentions, DiscordNotifier, Embed, EmbedFooter, WebhookPayload};
pub use updates::{UpdatesScraper, parse_updates};

/// Source of announcement items.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the current items in page order.
    ///
    /// Failures are logged by the implementation and reported as an empty list.
    async fn fetch(&self) -> Vec<Item>;
}

/// Delivery of notification batches.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Deliver a single batch.
    async fn dispatch(&self, batch: &NotificationBatch) -> Result<()>;

    /// Send a test message to check the delivery channel works.
    async fn self_test(&self) -> Result<()>;
}
