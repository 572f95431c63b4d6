// src/services/discord.rs

//! Discord webhook dispatcher.
//!
//! Renders each notification batch as one webhook message with one embed per
//! entry.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{AppError, Result};
use crate::models::{DiscordConfig, NotificationBatch, NotificationEntry, WatcherConfig};
use crate::services::Dispatcher;
use crate::utils::http::create_async_client;

const COLOR_NEW: u32 = 0x00FF00;
const COLOR_UPDATED: u32 = 0xFFA500;
const COLOR_TEST: u32 = 0x0099FF;

/// Discord rejects embed titles longer than this.
const MAX_EMBED_TITLE: usize = 256;

const UPDATED_DESCRIPTION: &str = "📝 *This post has been updated*";

/// Body of a webhook `POST`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WebhookPayload {
    pub content: String,
    pub embeds: Vec<Embed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<AllowedMentions>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AllowedMentions {
    pub parse: Vec<String>,
}

/// Posts notification batches to a Discord webhook.
pub struct DiscordNotifier {
    config: DiscordConfig,
    client: Client,
}

impl DiscordNotifier {
    pub fn new(config: DiscordConfig, http: &WatcherConfig) -> Result<Self> {
        Ok(Self {
            config,
            client: create_async_client(http)?,
        })
    }

    /// Build the webhook message for a batch.
    pub fn build_payload(&self, batch: &NotificationBatch) -> WebhookPayload {
        let summary = batch.summary();

        let mut content_parts = Vec::new();
        if self.config.mention_everyone {
            content_parts.push("@everyone".to_string());
        }
        if summary.new_count > 0 {
            content_parts.push(format!(
                "🍁 **{} New {} Update{}!**",
                summary.new_count,
                self.config.site_name,
                plural(summary.new_count)
            ));
        }
        if summary.updated_count > 0 {
            content_parts.push(format!(
                "📝 **{} Updated Post{}!**",
                summary.updated_count,
                plural(summary.updated_count)
            ));
        }

        WebhookPayload {
            content: content_parts.join(" "),
            embeds: batch.entries.iter().map(|e| self.embed(e)).collect(),
            allowed_mentions: self.allowed_mentions(),
        }
    }

    /// Build the fixed self-test message.
    pub fn test_payload(&self) -> WebhookPayload {
        WebhookPayload {
            content: format!("🧪 **{} Test** 🧪", self.config.footer_text),
            embeds: vec![Embed {
                title: "Test Notification".to_string(),
                url: None,
                description: Some(format!(
                    "This is a test notification from your {}.",
                    self.config.footer_text
                )),
                color: COLOR_TEST,
                footer: Some(EmbedFooter {
                    text: "If you see this, the webhook is working correctly!".to_string(),
                }),
            }],
            allowed_mentions: None,
        }
    }

    fn embed(&self, entry: &NotificationEntry) -> Embed {
        let highlighted = entry.highlighted();
        Embed {
            title: truncate_graphemes(&format!("[{}] {}", entry.date, entry.title), MAX_EMBED_TITLE),
            url: Some(entry.url.clone()),
            description: highlighted.then(|| UPDATED_DESCRIPTION.to_string()),
            color: if highlighted { COLOR_UPDATED } else { COLOR_NEW },
            footer: Some(EmbedFooter {
                text: self.config.footer_text.clone(),
            }),
        }
    }

    fn allowed_mentions(&self) -> Option<AllowedMentions> {
        self.config.mention_everyone.then(|| AllowedMentions {
            parse: vec!["everyone".to_string()],
        })
    }

    fn webhook_url(&self) -> Result<&str> {
        match self.config.webhook_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => {
                log::warn!("Discord webhook URL not configured");
                Err(AppError::config("Discord webhook URL not configured"))
            }
        }
    }

    async fn post(&self, payload: &WebhookPayload) -> Result<()> {
        let url = self.webhook_url()?;
        let response = self.client.post(url).json(payload).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::dispatch(format!("{} - {}", status.as_u16(), body)))
    }
}

#[async_trait]
impl Dispatcher for DiscordNotifier {
    async fn dispatch(&self, batch: &NotificationBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        self.post(&self.build_payload(batch)).await?;
        log::info!(
            "Successfully sent Discord notification for {} post(s)",
            batch.len()
        );
        Ok(())
    }

    async fn self_test(&self) -> Result<()> {
        self.post(&self.test_payload()).await?;
        log::info!("Discord webhook test successful!");
        Ok(())
    }
}

fn plural(count: usize) -> &'static str {
    if count > 1 { "s" } else { "" }
}

fn truncate_graphemes(text: &str, max: usize) -> String {
    let mut graphemes = text.graphemes(true);
    let head: String = graphemes.by_ref().take(max).collect();
    if graphemes.next().is_none() {
        return head;
    }

    // Leave room for the ellipsis.
    let mut shortened: String = head.graphemes(true).take(max - 1).collect();
    shortened.push('…');
    shortened
}
