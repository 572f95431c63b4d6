// src/services/updates.rs

//! Updates page scraper.
//!
//! Reads list entries shaped like `[DD.MM] : Title` from an announcements
//! page and turns them into items.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Item, WatcherConfig};
use crate::services::Fetcher;
use crate::utils::http::{create_async_client, fetch_text};
use crate::utils::{join_trimmed, resolve_url};

const ITEM_SELECTOR: &str = "li";
const LINK_SELECTOR: &str = "a";
const ENTRY_PATTERN: &str = r"^\[(\d{2}\.\d{2})\]\s*:\s*(.+)";

/// Fetches and parses the announcements page.
pub struct UpdatesScraper {
    source_url: Url,
    client: Client,
}

impl UpdatesScraper {
    /// Create a scraper for the configured source page.
    pub fn new(config: &WatcherConfig) -> Result<Self> {
        Ok(Self {
            source_url: Url::parse(&config.source_url)?,
            client: create_async_client(config)?,
        })
    }

    pub fn source_url(&self) -> &Url {
        &self.source_url
    }

    async fn try_fetch(&self) -> Result<Vec<Item>> {
        let html = fetch_text(&self.client, self.source_url.as_str()).await?;
        parse_updates(&html, &self.source_url)
    }
}

#[async_trait]
impl Fetcher for UpdatesScraper {
    async fn fetch(&self) -> Vec<Item> {
        match self.try_fetch().await {
            Ok(items) => {
                log::info!("Found {} updates on the page", items.len());
                items
            }
            Err(e) => {
                log::error!("Error fetching updates from {}: {}", self.source_url, e);
                Vec::new()
            }
        }
    }
}

/// Extract items from an updates page.
///
/// Every `<li>` holding a link whose text matches `[DD.MM] : Title` becomes
/// an item; relative links are resolved against `page_url`. Entries that
/// fail item validation are skipped.
pub fn parse_updates(html: &str, page_url: &Url) -> Result<Vec<Item>> {
    let item_sel = parse_selector(ITEM_SELECTOR)?;
    let link_sel = parse_selector(LINK_SELECTOR)?;
    let entry_re = Regex::new(ENTRY_PATTERN)?;

    let document = Html::parse_document(html);
    let mut items = Vec::new();

    for li in document.select(&item_sel) {
        let Some(href) = li
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .filter(|href| !href.is_empty())
        else {
            continue;
        };

        let text = join_trimmed(li.text());
        let Some(caps) = entry_re.captures(&text) else {
            continue;
        };

        let date = &caps[1];
        let title = caps[2].trim();
        let url = resolve_url(page_url, href);

        match Item::new(date, title, url, text.as_str()) {
            Ok(item) => items.push(item),
            Err(e) => log::debug!("Skipping list entry '{text}': {e}"),
        }
    }

    Ok(items)
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
