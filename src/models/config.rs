//! Application configuration structures.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::MAX_BATCH_SIZE;

/// Upper bound for `watcher.check_interval_minutes` (one week).
pub const MAX_CHECK_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Source page and HTTP settings
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Seen-record location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Batching limits
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Discord webhook settings
    #[serde(default)]
    pub discord: DiscordConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.discord.normalize();
        Ok(config)
    }

    /// Load configuration or return default if loading fails.
    ///
    /// A missing file is normal (only `config.example.toml` ships) and is
    /// logged at info level. Any other failure is a warning.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(AppError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                log::info!("No config file at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                log::warn!("Config load failed from {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    /// Apply overrides from any variable source.
    ///
    /// Recognised: `DISCORD_WEBHOOK_URL`, `CHECK_INTERVAL_MINUTES`, `SEEN_POSTS_FILE`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("DISCORD_WEBHOOK_URL").filter(|v| !v.trim().is_empty()) {
            self.discord.webhook_url = Some(url.trim().to_string());
        }
        if let Some(minutes) = lookup("CHECK_INTERVAL_MINUTES") {
            self.watcher.check_interval_minutes = minutes.trim().parse().map_err(|_| {
                AppError::config(format!("CHECK_INTERVAL_MINUTES is not a number: {minutes}"))
            })?;
        }
        if let Some(path) = lookup("SEEN_POSTS_FILE").filter(|v| !v.trim().is_empty()) {
            self.storage.seen_posts_file = PathBuf::from(path);
        }
        self.discord.normalize();
        Ok(())
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.watcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("watcher.user_agent is empty"));
        }
        if self.watcher.timeout_secs == 0 {
            return Err(AppError::validation("watcher.timeout_secs must be > 0"));
        }
        if !(1..=MAX_CHECK_INTERVAL_MINUTES).contains(&self.watcher.check_interval_minutes) {
            return Err(AppError::validation(format!(
                "watcher.check_interval_minutes must be between 1 and {MAX_CHECK_INTERVAL_MINUTES}"
            )));
        }
        url::Url::parse(&self.watcher.source_url).map_err(|e| {
            AppError::validation(format!(
                "watcher.source_url '{}' is invalid: {e}",
                self.watcher.source_url
            ))
        })?;
        if self.storage.seen_posts_file.as_os_str().is_empty() {
            return Err(AppError::validation("storage.seen_posts_file is empty"));
        }
        if !(1..=MAX_BATCH_SIZE).contains(&self.notify.max_batch_size) {
            return Err(AppError::validation(format!(
                "notify.max_batch_size must be between 1 and {MAX_BATCH_SIZE}"
            )));
        }
        Ok(())
    }
}

/// Source page and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Page listing the announcements
    #[serde(default = "defaults::source_url")]
    pub source_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Minutes between scheduled checks
    #[serde(default = "defaults::check_interval")]
    pub check_interval_minutes: u64,
}

impl WatcherConfig {
    /// Time between scheduled checks.
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes.saturating_mul(60))
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            source_url: defaults::source_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            check_interval_minutes: defaults::check_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the seen record
    #[serde(default = "defaults::seen_posts_file")]
    pub seen_posts_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            seen_posts_file: defaults::seen_posts_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Entries per notification message
    #[serde(default = "defaults::max_batch_size")]
    pub max_batch_size: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            max_batch_size: defaults::max_batch_size(),
        }
    }
}

/// Discord webhook settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Usually supplied through `DISCORD_WEBHOOK_URL`
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Prefix messages with `@everyone`
    #[serde(default = "defaults::mention_everyone")]
    pub mention_everyone: bool,

    /// Shown in the header line, e.g. "3 New MapleSEA Updates!"
    #[serde(default = "defaults::site_name")]
    pub site_name: String,

    #[serde(default = "defaults::footer_text")]
    pub footer_text: String,
}

impl DiscordConfig {
    /// Whether a usable (non-blank) webhook URL is set.
    pub fn has_webhook(&self) -> bool {
        self.webhook_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// Trim the webhook URL and treat a blank one as unset.
    fn normalize(&mut self) {
        self.webhook_url = self
            .webhook_url
            .take()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            mention_everyone: defaults::mention_everyone(),
            site_name: defaults::site_name(),
            footer_text: defaults::footer_text(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use crate::models::MAX_BATCH_SIZE;

    // Watcher defaults
    pub fn source_url() -> String {
        "https://www.maplesea.com/updates".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn check_interval() -> u64 {
        30
    }

    // Storage defaults
    pub fn seen_posts_file() -> PathBuf {
        PathBuf::from("seen_posts.json")
    }

    // Notify defaults
    pub fn max_batch_size() -> usize {
        MAX_BATCH_SIZE
    }

    // Discord defaults
    pub fn mention_everyone() -> bool {
        true
    }
    pub fn site_name() -> String {
        "MapleSEA".into()
    }
    pub fn footer_text() -> String {
        "MapleSEA Updates Watcher".into()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.watcher.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_oversized_batches() {
        let mut config = Config::default();
        config.notify.max_batch_size = 11;
        assert!(config.validate().is_err());
        config.notify.max_batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_source_url() {
        let mut config = Config::default();
        config.watcher.source_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [watcher]
            check_interval_minutes = 5

            [discord]
            mention_everyone = false
            "#,
        )
        .unwrap();

        assert_eq!(config.watcher.check_interval_minutes, 5);
        assert_eq!(config.watcher.timeout_secs, 30);
        assert!(!config.discord.mention_everyone);
        assert_eq!(config.notify.max_batch_size, MAX_BATCH_SIZE);
        assert_eq!(config.storage.seen_posts_file, PathBuf::from("seen_posts.json"));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup(&[
                ("DISCORD_WEBHOOK_URL", "https://discord.test/hook"),
                ("CHECK_INTERVAL_MINUTES", "15"),
                ("SEEN_POSTS_FILE", "/tmp/seen.json"),
            ]))
            .unwrap();

        assert_eq!(
            config.discord.webhook_url.as_deref(),
            Some("https://discord.test/hook")
        );
        assert_eq!(config.watcher.check_interval_minutes, 15);
        assert_eq!(config.storage.seen_posts_file, PathBuf::from("/tmp/seen.json"));
    }

    #[test]
    fn overrides_reject_bad_interval() {
        let mut config = Config::default();
        let result = config.apply_overrides(lookup(&[("CHECK_INTERVAL_MINUTES", "soon")]));
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_interval() {
        let mut config = Config::default();
        config.watcher.check_interval_minutes = 0;
        assert!(config.validate().is_err());
        config.watcher.check_interval_minutes = MAX_CHECK_INTERVAL_MINUTES + 1;
        assert!(config.validate().is_err());
        config.watcher.check_interval_minutes = MAX_CHECK_INTERVAL_MINUTES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn check_interval_saturates() {
        let mut config = Config::default();
        config.watcher.check_interval_minutes = 5;
        assert_eq!(config.watcher.check_interval(), Duration::from_secs(300));

        config.watcher.check_interval_minutes = u64::MAX;
        assert_eq!(config.watcher.check_interval(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn huge_interval_override_fails_validation() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup(&[("CHECK_INTERVAL_MINUTES", "18446744073709551615")]))
            .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_webhook_in_file_is_unset() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[discord]\nwebhook_url = \"\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.discord.webhook_url.is_none());
        assert!(!config.discord.has_webhook());
    }

    #[test]
    fn blank_webhook_is_unset_after_overrides() {
        let mut config = Config::default();
        config.discord.webhook_url = Some("   ".to_string());
        config.apply_overrides(lookup(&[])).unwrap();
        assert!(config.discord.webhook_url.is_none());
    }

    #[test]
    fn has_webhook_requires_non_blank_url() {
        let mut discord = DiscordConfig::default();
        assert!(!discord.has_webhook());
        discord.webhook_url = Some(" ".to_string());
        assert!(!discord.has_webhook());
        discord.webhook_url = Some("https://discord.test/hook".to_string());
        assert!(discord.has_webhook());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = Config::load_or_default(tmp.path().join("config.toml"));
        assert_eq!(config.watcher.check_interval_minutes, 30);
        assert!(config.discord.webhook_url.is_none());
    }

    #[test]
    fn blank_webhook_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[("DISCORD_WEBHOOK_URL", "  ")])).unwrap();
        assert!(config.discord.webhook_url.is_none());
    }
}
