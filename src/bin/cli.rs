//! Updates Watcher CLI
//!
//! Local execution entry point.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use updates_watcher::{
    error::{AppError, Result},
    models::Config,
    pipeline::Watcher,
    services::{DiscordNotifier, UpdatesScraper},
    storage::LocalStorage,
};

/// Updates Watcher - announcement page to Discord notifier
#[derive(Parser, Debug)]
#[command(name = "updates-watcher", version, about = "Announcement page watcher")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Also append log output to this file (e.g. watcher.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Defaults to `run`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record every current post as seen without notifying
    Init,

    /// Send a test message to the webhook
    Test,

    /// Run a single check for updates
    Check,

    /// Check now and then on the configured interval
    Run,

    /// Validate configuration
    Validate,
}

/// Writes every record to both sinks.
struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize logging based on verbosity flag, optionally mirrored to a file.
fn init_logging(verbose: bool, log_file: Option<&Path>) {
    let level = if verbose { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    builder.format_timestamp_secs();

    if let Some(path) = log_file {
        match open_log_file(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(Tee {
                    first: io::stderr(),
                    second: file,
                })));
            }
            // The logger is not up yet.
            Err(e) => eprintln!("Cannot open log file {}: {e}", path.display()),
        }
    }

    builder.init();
}

fn build_watcher(config: &Config) -> Result<Watcher> {
    let scraper = UpdatesScraper::new(&config.watcher)?;
    let storage = LocalStorage::new(&config.storage.seen_posts_file);
    log::info!("Watching {}", scraper.source_url());
    log::info!("Seen record: {}", storage.path().display());
    let notifier = DiscordNotifier::new(config.discord.clone(), &config.watcher)?;

    Ok(Watcher::new(
        Box::new(scraper),
        Box::new(storage),
        Box::new(notifier),
        config.notify.max_batch_size,
    ))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref());

    let mut config = Config::load_or_default(&cli.config);
    config.apply_env()?;

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    let command = cli.command.unwrap_or(Command::Run);
    if let Command::Validate = command {
        log::info!("✓ Config OK");
        log::info!(
            "Webhook: {}",
            if config.discord.has_webhook() {
                "configured"
            } else {
                "not configured"
            }
        );
        return Ok(());
    }

    let mut watcher = build_watcher(&config)?;

    match command {
        Command::Init => {
            watcher.initialize().await?;
        }

        Command::Test => {
            if let Err(e) = watcher.test_dispatcher().await {
                log::error!("Discord webhook test failed: {}", e);
                return Err(e);
            }
        }

        Command::Check => {
            let report = watcher.check().await?;
            log::info!(
                "Check complete at {}: {} fetched, {} new, {} updated, {}/{} batches delivered",
                report.checked_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.fetched,
                report.new_count,
                report.updated_count,
                report.delivered,
                report.batches
            );
        }

        Command::Run => {
            if !config.discord.has_webhook() {
                log::error!(
                    "Discord webhook URL not configured! Set DISCORD_WEBHOOK_URL or discord.webhook_url"
                );
                return Err(AppError::config("Discord webhook URL not configured"));
            }

            let minutes = config.watcher.check_interval_minutes;
            let interval = config.watcher.check_interval();

            if std::env::var_os("GITHUB_ACTIONS").is_some() {
                log::info!("Running in GitHub Actions mode - single check");
                watcher.check().await?;
            } else {
                log::info!("Starting updates watcher (checking every {minutes} minutes)");
                let shutdown = async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        log::error!("Failed to listen for Ctrl-C: {e}");
                        std::future::pending::<()>().await;
                    }
                };
                watcher
                    .run_scheduled(interval, shutdown)
                    .await;
            }
        }

        Command::Validate => {}
    }

    log::info!("Done!");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tee_writes_both_sinks() {
        let mut tee = Tee {
            first: Vec::new(),
            second: Vec::new(),
        };
        writeln!(tee, "[INFO] Checking for updates...").unwrap();
        tee.flush().unwrap();

        assert_eq!(tee.first, b"[INFO] Checking for updates...\n");
        assert_eq!(tee.first, tee.second);
    }

    #[test]
    fn test_log_file_appends() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("watcher.log");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_blank_webhook_blocks_run() {
        let config: Config = toml::from_str("[discord]\nwebhook_url = \"\"\n").unwrap();
        assert!(!config.discord.has_webhook());
    }
}
