//! Tracing subscriber setup for the binary

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// `trace|debug|info|warn|error`, case-insensitive; anything else is `info`
pub fn parse_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the global subscriber. `override_level` wins over `LOG_LEVEL`.
pub fn init(override_level: Option<&str>) -> Result<()> {
    let name = match override_level {
        Some(level) => level.to_string(),
        None => std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
    };

    // stdout carries command output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&name))
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to install tracing subscriber")
}
