#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::{Level as TraceLevel, debug};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload};

use shotpad::cli::{self, Cli};
use shotpad::config::AppConfig;

fn parse_level(name: &str) -> TraceLevel {
    match name.to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    }
}

/// Level forced by `-v` or `LOG_LEVEL`, if any
fn requested_level(verbose: u8) -> Option<TraceLevel> {
    match verbose {
        0 => std::env::var("LOG_LEVEL").ok().map(|name| parse_level(&name)),
        1 => Some(TraceLevel::DEBUG),
        _ => Some(TraceLevel::TRACE),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let requested = requested_level(cli.verbose);

    // Installed before the config loads so its clamp warnings are visible.
    // stdout carries command output (exports, listings).
    let (filter, level_handle) = reload::Layer::new(LevelFilter::from_level(requested.unwrap_or(TraceLevel::INFO)));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // -v beats LOG_LEVEL, LOG_LEVEL beats the config file
    let log_level = requested.unwrap_or_else(|| parse_level(&config.log_level));
    level_handle.reload(LevelFilter::from_level(log_level))?;
    debug!(level = %log_level, "Logging initialized");

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(cli::run(cli, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_flag_forces_level() {
        assert_eq!(requested_level(1), Some(TraceLevel::DEBUG));
        assert_eq!(requested_level(2), Some(TraceLevel::TRACE));
        assert_eq!(requested_level(5), Some(TraceLevel::TRACE));
    }

    #[test]
    fn test_parse_level_defaults_to_info() {
        assert_eq!(parse_level("WARN"), TraceLevel::WARN);
        assert_eq!(parse_level("error"), TraceLevel::ERROR);
        assert_eq!(parse_level("loud"), TraceLevel::INFO);
    }
}
