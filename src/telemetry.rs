//! Log subscriber installation.
//!
//! Logs go to stderr through `tracing-subscriber`. The level comes from
//! `--log-level`; a set `RUST_LOG` takes precedence so individual modules can
//! be turned up without touching the configuration.

use std::io;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::BotError;

/// Maps a level name to a filter.
///
/// Besides the `tracing` names this accepts `warning`, and treats `fatal` and
/// `panic` as `error`.
///
/// # Errors
///
/// Returns [`BotError::Configuration`] for unknown names.
pub fn parse_level(name: &str) -> Result<LevelFilter, BotError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" | "warning" => Ok(LevelFilter::WARN),
        "error" | "fatal" | "panic" => Ok(LevelFilter::ERROR),
        "off" => Ok(LevelFilter::OFF),
        other => Err(BotError::Configuration {
            message: format!("unknown log level {other:?}"),
        }),
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`BotError::Configuration`] for an unknown level or when a
/// subscriber is already installed.
pub fn init(level: &str) -> Result<(), BotError> {
    let default_level = parse_level(level)?;
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .try_init()
        .map_err(|error| BotError::Configuration {
            message: format!("cannot install log subscriber: {error}"),
        })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tracing::level_filters::LevelFilter;

    use super::parse_level;
    use crate::error::BotError;

    #[rstest]
    #[case::tracing_name("debug", LevelFilter::DEBUG)]
    #[case::upper_case("INFO", LevelFilter::INFO)]
    #[case::warning_alias("warning", LevelFilter::WARN)]
    #[case::fatal_alias("fatal", LevelFilter::ERROR)]
    #[case::panic_alias("panic", LevelFilter::ERROR)]
    fn accepts_level_names(#[case] name: &str, #[case] expected: LevelFilter) {
        assert_eq!(parse_level(name), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_levels() {
        assert!(matches!(
            parse_level("loud"),
            Err(BotError::Configuration { .. })
        ));
    }
}
