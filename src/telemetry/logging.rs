//! Logging configuration and initialization.
//!
//! `RUST_LOG` wins over the `[logging]` table of config.toml, which wins
//! over the built-in default (info, pretty). Output can be pretty, compact
//! or json.

use serde::Deserialize;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Logging configuration from the `[logging]` table of config.toml.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,
    /// Output format: pretty, compact, json
    pub format: String,
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Initializes the global subscriber.
///
/// Only the first call installs anything; later calls are no-ops and their
/// level and format are ignored. Call it once, after the config is loaded.
///
/// ```ignore
/// let config = pppoe_smac::config::load("config.toml")?;
/// init_logging(Some(&config.logging));
/// ```
pub fn init_logging(config: Option<&LogConfig>) {
    let filter = build_filter(config);
    let format = config.map(|c| c.format.as_str()).unwrap_or("pretty");

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match format {
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        "compact" => tracing_subscriber::fmt::layer().compact().boxed(),
        _ => tracing_subscriber::fmt::layer().boxed(),
    };

    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init();
}

fn build_filter(config: Option<&LogConfig>) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    match config {
        Some(cfg) => EnvFilter::new(parse_level(&cfg.level).as_str()),
        None => EnvFilter::new("info"),
    }
}

/// Parses a log level string, falling back to info.
fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("TRACE"), Level::TRACE);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }

    #[test]
    fn test_init_logging_second_call_is_noop() {
        let json = LogConfig {
            level: "debug".into(),
            format: "json".into(),
        };
        init_logging(Some(&LogConfig::new()));
        init_logging(Some(&json));
        init_logging(None);
    }

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "pretty");
    }

    #[test]
    fn test_log_config_partial_toml() {
        let config: LogConfig = toml::from_str(r#"format = "json""#).unwrap();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "json");
    }
}
