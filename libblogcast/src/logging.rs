//! Logging setup shared by the Blogcast binaries
//!
//! All diagnostics go to stderr so stdout stays reserved for publish
//! results. Supported output styles:
//! - Text (plain, for CI logs and piping)
//! - JSON (one object per line)
//! - Pretty (colored, for development)
//!
//! # Examples
//!
//! ```no_run
//! use libblogcast::logging::{LogFormat, LoggingConfig};
//!
//! LoggingConfig::new(LogFormat::Json, "info".to_string(), false).init();
//!
//! // Or honour BLOGCAST_LOG_FORMAT / BLOGCAST_LOG_LEVEL
//! libblogcast::logging::init_default();
//! ```

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log format
pub const LOG_FORMAT_ENV: &str = "BLOGCAST_LOG_FORMAT";

/// Environment variable selecting the minimum log level
pub const LOG_LEVEL_ENV: &str = "BLOGCAST_LOG_LEVEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text output (no colors)
    #[default]
    Text,
    /// Machine-parseable JSON (one JSON object per line)
    Json,
    /// Pretty-printed with colors
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    pub verbose: bool,
}

impl LoggingConfig {
    /// Create a new logging configuration
    ///
    /// # Arguments
    ///
    /// * `format` - Log output format (text, json, or pretty)
    /// * `level` - Minimum log level or filter directive (e.g. `warn,libblogcast=debug`)
    /// * `verbose` - Lower the default level to debug
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Read format and level from the environment
    ///
    /// Unknown formats fall back to text; a missing level falls back to `warn`
    /// so a publish run only reports problems unless asked otherwise.
    pub fn from_env(verbose: bool) -> Self {
        let format = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "warn".to_string());
        Self::new(format, level, verbose)
    }

    /// Filter directive actually applied
    ///
    /// `RUST_LOG` wins over everything, then `--verbose`, then the level.
    pub fn directive(&self) -> String {
        if let Ok(directive) = std::env::var(EnvFilter::DEFAULT_ENV) {
            if !directive.trim().is_empty() {
                return directive;
            }
        }
        if self.verbose {
            "debug".to_string()
        } else {
            self.level.clone()
        }
    }

    /// Install the global subscriber
    ///
    /// Returns `false` when a subscriber was already installed, in which case
    /// the existing one keeps running.
    pub fn init(&self) -> bool {
        let filter = EnvFilter::try_new(self.directive()).unwrap_or_else(|_| EnvFilter::new("warn"));

        let installed = match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .flatten_event(true)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false)
                .with_level(true)
                .try_init(),
        };

        installed.is_ok()
    }
}

/// Initialize logging from `BLOGCAST_LOG_FORMAT` and `BLOGCAST_LOG_LEVEL`
///
/// ```bash
/// BLOGCAST_LOG_FORMAT=json BLOGCAST_LOG_LEVEL=debug blogcast-publish post.md
/// ```
pub fn init_default() -> bool {
    LoggingConfig::from_env(false).init()
}
