//! Logging initialization.
//!
//! All diagnostics go through `tracing` macros with structured fields
//! (`version`, `stage`, `status`, ...). The subscriber writes to stderr so
//! that command output on stdout stays machine-readable.
//!
//! The level comes from `[logging].level` unless `RUST_LOG` is set, in which
//! case the environment wins.
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// `text` or `json`.
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_format() -> String {
    "text".to_string()
}

impl LoggingConfig {
    fn filter(&self) -> Result<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.level)
                .map_err(|e| anyhow!("invalid logging.level '{}': {}", self.level, e)),
        }
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = config.filter()?;

    match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
        _ => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()?,
    }

    Ok(())
}
