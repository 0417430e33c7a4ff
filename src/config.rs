use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::logging::LoggingConfig;

/// Placeholder substituted with the release number in `fetch.url_template`.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Upper bound on `cache.ttl_days` (about a century).
pub const MAX_TTL_DAYS: i64 = 36_500;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub compare: CompareConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_url_template")]
    pub url_template: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_url_template() -> String {
    "https://trino.io/docs/current/release/release-{version}.html".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    format!("trino-release-diff/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_days")]
    pub ttl_days: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_days: default_ttl_days(),
        }
    }
}

fn default_ttl_days() -> i64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompareConfig {
    /// Upper bound on the number of releases one comparison may fetch.
    #[serde(default = "default_max_range")]
    pub max_range: u64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            max_range: default_max_range(),
        }
    }
}

fn default_max_range() -> u64 {
    250
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

impl Config {
    /// Configuration with defaults everywhere and the database at `db_path`.
    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db: DbConfig {
                path: db_path.into(),
            },
            fetch: FetchConfig::default(),
            cache: CacheConfig::default(),
            compare: CompareConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.fetch.url_template.contains(VERSION_PLACEHOLDER) {
            anyhow::bail!(
                "fetch.url_template must contain '{}': {}",
                VERSION_PLACEHOLDER,
                self.fetch.url_template
            );
        }

        if self.fetch.timeout_secs == 0 {
            anyhow::bail!("fetch.timeout_secs must be > 0");
        }

        if !(1..=MAX_TTL_DAYS).contains(&self.cache.ttl_days) {
            anyhow::bail!(
                "cache.ttl_days must be between 1 and {}, got {}",
                MAX_TTL_DAYS,
                self.cache.ttl_days
            );
        }

        if self.compare.max_range < 1 {
            anyhow::bail!("compare.max_range must be >= 1");
        }

        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => anyhow::bail!(
                "Unknown logging format: '{}'. Must be text or json.",
                other
            ),
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
