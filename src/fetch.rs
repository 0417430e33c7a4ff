//! Release-note fetching.
//!
//! Each Trino release has one HTML page whose URL is derived from a template
//! such as `https://trino.io/docs/current/release/release-{version}.html`.
//! Every failure is reported as a [`FetchError`]; the orchestrator skips the
//! version and moves on.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::{FetchConfig, VERSION_PLACEHOLDER};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Any non-2xx response.
    #[error("release notes not found (HTTP {status})")]
    NotFound { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Source of release-note documents, one per version.
#[async_trait]
pub trait ReleaseNoteFetcher: Send + Sync {
    /// URL of the release notes for `version`.
    fn url_for(&self, version: &str) -> String;

    /// Retrieves the raw document body for `version`.
    async fn fetch(&self, version: &str) -> Result<String, FetchError>;
}

/// Fetches release notes over HTTP with a fixed per-request timeout.
pub struct HttpFetcher {
    client: Client,
    url_template: String,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            url_template: config.url_template.clone(),
        })
    }
}

#[async_trait]
impl ReleaseNoteFetcher for HttpFetcher {
    fn url_for(&self, version: &str) -> String {
        self.url_template.replace(VERSION_PLACEHOLDER, version)
    }

    async fn fetch(&self, version: &str) -> Result<String, FetchError> {
        let url = self.url_for(version);
        debug!(version, url = %url, "fetching release notes");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::NotFound {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
