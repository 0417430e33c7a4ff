//! Comparison orchestration.
//!
//! Coordinates the full flow for a `(from, to)` pair: order the versions,
//! consult the cache, fetch and extract every release in `(from, to]`, and
//! write the aggregate back to the cache.
//!
//! Failures for a single release never abort the comparison. Each release
//! ends up as a [`VersionOutcome`], either extracted or skipped with a
//! [`SkipReason`]. Cache read and write failures are logged and otherwise
//! ignored: a failed read falls through to a fresh scrape and a failed write
//! still returns the result.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info, warn};

use trino_release_diff_core::extract::{ExtractError, Extractor};
use trino_release_diff_core::models::{CacheEntry, ComparisonResult, VersionChanges};
use trino_release_diff_core::store::Store;
use trino_release_diff_core::version;

use crate::config::Config;
use crate::fetch::{FetchError, HttpFetcher, ReleaseNoteFetcher};

#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// Bad request parameters. Nothing was fetched or cached.
    #[error("{0}")]
    InvalidInput(String),

    #[error("extractor setup failed: {0}")]
    Extractor(#[from] ExtractError),
}

/// Why a release contributed nothing to a comparison.
#[derive(Debug, thiserror::Error)]
pub enum SkipReason {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("extraction failed: {0}")]
    Parse(#[from] ExtractError),
}

/// What happened to one release during a comparison.
#[derive(Debug)]
pub enum VersionOutcome {
    Extracted {
        version: String,
        breaking_groups: usize,
        feature_groups: usize,
    },
    Skipped {
        version: String,
        reason: SkipReason,
    },
}

impl VersionOutcome {
    pub fn version(&self) -> &str {
        match self {
            VersionOutcome::Extracted { version, .. } | VersionOutcome::Skipped { version, .. } => {
                version
            }
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, VersionOutcome::Skipped { .. })
    }
}

/// A finished comparison with bookkeeping about how it was produced.
#[derive(Debug)]
pub struct Comparison {
    /// The older of the two requested versions.
    pub from_version: String,
    /// The newer of the two requested versions.
    pub to_version: String,
    pub result: ComparisonResult,
    pub from_cache: bool,
    /// One entry per release visited. Empty when served from cache.
    pub outcomes: Vec<VersionOutcome>,
}

/// Compares Trino releases using an injected store and fetcher.
pub struct ComparisonService {
    store: Arc<dyn Store>,
    fetcher: Arc<dyn ReleaseNoteFetcher>,
    cache_ttl: Duration,
    max_range: u64,
}

impl ComparisonService {
    pub fn new(
        store: Arc<dyn Store>,
        fetcher: Arc<dyn ReleaseNoteFetcher>,
        cache_ttl: Duration,
        max_range: u64,
    ) -> Self {
        Self {
            store,
            fetcher,
            cache_ttl,
            max_range,
        }
    }

    /// Builds a service that fetches over HTTP as configured.
    pub fn from_config(config: &Config, store: Arc<dyn Store>) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        let cache_ttl = Duration::try_days(config.cache.ttl_days).ok_or_else(|| {
            anyhow::anyhow!("cache.ttl_days out of range: {}", config.cache.ttl_days)
        })?;
        Ok(Self::new(
            store,
            Arc::new(fetcher),
            cache_ttl,
            config.compare.max_range,
        ))
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Returns the aggregate of all changes introduced after `from` up to
    /// and including `to`. The arguments may be given in either order.
    pub async fn compare(&self, from: &str, to: &str) -> Result<ComparisonResult, CompareError> {
        Ok(self.compare_detailed(from, to).await?.result)
    }

    /// Like [`compare`](Self::compare), but also reports where the result
    /// came from and what happened to each release.
    pub async fn compare_detailed(&self, from: &str, to: &str) -> Result<Comparison, CompareError> {
        let (from, to) = (from.trim(), to.trim());
        if from.is_empty() || to.is_empty() {
            return Err(CompareError::InvalidInput(
                "Both from_version and to_version are required".to_string(),
            ));
        }

        let (older, newer) = version::chronological(from, to);
        if older != from {
            info!(from, to, "swapping versions to keep chronological order");
        }

        let releases = version::versions_after(older, newer, self.max_range)
            .map_err(|e| CompareError::InvalidInput(e.to_string()))?;

        if let Some(result) = self.cached(older, newer).await {
            return Ok(Comparison {
                from_version: older.to_string(),
                to_version: newer.to_string(),
                result,
                from_cache: true,
                outcomes: Vec::new(),
            });
        }

        self.register_versions(&[older, newer]).await;

        info!(from = older, to = newer, count = releases.len(), "fetching release notes");
        let extractor = Extractor::new()?;
        let mut result = ComparisonResult::default();
        let mut outcomes = Vec::with_capacity(releases.len());

        for release in releases {
            match self.process_version(&extractor, &release).await {
                Ok(changes) => {
                    outcomes.push(VersionOutcome::Extracted {
                        version: release,
                        breaking_groups: changes.breaking_changes.len(),
                        feature_groups: changes.new_features.len(),
                    });
                    result.merge(changes);
                }
                Err(reason) => outcomes.push(VersionOutcome::Skipped {
                    version: release,
                    reason,
                }),
            }
        }

        // Empty results are cached too, so known-empty ranges are not re-scraped.
        self.write_cache(older, newer, &result).await;

        Ok(Comparison {
            from_version: older.to_string(),
            to_version: newer.to_string(),
            result,
            from_cache: false,
            outcomes,
        })
    }

    async fn process_version(
        &self,
        extractor: &Extractor,
        release: &str,
    ) -> Result<VersionChanges, SkipReason> {
        let body = self.fetcher.fetch(release).await.map_err(|e| {
            warn!(
                version = release,
                stage = "fetch",
                url = %self.fetcher.url_for(release),
                error = %e,
                "skipping release"
            );
            e
        })?;

        let changes = extractor.extract(release, &body).map_err(|e| {
            warn!(version = release, stage = "extract", error = %e, "skipping release");
            e
        })?;

        info!(
            version = release,
            breaking = changes.breaking_changes.len(),
            features = changes.new_features.len(),
            "extracted release notes"
        );
        Ok(changes)
    }

    async fn cached(&self, from: &str, to: &str) -> Option<ComparisonResult> {
        let entry = match self.store.get_comparison(from, to).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                info!(from, to, "no cached comparison");
                return None;
            }
            Err(e) => {
                warn!(from, to, stage = "cache_read", error = %e, "cache lookup failed");
                return None;
            }
        };

        if !entry.is_valid(Utc::now()) {
            info!(from, to, expired_at = %entry.expires_at, "cached comparison expired");
            return None;
        }

        match entry.decode() {
            Ok(result) => {
                info!(from, to, "using cached comparison");
                Some(result)
            }
            Err(e) => {
                warn!(from, to, stage = "cache_read", error = %e, "cached payload unreadable");
                None
            }
        }
    }

    async fn write_cache(&self, from: &str, to: &str, result: &ComparisonResult) {
        let comparison_data = match serde_json::to_string(result) {
            Ok(data) => data,
            Err(e) => {
                error!(from, to, stage = "cache_write", error = %e, "could not encode comparison");
                return;
            }
        };

        let now = Utc::now();
        let Some(expires_at) = now.checked_add_signed(self.cache_ttl) else {
            error!(
                from,
                to,
                stage = "cache_write",
                ttl = %self.cache_ttl,
                "cache expiry out of range"
            );
            return;
        };
        let entry = CacheEntry {
            from_version: from.to_string(),
            to_version: to.to_string(),
            comparison_data,
            created_at: now,
            expires_at,
        };

        match self.store.put_comparison(&entry).await {
            Ok(()) => info!(from, to, "cached comparison"),
            Err(e) => error!(
                from,
                to,
                stage = "cache_write",
                error = %e,
                "could not cache comparison"
            ),
        }
    }

    async fn register_versions(&self, versions: &[&str]) {
        for v in versions {
            if let Err(e) = self.store.upsert_version(v).await {
                warn!(version = *v, error = %e, "could not register version");
            }
        }
    }
}
