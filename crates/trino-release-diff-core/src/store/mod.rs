//! Storage abstraction for Trino Release Diff.
//!
//! The [`Store`] trait covers the three persisted collections: the version
//! registry, the comparison cache, and the append-only connector change
//! records. The orchestrator receives a store handle instead of reaching for
//! global state, so tests can swap in [`memory::InMemoryStore`].
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CacheEntry, ConnectorChangeRecord};

/// Abstract storage backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`get_comparison`](Store::get_comparison) | Read a cached comparison, expired or not |
/// | [`put_comparison`](Store::put_comparison) | Insert or overwrite a cached comparison |
/// | [`record_change`](Store::record_change) | Append a connector change unless an exact copy exists |
/// | [`changes_for_connector`](Store::changes_for_connector) | All records for one connector |
/// | [`connector_names`](Store::connector_names) | Distinct connector names |
/// | [`upsert_version`](Store::upsert_version) | Register a version if unknown |
/// | [`list_versions`](Store::list_versions) | All registered versions |
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns the entry for `(from, to)` without checking expiry.
    async fn get_comparison(&self, from: &str, to: &str) -> Result<Option<CacheEntry>>;

    /// Writes `entry`. An existing row for the same key keeps its
    /// `created_at` and takes the new payload and `expires_at`.
    async fn put_comparison(&self, entry: &CacheEntry) -> Result<()>;

    /// Inserts `record` unless a record with the same connector, version,
    /// change type, and description exists. Returns whether it was inserted.
    async fn record_change(&self, record: &ConnectorChangeRecord) -> Result<bool>;

    /// Records for `connector`, in insertion order.
    async fn changes_for_connector(&self, connector: &str) -> Result<Vec<ConnectorChangeRecord>>;

    /// Distinct connector names, sorted.
    async fn connector_names(&self) -> Result<Vec<String>>;

    /// Registers `version`. Returns `true` if it was not known before.
    async fn upsert_version(&self, version: &str) -> Result<bool>;

    /// All registered versions, in no particular order.
    async fn list_versions(&self) -> Result<Vec<String>>;
}
