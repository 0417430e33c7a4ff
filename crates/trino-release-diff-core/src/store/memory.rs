//! In-memory [`Store`] implementation for testing.
//!
//! Uses `HashMap` and `Vec` behind `std::sync::RwLock` for thread safety.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{CacheEntry, ConnectorChangeRecord};

use super::Store;

/// In-memory store for tests and embedding.
pub struct InMemoryStore {
    comparisons: RwLock<HashMap<(String, String), CacheEntry>>,
    changes: RwLock<Vec<ConnectorChangeRecord>>,
    versions: RwLock<Vec<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            comparisons: RwLock::new(HashMap::new()),
            changes: RwLock::new(Vec::new()),
            versions: RwLock::new(Vec::new()),
        }
    }

    /// Number of cached comparisons, expired ones included.
    pub fn comparison_count(&self) -> usize {
        self.comparisons.read().map(|c| c.len()).unwrap_or(0)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_comparison(&self, from: &str, to: &str) -> Result<Option<CacheEntry>> {
        let comparisons = self.comparisons.read().map_err(poisoned)?;
        Ok(comparisons
            .get(&(from.to_string(), to.to_string()))
            .cloned())
    }

    async fn put_comparison(&self, entry: &CacheEntry) -> Result<()> {
        let mut comparisons = self.comparisons.write().map_err(poisoned)?;
        let key = (entry.from_version.clone(), entry.to_version.clone());
        match comparisons.get_mut(&key) {
            Some(existing) => {
                existing.comparison_data = entry.comparison_data.clone();
                existing.expires_at = entry.expires_at;
            }
            None => {
                comparisons.insert(key, entry.clone());
            }
        }
        Ok(())
    }

    async fn record_change(&self, record: &ConnectorChangeRecord) -> Result<bool> {
        let mut changes = self.changes.write().map_err(poisoned)?;
        let exists = changes.iter().any(|c| {
            c.connector_name == record.connector_name
                && c.version == record.version
                && c.change_type == record.change_type
                && c.description == record.description
        });
        if exists {
            return Ok(false);
        }
        changes.push(record.clone());
        Ok(true)
    }

    async fn changes_for_connector(&self, connector: &str) -> Result<Vec<ConnectorChangeRecord>> {
        let changes = self.changes.read().map_err(poisoned)?;
        Ok(changes
            .iter()
            .filter(|c| c.connector_name == connector)
            .cloned()
            .collect())
    }

    async fn connector_names(&self) -> Result<Vec<String>> {
        let changes = self.changes.read().map_err(poisoned)?;
        let names: BTreeSet<String> = changes.iter().map(|c| c.connector_name.clone()).collect();
        Ok(names.into_iter().collect())
    }

    async fn upsert_version(&self, version: &str) -> Result<bool> {
        let mut versions = self.versions.write().map_err(poisoned)?;
        if versions.iter().any(|v| v == version) {
            return Ok(false);
        }
        versions.push(version.to_string());
        Ok(true)
    }

    async fn list_versions(&self) -> Result<Vec<String>> {
        Ok(self.versions.read().map_err(poisoned)?.clone())
    }
}
