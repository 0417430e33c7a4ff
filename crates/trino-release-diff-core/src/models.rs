//! Core data models used throughout Trino Release Diff.
//!
//! These types represent the change groups extracted from release notes,
//! the cached comparison payload, and the per-connector change records
//! derived from it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Changes from one release, optionally scoped to a single connector.
///
/// Items keep the order in which they appear in the release-note document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionItemGroup {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<String>,
    pub items: Vec<String>,
}

impl VersionItemGroup {
    pub fn new(version: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            version: version.into(),
            connector: None,
            items,
        }
    }

    pub fn for_connector(
        version: impl Into<String>,
        connector: impl Into<String>,
        items: Vec<String>,
    ) -> Self {
        Self {
            version: version.into(),
            connector: Some(connector.into()),
            items,
        }
    }
}

/// Everything extracted from a single release-note document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionChanges {
    pub version: String,
    pub breaking_changes: Vec<VersionItemGroup>,
    pub new_features: Vec<VersionItemGroup>,
}

impl VersionChanges {
    pub fn is_empty(&self) -> bool {
        self.breaking_changes.is_empty() && self.new_features.is_empty()
    }
}

/// Aggregate of all change groups between two versions.
///
/// This is the payload stored in the comparison cache, serialized as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    #[serde(default)]
    pub breaking_changes: Vec<VersionItemGroup>,
    #[serde(default)]
    pub new_features: Vec<VersionItemGroup>,
    #[serde(default)]
    pub fixed_issues: Vec<VersionItemGroup>,
    #[serde(default)]
    pub performance_improvements: Vec<VersionItemGroup>,
}

impl ComparisonResult {
    /// Appends one version's groups, preserving traversal order.
    pub fn merge(&mut self, changes: VersionChanges) {
        self.breaking_changes.extend(changes.breaking_changes);
        self.new_features.extend(changes.new_features);
    }

    pub fn is_empty(&self) -> bool {
        self.breaking_changes.is_empty()
            && self.new_features.is_empty()
            && self.fixed_issues.is_empty()
            && self.performance_improvements.is_empty()
    }
}

/// A cached comparison row keyed by `(from_version, to_version)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub from_version: String,
    pub to_version: String,
    /// JSON-encoded [`ComparisonResult`].
    pub comparison_data: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// An entry is usable only while `expires_at` is strictly in the future.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    pub fn decode(&self) -> serde_json::Result<ComparisonResult> {
        serde_json::from_str(&self.comparison_data)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Breaking,
    Feature,
    Other,
}

impl ChangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::Breaking => "breaking",
            ChangeType::Feature => "feature",
            ChangeType::Other => "other",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breaking" => Ok(ChangeType::Breaking),
            "feature" => Ok(ChangeType::Feature),
            "other" => Ok(ChangeType::Other),
            other => Err(anyhow::anyhow!("unknown change type: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub fn as_str(self) -> &'static str {
        match self {
            Impact::High => "high",
            Impact::Medium => "medium",
            Impact::Low => "low",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Impact {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Impact::High),
            "medium" => Ok(Impact::Medium),
            "low" => Ok(Impact::Low),
            other => Err(anyhow::anyhow!("unknown impact: '{}'", other)),
        }
    }
}

/// A single change attributed to a connector.
///
/// Records are append-only: an exact `(connector_name, version, change_type,
/// description)` match is never inserted twice and existing rows are never
/// updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorChangeRecord {
    pub connector_name: String,
    pub version: String,
    pub change_type: ChangeType,
    pub description: String,
    pub impact: Option<Impact>,
    pub created_at: DateTime<Utc>,
}

/// One entry in a [`ConnectorChanges`] lookup response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorChangeEntry {
    pub version: String,
    pub description: String,
    pub impact: Option<Impact>,
    /// `YYYY-MM-DD` of when the record was first stored.
    pub date: Option<String>,
}

impl From<&ConnectorChangeRecord> for ConnectorChangeEntry {
    fn from(record: &ConnectorChangeRecord) -> Self {
        Self {
            version: record.version.clone(),
            description: record.description.clone(),
            impact: record.impact,
            date: Some(record.created_at.format("%Y-%m-%d").to_string()),
        }
    }
}

/// All stored changes for one connector, split by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorChanges {
    pub connector: String,
    pub breaking_changes: Vec<ConnectorChangeEntry>,
    pub features: Vec<ConnectorChangeEntry>,
}

impl ConnectorChanges {
    /// Builds the lookup response from stored records. `other` records are
    /// not listed.
    pub fn from_records(connector: &str, records: &[ConnectorChangeRecord]) -> Self {
        let mut changes = Self {
            connector: connector.to_string(),
            breaking_changes: Vec::new(),
            features: Vec::new(),
        };
        for record in records {
            match record.change_type {
                ChangeType::Breaking => changes.breaking_changes.push(record.into()),
                ChangeType::Feature => changes.features.push(record.into()),
                ChangeType::Other => {}
            }
        }
        changes
    }
}
