//! Connector attribution for comparison results.
//!
//! Runs the connector classifier over every breaking and feature item of a
//! [`ComparisonResult`], appending one [`ConnectorChangeRecord`] per item to
//! the store, and answers per-connector lookups from those records.
//!
//! Breaking items are recorded with impact `high`, feature items with
//! impact `medium`.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error};

use trino_release_diff_core::classify::identify_connector;
use trino_release_diff_core::models::{
    ChangeType, ComparisonResult, ConnectorChangeRecord, ConnectorChanges, Impact,
    VersionItemGroup,
};
use trino_release_diff_core::store::Store;

/// Counts from one [`record_connector_changes`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    pub inserted: usize,
    pub existing: usize,
    pub failed: usize,
}

/// One classified change, as shown in a per-connector grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRef {
    pub version: String,
    pub description: String,
}

/// Changes attributed to one connector within a comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectorBuckets {
    pub breaking_changes: Vec<ChangeRef>,
    pub new_features: Vec<ChangeRef>,
    pub other_changes: Vec<ChangeRef>,
}

fn classified<'a>(
    groups: &'a [VersionItemGroup],
) -> impl Iterator<Item = (String, &'a str, &'a str)> + 'a {
    groups.iter().flat_map(|group| {
        group
            .items
            .iter()
            .map(move |item| (identify_connector(item), group.version.as_str(), item.as_str()))
    })
}

/// Classifies every breaking and feature item of `result`.
pub fn derive_records(
    result: &ComparisonResult,
    now: DateTime<Utc>,
) -> Vec<ConnectorChangeRecord> {
    let breaking = classified(&result.breaking_changes)
        .map(|entry| (entry, ChangeType::Breaking, Impact::High));
    let features = classified(&result.new_features)
        .map(|entry| (entry, ChangeType::Feature, Impact::Medium));

    breaking
        .chain(features)
        .map(|((connector, version, description), change_type, impact)| ConnectorChangeRecord {
            connector_name: connector,
            version: version.to_string(),
            change_type,
            description: description.to_string(),
            impact: Some(impact),
            created_at: now,
        })
        .collect()
}

/// Appends the classified changes of `result` to the store.
///
/// Exact duplicates are left alone. A failure to store one record is logged
/// and does not stop the others.
pub async fn record_connector_changes(
    store: &dyn Store,
    result: &ComparisonResult,
) -> RecordSummary {
    let mut summary = RecordSummary::default();

    for record in derive_records(result, Utc::now()) {
        match store.record_change(&record).await {
            Ok(true) => summary.inserted += 1,
            Ok(false) => summary.existing += 1,
            Err(e) => {
                summary.failed += 1;
                error!(
                    connector = %record.connector_name,
                    version = %record.version,
                    change_type = %record.change_type,
                    error = %e,
                    "could not store connector change"
                );
            }
        }
    }

    debug!(
        inserted = summary.inserted,
        existing = summary.existing,
        failed = summary.failed,
        "recorded connector changes"
    );
    summary
}

/// Groups the items of `result` by classified connector name.
pub fn group_by_connector(result: &ComparisonResult) -> BTreeMap<String, ConnectorBuckets> {
    let mut grouped: BTreeMap<String, ConnectorBuckets> = BTreeMap::new();

    for (connector, version, description) in classified(&result.breaking_changes) {
        grouped.entry(connector).or_default().breaking_changes.push(ChangeRef {
            version: version.to_string(),
            description: description.to_string(),
        });
    }
    for (connector, version, description) in classified(&result.new_features) {
        grouped.entry(connector).or_default().new_features.push(ChangeRef {
            version: version.to_string(),
            description: description.to_string(),
        });
    }

    grouped
}

/// All stored breaking changes and features for `connector`.
pub async fn lookup_by_connector(store: &dyn Store, connector: &str) -> Result<ConnectorChanges> {
    let records = store.changes_for_connector(connector).await?;
    Ok(ConnectorChanges::from_records(connector, &records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use trino_release_diff_core::classify::GENERAL;
    use trino_release_diff_core::store::memory::InMemoryStore;

    fn sample() -> ComparisonResult {
        ComparisonResult {
            breaking_changes: vec![VersionItemGroup::new(
                "402",
                vec!["Removed the Accumulo connector".to_string()],
            )],
            new_features: vec![
                VersionItemGroup::new("403", vec!["Improved query planner".to_string()]),
                VersionItemGroup::for_connector(
                    "403",
                    "BigQuery",
                    vec!["The BigQuery connector now supports views".to_string()],
                ),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_derive_records() {
        let records = derive_records(&sample(), Utc::now());
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].connector_name, "Accumulo");
        assert_eq!(records[0].change_type, ChangeType::Breaking);
        assert_eq!(records[0].impact, Some(Impact::High));
        assert_eq!(records[1].connector_name, GENERAL);
        assert_eq!(records[1].change_type, ChangeType::Feature);
        assert_eq!(records[1].impact, Some(Impact::Medium));
        assert_eq!(records[2].connector_name, "BigQuery");
    }

    #[test]
    fn test_group_by_connector() {
        let grouped = group_by_connector(&sample());
        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped["Accumulo"].breaking_changes[0].version, "402");
        assert_eq!(grouped[GENERAL].new_features.len(), 1);
        assert!(grouped["BigQuery"].other_changes.is_empty());
    }

    #[tokio::test]
    async fn test_record_twice_inserts_once() {
        let store = InMemoryStore::new();
        let first = record_connector_changes(&store, &sample()).await;
        assert_eq!(first.inserted, 3);
        let second = record_connector_changes(&store, &sample()).await;
        assert_eq!(second.inserted, 0);
        assert_eq!(second.existing, 3);

        let accumulo = lookup_by_connector(&store, "Accumulo").await.unwrap();
        assert_eq!(accumulo.breaking_changes.len(), 1);
        assert!(accumulo.features.is_empty());
        assert_eq!(accumulo.breaking_changes[0].impact, Some(Impact::High));
    }
}
