//! CLI entry points.
//!
//! Each `run_*` function backs one `trd` subcommand and prints to stdout.
//! Diagnostics go to the log on stderr.

use anyhow::Result;
use std::sync::Arc;

use trino_release_diff_core::models::{ConnectorChangeEntry, VersionItemGroup};
use trino_release_diff_core::store::Store;
use trino_release_diff_core::version::sort_newest_first;

use crate::compare::{ComparisonService, VersionOutcome};
use crate::config::Config;
use crate::connectors;
use crate::db;
use crate::sqlite_store::SqliteStore;

async fn open_store(config: &Config) -> Result<Arc<SqliteStore>> {
    let pool = db::connect(config).await?;
    Ok(Arc::new(SqliteStore::new(pool)))
}

pub async fn run_compare(config: &Config, from: &str, to: &str, json: bool) -> Result<()> {
    let store = open_store(config).await?;
    let service = ComparisonService::from_config(config, store.clone())?;

    let comparison = service.compare_detailed(from, to).await?;
    let recorded = connectors::record_connector_changes(store.as_ref(), &comparison.result).await;

    if json {
        let body = serde_json::json!({
            "from_version": comparison.from_version,
            "to_version": comparison.to_version,
            "changes": comparison.result,
            "connectors": connectors::group_by_connector(&comparison.result),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        store.pool().close().await;
        return Ok(());
    }

    let source = if comparison.from_cache { " (cached)" } else { "" };
    println!(
        "compare {} -> {}{}",
        comparison.from_version, comparison.to_version, source
    );
    if !comparison.from_cache {
        let skipped: Vec<&VersionOutcome> =
            comparison.outcomes.iter().filter(|o| o.is_skipped()).collect();
        println!(
            "  releases read: {}",
            comparison.outcomes.len() - skipped.len()
        );
        println!("  releases skipped: {}", skipped.len());
        for outcome in skipped {
            if let VersionOutcome::Skipped { version, reason } = outcome {
                println!("    {}: {}", version, reason);
            }
        }
    }
    println!();

    print_groups("Breaking changes", &comparison.result.breaking_changes);
    print_groups("New features", &comparison.result.new_features);

    println!(
        "connector changes recorded: {} new, {} existing",
        recorded.inserted, recorded.existing
    );
    println!("ok");

    store.pool().close().await;
    Ok(())
}

fn print_groups(title: &str, groups: &[VersionItemGroup]) {
    println!("--- {} ({}) ---", title, groups.len());
    for group in groups {
        match &group.connector {
            Some(connector) => println!("[{}] {}", group.version, connector),
            None => println!("[{}]", group.version),
        }
        for item in &group.items {
            println!("  - {}", item);
        }
    }
    println!();
}

pub async fn run_connector(config: &Config, name: &str) -> Result<()> {
    let store = open_store(config).await?;
    let changes = connectors::lookup_by_connector(store.as_ref(), name).await?;

    println!("--- {} ---", changes.connector);
    print_entries("Breaking changes", &changes.breaking_changes);
    print_entries("Features", &changes.features);

    store.pool().close().await;
    Ok(())
}

fn print_entries(title: &str, entries: &[ConnectorChangeEntry]) {
    println!("{} ({}):", title, entries.len());
    for entry in entries {
        let impact = entry.impact.map(|i| i.as_str()).unwrap_or("-");
        println!("  [{}] ({}) {}", entry.version, impact, entry.description);
    }
}

pub async fn run_versions(config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    let mut versions = store.list_versions().await?;
    sort_newest_first(&mut versions);

    for version in &versions {
        println!("{}", version);
    }

    store.pool().close().await;
    Ok(())
}
