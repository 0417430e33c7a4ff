//! SQLite-backed [`Store`] implementation.
//!
//! Maps each [`Store`] operation onto the `versions`, `comparisons`, and
//! `connector_changes` tables created by [`crate::migrate`]. Timestamps are
//! stored as unix seconds.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use trino_release_diff_core::models::{CacheEntry, ConnectorChangeRecord};
use trino_release_diff_core::store::Store;

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn from_ts(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ConnectorChangeRecord> {
    let change_type: String = row.get("change_type");
    let impact: Option<String> = row.get("impact");
    Ok(ConnectorChangeRecord {
        connector_name: row.get("connector_name"),
        version: row.get("version"),
        change_type: change_type.parse()?,
        description: row.get("description"),
        impact: impact.map(|i| i.parse()).transpose()?,
        created_at: from_ts(row.get("created_at")),
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_comparison(&self, from: &str, to: &str) -> Result<Option<CacheEntry>> {
        let row = sqlx::query(
            r#"
            SELECT from_version, to_version, comparison_data, created_at, expires_at
            FROM comparisons
            WHERE from_version = ? AND to_version = ?
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let data: Option<String> = row.get("comparison_data");
            CacheEntry {
                from_version: row.get("from_version"),
                to_version: row.get("to_version"),
                comparison_data: data.unwrap_or_default(),
                created_at: from_ts(row.get("created_at")),
                expires_at: from_ts(row.get("expires_at")),
            }
        }))
    }

    async fn put_comparison(&self, entry: &CacheEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comparisons (from_version, to_version, comparison_data, created_at, expires_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(from_version, to_version) DO UPDATE SET
                comparison_data = excluded.comparison_data,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(&entry.from_version)
        .bind(&entry.to_version)
        .bind(&entry.comparison_data)
        .bind(entry.created_at.timestamp())
        .bind(entry.expires_at.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn record_change(&self, record: &ConnectorChangeRecord) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM connector_changes
            WHERE connector_name = ? AND version = ? AND change_type = ? AND description = ?
            LIMIT 1
            "#,
        )
        .bind(&record.connector_name)
        .bind(&record.version)
        .bind(record.change_type.as_str())
        .bind(&record.description)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO connector_changes (connector_name, version, change_type, description, impact, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.connector_name)
        .bind(&record.version)
        .bind(record.change_type.as_str())
        .bind(&record.description)
        .bind(record.impact.map(|i| i.as_str()))
        .bind(record.created_at.timestamp())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn changes_for_connector(&self, connector: &str) -> Result<Vec<ConnectorChangeRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT connector_name, version, change_type, description, impact, created_at
            FROM connector_changes
            WHERE connector_name = ?
            ORDER BY id ASC
            "#,
        )
        .bind(connector)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                record_from_row(row)
                    .with_context(|| format!("corrupt connector_changes row for {}", connector))
            })
            .collect()
    }

    async fn connector_names(&self) -> Result<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT connector_name FROM connector_changes ORDER BY connector_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    async fn upsert_version(&self, version: &str) -> Result<bool> {
        let result =
            sqlx::query("INSERT OR IGNORE INTO versions (version, created_at) VALUES (?, ?)")
                .bind(version)
                .bind(Utc::now().timestamp())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_versions(&self) -> Result<Vec<String>> {
        let versions: Vec<String> = sqlx::query_scalar("SELECT version FROM versions")
            .fetch_all(&self.pool)
            .await?;
        Ok(versions)
    }
}
