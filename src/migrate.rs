//! Schema creation and seeding.
//!
//! All statements are idempotent; `trd init` may be run any number of times.

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

use trino_release_diff_core::version::KNOWN_VERSIONS;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate_pool(&pool).await?;
    seed_versions(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Creates all tables and indexes on an open pool.
pub async fn migrate_pool(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS versions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            version TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One row per (from, to); rewritten in place when the entry is refreshed.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comparisons (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            from_version TEXT NOT NULL,
            to_version TEXT NOT NULL,
            comparison_data TEXT,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL,
            UNIQUE(from_version, to_version)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS connector_changes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            connector_name TEXT NOT NULL,
            version TEXT NOT NULL,
            change_type TEXT NOT NULL,
            description TEXT NOT NULL,
            impact TEXT,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_connector_changes_name ON connector_changes(connector_name)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Inserts [`KNOWN_VERSIONS`] when the version registry is empty.
///
/// Returns the number of versions inserted.
pub async fn seed_versions(pool: &SqlitePool) -> Result<usize> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM versions")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(0);
    }

    let now = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await?;
    for version in KNOWN_VERSIONS {
        sqlx::query("INSERT OR IGNORE INTO versions (version, created_at) VALUES (?, ?)")
            .bind(*version)
            .bind(now)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    info!(count = KNOWN_VERSIONS.len(), "seeded initial versions");
    Ok(KNOWN_VERSIONS.len())
}
