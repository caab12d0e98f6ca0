//! Database models and queries.

pub mod models;
pub mod prefill;
pub mod queries;

pub use models::*;
pub use queries::*;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::error::MarkResult;

/// Idempotent schema. Column names match files written by earlier releases so
/// exported databases can be imported again.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS bookmarks (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    faviconUrl TEXT,
    clicks INTEGER DEFAULT 0,
    createdAt INTEGER NOT NULL,
    updatedAt INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_bookmarks_title ON bookmarks(title COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS idx_bookmarks_url ON bookmarks(url COLLATE NOCASE);

CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bookmark_id TEXT NOT NULL,
    tag_name TEXT NOT NULL,
    FOREIGN KEY (bookmark_id) REFERENCES bookmarks(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_tags_bookmark_id ON tags(bookmark_id);
CREATE INDEX IF NOT EXISTS idx_tags_tag_name ON tags(tag_name COLLATE NOCASE);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Open (creating if needed) the database file at `path`.
pub async fn connect(path: &Path) -> MarkResult<SqlitePool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// A private in-memory database on a single long-lived connection.
pub async fn connect_in_memory() -> MarkResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    // Every connection would get its own empty database, so keep exactly one
    // and never let the pool recycle it.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create tables, seed default settings, and optionally prefill bookmarks.
pub async fn initialize(pool: &SqlitePool, prefill: bool) -> MarkResult<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;

    let settings_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM settings")
        .fetch_one(pool)
        .await?;

    if settings_count == 0 {
        sqlx::query("INSERT INTO settings (key, value) VALUES (?, ?)")
            .bind(AUTO_DETECT_CLIPBOARD_LINKS)
            .bind("true")
            .execute(pool)
            .await?;
    }

    if prefill {
        prefill::prefill_if_empty(pool).await?;
    }

    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = connect_in_memory().await.unwrap();
    initialize(&pool, false).await.unwrap();
    pool
}

/// File-backed pool inside `dir`, as the server runs it. Needed wherever a
/// snapshot is written.
#[cfg(test)]
pub(crate) async fn file_test_pool(dir: &Path) -> SqlitePool {
    let pool = connect(&dir.join("store.sqlite")).await.unwrap();
    initialize(&pool, false).await.unwrap();
    pool
}
