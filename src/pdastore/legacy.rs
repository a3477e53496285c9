//! # Legacy Migration
//!
//! Before records lived on the drive, bookmarks were rows in a SQLite
//! database:
//!
//! ```text
//! bookmarks(profileId, url, title, pinned, createdAt, tags, notes, ...)
//! ```
//!
//! [`migrate_legacy`] copies every row into the drive namespace as a private
//! record. It is safe to run repeatedly: a row always maps to the same path,
//! and the legacy `createdAt` is carried over, so a second run rewrites
//! identical documents.

use crate::drive::Drive;
use crate::error::Result;
use crate::model::{Record, Visibility};
use crate::store::RecordStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One row of the prior store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyBookmark {
    pub url: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub migrated: usize,
    pub skipped: usize,
}

/// Anything that can hand over legacy bookmarks.
#[async_trait]
pub trait LegacySource: Send + Sync {
    async fn load(&self) -> Result<Vec<LegacyBookmark>>;
}

#[async_trait]
impl LegacySource for Vec<LegacyBookmark> {
    async fn load(&self) -> Result<Vec<LegacyBookmark>> {
        Ok(self.clone())
    }
}

/// Reads the `bookmarks` table of a legacy SQLite database.
///
/// A missing database file or table means there is nothing to migrate.
pub struct SqliteLegacySource {
    db_path: PathBuf,
}

impl SqliteLegacySource {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

#[async_trait]
impl LegacySource for SqliteLegacySource {
    async fn load(&self) -> Result<Vec<LegacyBookmark>> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || read_bookmarks(&db_path)).await?
    }
}

fn read_bookmarks(db_path: &Path) -> Result<Vec<LegacyBookmark>> {
    if !db_path.exists() {
        debug!(path = %db_path.display(), "no legacy database");
        return Ok(Vec::new());
    }

    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let table: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'bookmarks'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    if table.is_none() {
        debug!(path = %db_path.display(), "legacy database has no bookmarks table");
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(
        "SELECT url, title, notes, createdAt FROM bookmarks ORDER BY createdAt, url",
    )?;
    let rows = stmt.query_map([], |row| {
        let created: Option<i64> = row.get(3)?;
        Ok(LegacyBookmark {
            url: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
            title: row.get(1)?,
            notes: row.get(2)?,
            created_at: created.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        })
    })?;

    let mut bookmarks = Vec::new();
    for row in rows {
        bookmarks.push(row?);
    }
    Ok(bookmarks)
}

/// Copy every legacy bookmark into `store` as a private record.
pub async fn migrate_legacy<D, L>(store: &RecordStore<D>, source: &L) -> Result<MigrationReport>
where
    D: Drive,
    L: LegacySource + ?Sized,
{
    let mut report = MigrationReport::default();

    for legacy in source.load().await? {
        if legacy.url.trim().is_empty() {
            report.skipped += 1;
            continue;
        }
        let path = store
            .import(Record {
                href: legacy.url,
                title: legacy.title,
                description: legacy.notes,
                visibility: Visibility::Private,
                created_at: legacy.created_at,
                updated_at: None,
            })
            .await?;
        debug!(path = %path, "migrated legacy bookmark");
        report.migrated += 1;
    }

    info!(
        migrated = report.migrated,
        skipped = report.skipped,
        "legacy migration finished"
    );
    Ok(report)
}
