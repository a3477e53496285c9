//! # Query Façade
//!
//! Finds stored files for a record type. A record may live under either
//! root, so every lookup covers both; results carry the path, and the path
//! prefix tells the caller which root the file came from.

use crate::drive::Drive;
use crate::error::Result;
use crate::model::{FileEntry, RecordType, StoredFile};
use crate::router;
use crate::slug::to_slug;

/// Every file of this type, private and public, sorted by path.
pub async fn list_files<D: Drive + ?Sized>(
    drive: &D,
    record_type: &RecordType,
) -> Result<Vec<FileEntry>> {
    drive.query(&router::query_patterns(record_type)).await
}

/// The file holding `href`, if any. Private is probed first; only one of
/// the two candidates should exist at a time.
pub async fn find_file<D: Drive + ?Sized>(
    drive: &D,
    record_type: &RecordType,
    href: &str,
) -> Result<Option<FileEntry>> {
    let slug = to_slug(href);
    for candidate in router::resolve_both_paths(record_type, &slug) {
        let found = drive.query(std::slice::from_ref(&candidate)).await?;
        if let Some(entry) = found.into_iter().next() {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

/// Read a queried entry. A file that vanished since the query is `None`.
pub async fn read_file<D: Drive + ?Sized>(
    drive: &D,
    entry: &FileEntry,
) -> Result<Option<StoredFile>> {
    match drive.read_file(&entry.path).await {
        Ok(content) => Ok(Some(StoredFile {
            path: entry.path.clone(),
            content,
        })),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
