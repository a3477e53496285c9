//! # Record Store
//!
//! Add, update, and remove records as sequences of single-path drive
//! operations. The drive guarantees consistency per path only, so every
//! operation is written to be safe to retry.
//!
//! ## Identity
//!
//! A record's path is a pure function of `(visibility, type, slug(href))`.
//! There is no id allocator and no index file: writing to the same path is
//! an upsert, and two files for the same slug can only exist transiently,
//! during a visibility move.
//!
//! ## Visibility Moves
//!
//! When `update` flips visibility it deletes the old file, then writes the
//! new one. A crash between the two leaves the record missing until the
//! update is retried; there is no rollback. A failed delete is logged and
//! ignored so the write still happens.
//!
//! ## Href Changes
//!
//! Changing only the href writes a file under the new slug and leaves the
//! old file in place. Callers that rename records and want the old slug
//! gone must remove it themselves.
//!
//! ## Concurrency
//!
//! Nothing here serializes calls. Concurrent updates to the same href race
//! and the last write wins; operations on different hrefs never interfere.

use crate::codec;
use crate::drive::Drive;
use crate::error::{Result, StoreError};
use crate::model::{NewRecord, Record, RecordPatch, RecordType};
use crate::query;
use crate::router;
use crate::slug::to_slug;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// Store for one record type on one drive.
pub struct RecordStore<D: Drive> {
    drive: Arc<D>,
    record_type: RecordType,
}

impl<D: Drive> Clone for RecordStore<D> {
    fn clone(&self) -> Self {
        Self {
            drive: Arc::clone(&self.drive),
            record_type: self.record_type.clone(),
        }
    }
}

impl<D: Drive> RecordStore<D> {
    pub fn new(drive: Arc<D>, record_type: RecordType) -> Self {
        Self { drive, record_type }
    }

    pub fn bookmarks(drive: Arc<D>) -> Self {
        Self::new(drive, RecordType::bookmark())
    }

    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    pub fn drive(&self) -> &Arc<D> {
        &self.drive
    }

    /// Where `record` is (or would be) stored.
    pub fn path_of(&self, record: &Record) -> String {
        router::resolve_path(&self.record_type, &to_slug(&record.href), record.visibility)
    }

    /// Every readable record in both roots. Corrupt or foreign documents
    /// are skipped.
    pub async fn list(&self) -> Result<Vec<Record>> {
        let entries = query::list_files(self.drive.as_ref(), &self.record_type).await?;
        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(file) = query::read_file(self.drive.as_ref(), &entry).await? else {
                continue;
            };
            match codec::decode(&self.record_type, &file) {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %file.path, error = %e, "skipping unreadable record"),
            }
        }
        Ok(records)
    }

    /// The record for `href`, or `None` if it is absent or unreadable.
    pub async fn get(&self, href: &str) -> Result<Option<Record>> {
        Ok(self.find(href).await?.map(|(_, record)| record))
    }

    /// The record for `href` together with the path it was read from.
    async fn find(&self, href: &str) -> Result<Option<(String, Record)>> {
        let Some(entry) = query::find_file(self.drive.as_ref(), &self.record_type, href).await?
        else {
            return Ok(None);
        };
        let Some(file) = query::read_file(self.drive.as_ref(), &entry).await? else {
            return Ok(None);
        };
        match codec::decode(&self.record_type, &file) {
            Ok(record) => Ok(Some((file.path, record))),
            Err(e) => {
                warn!(path = %file.path, error = %e, "treating unreadable record as absent");
                Ok(None)
            }
        }
    }

    /// Create (or overwrite) the record at the path its href and visibility
    /// select. Returns that path.
    pub async fn add(&self, new: NewRecord) -> Result<String> {
        if new.href.trim().is_empty() {
            return Err(StoreError::InvalidRecord("href is required".to_string()));
        }
        let record = Record {
            href: new.href,
            title: new.title,
            description: new.description,
            visibility: new.visibility,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        self.write(&record).await
    }

    /// Merge `patch` over the record stored for `old_href` and write it
    /// back. A missing record is created from the patch instead, using
    /// `old_href` when the patch carries no href.
    pub async fn update(&self, old_href: &str, patch: RecordPatch) -> Result<String> {
        let Some((old_path, old)) = self.find(old_href).await? else {
            debug!(href = %old_href, "update of missing record, adding instead");
            let new = NewRecord {
                href: patch.href.unwrap_or_else(|| old_href.to_string()),
                title: patch.title,
                description: patch.description,
                visibility: patch.visibility.unwrap_or_default(),
            };
            return self.add(new).await;
        };

        let record = patch.apply(&old, Utc::now());
        if record.href.trim().is_empty() {
            return Err(StoreError::InvalidRecord("href is required".to_string()));
        }

        if record.visibility != old.visibility {
            match self.drive.delete_if_exists(&old_path).await {
                Ok(removed) => debug!(path = %old_path, removed, "cleared old visibility"),
                Err(e) => warn!(path = %old_path, error = %e, "failed to remove old record"),
            }
        }

        self.write(&record).await
    }

    /// Delete the record for `href`. Missing records are a no-op.
    pub async fn remove(&self, href: &str) -> Result<()> {
        let Some((path, _)) = self.find(href).await? else {
            return Ok(());
        };
        let removed = self.drive.delete_if_exists(&path).await?;
        debug!(path = %path, removed, "removed record");
        Ok(())
    }

    /// Write a fully-formed record as-is, keeping its timestamps. A missing
    /// `created_at` is set to now.
    pub async fn import(&self, mut record: Record) -> Result<String> {
        if record.href.trim().is_empty() {
            return Err(StoreError::InvalidRecord("href is required".to_string()));
        }
        record.created_at.get_or_insert_with(Utc::now);
        self.write(&record).await
    }

    async fn write(&self, record: &Record) -> Result<String> {
        let path = self.path_of(record);
        let bytes = codec::encode(&self.record_type, record)?;
        self.drive.write_file(&path, &bytes).await?;
        debug!(path = %path, href = %record.href, "wrote record");
        Ok(path)
    }
}
