use super::{compile_pattern, glob_match, path_segments, Drive};
use crate::error::{Result, StoreError};
use crate::model::FileEntry;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Clone)]
struct MemFile {
    content: Vec<u8>,
    mtime: DateTime<Utc>,
}

/// In-memory drive for testing.
///
/// Files are keyed by their full drive path. Write and unlink failures can
/// be simulated to exercise error propagation in the record store.
#[derive(Default)]
pub struct MemDrive {
    files: RwLock<BTreeMap<String, MemFile>>,
    simulate_write_error: AtomicBool,
    simulate_unlink_error: AtomicBool,
}

impl MemDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    pub fn set_simulate_unlink_error(&self, simulate: bool) {
        self.simulate_unlink_error.store(simulate, Ordering::SeqCst);
    }

    /// Every stored path, sorted.
    pub async fn paths(&self) -> Vec<String> {
        self.files.read().await.keys().cloned().collect()
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.files.read().await.contains_key(path)
    }
}

#[async_trait]
impl Drive for MemDrive {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        path_segments(path)?;
        self.files
            .read()
            .await
            .get(path)
            .map(|f| f.content.clone())
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<()> {
        path_segments(path)?;
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(StoreError::Drive("Simulated write error".to_string()));
        }
        self.files.write().await.insert(
            path.to_string(),
            MemFile {
                content: content.to_vec(),
                mtime: Utc::now(),
            },
        );
        Ok(())
    }

    async fn unlink(&self, path: &str) -> Result<()> {
        path_segments(path)?;
        if self.simulate_unlink_error.load(Ordering::SeqCst) {
            return Err(StoreError::Drive("Simulated unlink error".to_string()));
        }
        self.files
            .write()
            .await
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn query(&self, patterns: &[String]) -> Result<Vec<FileEntry>> {
        let patterns = patterns
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<Vec<_>>>()?;
        let files = self.files.read().await;
        Ok(files
            .iter()
            .filter(|(path, _)| patterns.iter().any(|p| glob_match(p, path)))
            .map(|(path, file)| FileEntry {
                path: path.clone(),
                size: file.content.len() as u64,
                mtime: Some(file.mtime),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_read_unlink() {
        let drive = MemDrive::new();
        drive.write_file("/data/a.json", b"{}").await.unwrap();
        assert_eq!(drive.read_file("/data/a.json").await.unwrap(), b"{}");

        drive.unlink("/data/a.json").await.unwrap();
        assert!(drive.read_file("/data/a.json").await.unwrap_err().is_not_found());
        assert!(drive.unlink("/data/a.json").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn delete_if_exists_reports_presence() {
        let drive = MemDrive::new();
        drive.write_file("/data/a.json", b"{}").await.unwrap();
        assert!(drive.delete_if_exists("/data/a.json").await.unwrap());
        assert!(!drive.delete_if_exists("/data/a.json").await.unwrap());
    }

    #[tokio::test]
    async fn delete_if_exists_propagates_other_failures() {
        let drive = MemDrive::new();
        drive.set_simulate_unlink_error(true);
        assert!(drive.delete_if_exists("/data/a.json").await.is_err());
    }

    #[tokio::test]
    async fn query_dedupes_overlapping_patterns() {
        let drive = MemDrive::new();
        drive.write_file("/data/x/a.json", b"1").await.unwrap();
        drive.write_file("/public/data/x/b.json", b"22").await.unwrap();
        drive.write_file("/data/x/c.txt", b"3").await.unwrap();

        let entries = drive
            .query(&[
                "/data/x/*.json".to_string(),
                "/data/x/a.json".to_string(),
                "/public/data/x/*.json".to_string(),
            ])
            .await
            .unwrap();

        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/data/x/a.json", "/public/data/x/b.json"]);
        assert_eq!(entries[1].size, 2);
    }

    #[tokio::test]
    async fn rejects_invalid_paths() {
        let drive = MemDrive::new();
        assert!(matches!(
            drive.write_file("/data/../a.json", b"").await,
            Err(StoreError::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn simulated_write_error() {
        let drive = MemDrive::new();
        drive.set_simulate_write_error(true);
        assert!(drive.write_file("/data/a.json", b"{}").await.is_err());
        assert!(drive.paths().await.is_empty());
    }
}
