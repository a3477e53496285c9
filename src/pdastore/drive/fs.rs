use super::{compile_pattern, path_segments, Drive, MATCH_OPTIONS};
use crate::error::{Result, StoreError};
use crate::model::FileEntry;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use glob::Pattern;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Drive backed by a local directory. Drive path `/a/b.json` lives at
/// `<root>/a/b.json`.
pub struct FsDrive {
    root: PathBuf,
}

impl FsDrive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn fs_path(&self, path: &str) -> Result<PathBuf> {
        let mut fs_path = self.root.clone();
        for segment in path_segments(path)? {
            fs_path.push(segment);
        }
        Ok(fs_path)
    }

    /// Expand one pattern into `(drive path, fs path)` pairs. The walk is
    /// blocking, so it runs on the blocking pool.
    async fn expand(&self, pattern: &str) -> Result<Vec<(String, PathBuf)>> {
        compile_pattern(pattern)?;
        let root = self.root.clone();
        let pattern = pattern.to_string();
        tokio::task::spawn_blocking(move || expand_blocking(&root, &pattern)).await?
    }
}

fn expand_blocking(root: &Path, pattern: &str) -> Result<Vec<(String, PathBuf)>> {
    let root_str = root
        .to_str()
        .ok_or_else(|| StoreError::InvalidPath(root.display().to_string()))?;
    let full = format!("{}{}", Pattern::escape(root_str.trim_end_matches('/')), pattern);
    let paths = glob::glob_with(&full, MATCH_OPTIONS)
        .map_err(|e| StoreError::InvalidPath(format!("{}: {}", pattern, e)))?;

    let mut matches = Vec::new();
    for entry in paths {
        let fs_path = match entry {
            Ok(path) => path,
            Err(e) if e.error().kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(StoreError::Io(e.into_error())),
        };
        if let Some(drive_path) = drive_path(root, &fs_path) {
            matches.push((drive_path, fs_path));
        }
    }
    Ok(matches)
}

/// `<root>/a/b.json` back to `/a/b.json`. Non-UTF-8 names have no drive path.
fn drive_path(root: &Path, fs_path: &Path) -> Option<String> {
    let relative = fs_path.strip_prefix(root).ok()?;
    let mut drive_path = String::new();
    for component in relative.components() {
        drive_path.push('/');
        drive_path.push_str(component.as_os_str().to_str()?);
    }
    Some(drive_path)
}

fn map_not_found(e: std::io::Error, path: &str) -> StoreError {
    if e.kind() == ErrorKind::NotFound {
        StoreError::NotFound(path.to_string())
    } else {
        StoreError::Io(e)
    }
}

#[async_trait]
impl Drive for FsDrive {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let fs_path = self.fs_path(path)?;
        fs::read(&fs_path).await.map_err(|e| map_not_found(e, path))
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<()> {
        let fs_path = self.fs_path(path)?;
        let parent = fs_path
            .parent()
            .ok_or_else(|| StoreError::InvalidPath(path.to_string()))?;
        fs::create_dir_all(parent).await?;

        // Atomic write: readers see the old or the new file, never a torn one.
        let tmp_path = parent.join(format!(".{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_path, content).await?;
        if let Err(e) = fs::rename(&tmp_path, &fs_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(e));
        }
        Ok(())
    }

    async fn unlink(&self, path: &str) -> Result<()> {
        let fs_path = self.fs_path(path)?;
        fs::remove_file(&fs_path)
            .await
            .map_err(|e| map_not_found(e, path))
    }

    async fn query(&self, patterns: &[String]) -> Result<Vec<FileEntry>> {
        let mut found = BTreeMap::new();
        for pattern in patterns {
            for (drive_path, fs_path) in self.expand(pattern).await? {
                if found.contains_key(&drive_path) {
                    continue;
                }
                let metadata = match fs::metadata(&fs_path).await {
                    Ok(m) => m,
                    Err(e) if e.kind() == ErrorKind::NotFound => continue,
                    Err(e) => return Err(StoreError::Io(e)),
                };
                if !metadata.is_file() {
                    continue;
                }
                let mtime = metadata.modified().ok().map(DateTime::<Utc>::from);
                found.insert(
                    drive_path.clone(),
                    FileEntry {
                        path: drive_path,
                        size: metadata.len(),
                        mtime,
                    },
                );
            }
        }
        Ok(found.into_values().collect())
    }
}
