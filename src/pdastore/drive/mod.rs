//! # Drive Interface
//!
//! The record store never touches storage directly. It talks to a [`Drive`]:
//! a path-addressed file store with per-path consistency and no multi-path
//! transactions. In production the drive is a peer-replicated, versioned
//! archive; this crate ships two implementations:
//!
//! - [`fs::FsDrive`]: maps drive paths onto a local directory.
//! - [`memory::MemDrive`]: in-memory, for tests.
//!
//! ## Paths
//!
//! Drive paths are absolute and `/`-separated. Empty, `.` and `..` segments
//! are rejected with [`StoreError::InvalidPath`] before any I/O happens.
//!
//! ## Queries
//!
//! [`Drive::query`] takes [`glob`] patterns matched under [`MATCH_OPTIONS`]:
//! wildcards stay within one segment and skip hidden names. Results are
//! deduplicated by path and sorted.

use crate::error::{Result, StoreError};
use crate::model::FileEntry;
use async_trait::async_trait;
use glob::{MatchOptions, Pattern};

pub mod fs;
pub mod memory;

/// Path-addressed file store consumed by the record store.
#[async_trait]
pub trait Drive: Send + Sync {
    /// Read a whole file. Fails with [`StoreError::NotFound`] when absent.
    async fn read_file(&self, path: &str) -> Result<Vec<u8>>;

    /// Create or overwrite a file, creating parent directories implicitly.
    async fn write_file(&self, path: &str, content: &[u8]) -> Result<()>;

    /// Delete a file. Fails with [`StoreError::NotFound`] when absent.
    async fn unlink(&self, path: &str) -> Result<()>;

    /// All files matching any of the glob patterns.
    async fn query(&self, patterns: &[String]) -> Result<Vec<FileEntry>>;

    /// Delete a file if present. Returns whether anything was removed;
    /// failures other than not-found still propagate.
    async fn delete_if_exists(&self, path: &str) -> Result<bool> {
        match self.unlink(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Split an absolute drive path (or pattern) into validated segments.
pub fn path_segments(path: &str) -> Result<Vec<&str>> {
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| StoreError::InvalidPath(path.to_string()))?;
    let segments: Vec<&str> = rest.split('/').collect();
    let valid = segments.iter().all(|s| {
        !s.is_empty()
            && *s != "."
            && *s != ".."
            && !s.contains(|c: char| c == '\\' || c == '\0')
    });
    if !valid {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

/// Matching rules shared by every drive: `*` and `?` never cross a `/`,
/// and dot-prefixed names (in-flight temp files) only match a literal dot.
pub const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Validate and compile a query pattern.
pub fn compile_pattern(pattern: &str) -> Result<Pattern> {
    path_segments(pattern)?;
    Pattern::new(pattern).map_err(|e| StoreError::InvalidPath(format!("{}: {}", pattern, e)))
}

/// Whole-path glob match under [`MATCH_OPTIONS`].
pub fn glob_match(pattern: &Pattern, path: &str) -> bool {
    pattern.matches_with(path, MATCH_OPTIONS)
}
