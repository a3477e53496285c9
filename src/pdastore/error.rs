use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The drive has no file at this path.
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Legacy store error: {0}")]
    Legacy(#[from] rusqlite::Error),

    #[error("Drive error: {0}")]
    Drive(String),

    /// A blocking worker (SQLite reader, directory walk) panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn panicked_worker_is_a_task_error() {
        let join_err = tokio::task::spawn_blocking(|| panic!("reader died"))
            .await
            .unwrap_err();
        let err = StoreError::from(join_err);
        assert!(matches!(err, StoreError::Task(_)));
        assert!(!err.is_not_found());
    }
}
