//! Storage abstraction trait
//!
//! This module defines the disk-write primitive the upload sink is built on.

use async_trait::async_trait;
use photovault_core::AppError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Result of a completed write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Disk-write primitive
///
/// Implementations consume `reader` to EOF into `dir/file_name`. A failed write
/// must not leave a file behind.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write the whole stream to `dir/file_name` and return where it landed.
    ///
    /// `dir` must already exist; `file_name` must be a single path component and
    /// must not name an existing file.
    async fn write_file(
        &self,
        dir: &Path,
        file_name: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<WrittenFile>;

    /// Remove a previously written file. Removing a missing file is not an error.
    async fn remove_file(&self, path: &Path) -> StorageResult<()>;
}
