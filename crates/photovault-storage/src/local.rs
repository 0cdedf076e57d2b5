use crate::traits::{Storage, StorageError, StorageResult, WrittenFile};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncRead;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/photovault/upload")
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    /// Reject paths that could escape the storage root.
    ///
    /// `path` must be below the base path, and the part after it must not
    /// contain `..` or root components. The base itself may contain `..`.
    fn check_within_base(&self, path: &Path) -> StorageResult<()> {
        let relative = path.strip_prefix(&self.base_path).map_err(|_| {
            StorageError::InvalidPath(format!(
                "Path resolves outside storage directory: {}",
                path.display()
            ))
        })?;

        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(StorageError::InvalidPath(format!(
                "Path contains parent directory components: {}",
                path.display()
            )));
        }

        Ok(())
    }

    fn check_file_name(file_name: &str) -> StorageResult<()> {
        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(()),
            _ => Err(StorageError::InvalidPath(format!(
                "File name must be a single path component: {:?}",
                file_name
            ))),
        }
    }

    /// Best-effort removal of a partially written file.
    async fn discard_partial(path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to remove partially written file"
                );
            }
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn write_file(
        &self,
        dir: &Path,
        file_name: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<WrittenFile> {
        Self::check_file_name(file_name)?;
        let path = dir.join(file_name);
        self.check_within_base(&path)?;

        let start = std::time::Instant::now();

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                StorageError::WriteFailed(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let bytes_copied = match tokio::io::copy(reader, &mut file).await {
            Ok(n) => n,
            Err(e) => {
                drop(file);
                Self::discard_partial(&path).await;
                return Err(StorageError::WriteFailed(format!(
                    "Failed to write stream to file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        if let Err(e) = file.sync_all().await {
            drop(file);
            Self::discard_partial(&path).await;
            return Err(StorageError::WriteFailed(format!(
                "Failed to sync file {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage stream write successful"
        );

        Ok(WrittenFile {
            path,
            size: bytes_copied,
        })
    }

    async fn remove_file(&self, path: &Path) -> StorageResult<()> {
        self.check_within_base(path)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::tempdir;
    use tokio::io::ReadBuf;

    /// Yields `prefix` once, then fails as if the client hung up.
    struct BrokenReader {
        prefix: Option<Vec<u8>>,
    }

    impl AsyncRead for BrokenReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.prefix.take() {
                Some(bytes) => {
                    buf.put_slice(&bytes);
                    Poll::Ready(Ok(()))
                }
                None => Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "client disconnected",
                ))),
            }
        }
    }

    #[tokio::test]
    async fn test_local_storage_write_and_remove() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let mut reader: &[u8] = b"test data";
        let written = storage
            .write_file(dir.path(), "test.jpg", &mut reader)
            .await
            .unwrap();

        assert_eq!(written.path, dir.path().join("test.jpg"));
        assert_eq!(written.size, 9);
        assert_eq!(tokio::fs::read(&written.path).await.unwrap(), b"test data");

        storage.remove_file(&written.path).await.unwrap();
        assert!(!written.path.exists());
    }

    #[tokio::test]
    async fn test_remove_nonexistent_is_ok() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let result = storage.remove_file(&dir.path().join("missing.jpg")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let mut reader: &[u8] = b"x";
        let result = storage
            .write_file(dir.path(), "../escape.jpg", &mut reader)
            .await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));

        let result = storage
            .write_file(Path::new("/etc"), "passwd", &mut reader)
            .await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));

        let result = storage.remove_file(Path::new("/etc/passwd")).await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_base_path_with_parent_components() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("x")).unwrap();
        let base = dir.path().join("x").join("..").join("upload");
        let storage = LocalStorage::new(&base).await.unwrap();

        let nested = base.join("u1").join("original").join("phone");
        tokio::fs::create_dir_all(&nested).await.unwrap();

        let mut reader: &[u8] = b"hello";
        let written = storage
            .write_file(&nested, "a.jpg", &mut reader)
            .await
            .unwrap();
        assert_eq!(written.size, 5);
        assert!(dir.path().join("upload/u1/original/phone/a.jpg").is_file());

        let escape = base.join("u1").join("..").join("..");
        let mut reader: &[u8] = b"x";
        let result = storage.write_file(&escape, "b.jpg", &mut reader).await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));

        storage.remove_file(&written.path).await.unwrap();
        assert!(!written.path.exists());
    }

    #[tokio::test]
    async fn test_existing_file_is_not_overwritten() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let mut first: &[u8] = b"first";
        storage
            .write_file(dir.path(), "same.jpg", &mut first)
            .await
            .unwrap();

        let mut second: &[u8] = b"second";
        let result = storage
            .write_file(dir.path(), "same.jpg", &mut second)
            .await;
        assert!(matches!(result, Err(StorageError::WriteFailed(_))));
        assert_eq!(
            tokio::fs::read(dir.path().join("same.jpg")).await.unwrap(),
            b"first"
        );
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_file() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let mut reader = BrokenReader {
            prefix: Some(b"partial".to_vec()),
        };
        let result = storage
            .write_file(dir.path(), "broken.mp4", &mut reader)
            .await;

        assert!(matches!(result, Err(StorageError::WriteFailed(_))));
        assert!(!dir.path().join("broken.mp4").exists());
    }
}
