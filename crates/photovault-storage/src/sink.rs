//! Checksumming wrapper around a disk-write primitive.

use crate::checksum::HashingReader;
use crate::traits::{Storage, StorageResult, WrittenFile};
use photovault_core::Checksum;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncRead;

/// A written file together with the SHA-1 of its bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksummedFile {
    pub path: PathBuf,
    pub size: u64,
    pub checksum: Checksum,
}

impl ChecksummedFile {
    fn new(written: WrittenFile, checksum: Checksum) -> Self {
        Self {
            path: written.path,
            size: written.size,
            checksum,
        }
    }
}

/// Wraps a [`Storage`] so that every write also yields a content checksum.
///
/// The incoming stream is read once: the disk writer pulls chunks through a
/// [`HashingReader`], which hashes each chunk on its way past. A failed write
/// discards the partial digest and returns the storage error untouched.
#[derive(Clone)]
pub struct ChecksumStorage {
    inner: Arc<dyn Storage>,
}

impl ChecksumStorage {
    pub fn new(inner: Arc<dyn Storage>) -> Self {
        Self { inner }
    }

    pub async fn handle_file<R>(
        &self,
        dir: &Path,
        file_name: &str,
        reader: R,
    ) -> StorageResult<ChecksummedFile>
    where
        R: AsyncRead + Send + Unpin,
    {
        let mut hashing = HashingReader::new(reader);

        match self.inner.write_file(dir, file_name, &mut hashing).await {
            Ok(written) => {
                let checksum = hashing.finalize();
                tracing::debug!(
                    path = %written.path.display(),
                    size_bytes = written.size,
                    checksum = %checksum,
                    "Stored file checksum computed"
                );
                Ok(ChecksummedFile::new(written, checksum))
            }
            Err(e) => {
                hashing.abort();
                Err(e)
            }
        }
    }

    /// Remove a stored file; no checksum state is involved.
    pub async fn remove_file(&self, path: &Path) -> StorageResult<()> {
        self.inner.remove_file(path).await
    }
}

impl std::fmt::Debug for ChecksumStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChecksumStorage").finish_non_exhaustive()
    }
}
