//! Upload sink: the gated pipeline a multipart file field flows through.
//!
//! Per file the order is fixed: type filter, destination directory, generated
//! name, then the checksummed write. Every step that touches the caller's
//! identity re-checks the access gate.

use crate::paths::{ResolvedName, UploadPaths};
use crate::sink::ChecksumStorage;
use crate::traits::Storage;
use photovault_core::{ensure_can_upload, AppError, AuthUser, MediaTypeFilter, StoredFile, UploadFieldRole};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncRead;

/// One file field of an upload request
#[derive(Debug)]
pub struct UploadRequest<R> {
    pub original_name: String,
    pub mime_type: String,
    pub field_role: UploadFieldRole,
    /// Extension declared by the client, including the leading dot
    pub file_extension: String,
    pub device_id: String,
    pub reader: R,
}

/// Gated, checksumming upload pipeline shared by all requests
#[derive(Debug, Clone)]
pub struct UploadSink {
    paths: UploadPaths,
    filter: MediaTypeFilter,
    storage: ChecksumStorage,
}

impl UploadSink {
    pub fn new(paths: UploadPaths, filter: MediaTypeFilter, storage: Arc<dyn Storage>) -> Self {
        Self {
            paths,
            filter,
            storage: ChecksumStorage::new(storage),
        }
    }

    /// Accept or reject a file field before anything is written.
    pub fn file_filter(
        &self,
        identity: Option<&AuthUser>,
        original_name: &str,
        mime_type: &str,
    ) -> Result<(), AppError> {
        ensure_can_upload(identity)?;
        self.filter.check(original_name, mime_type)
    }

    /// Destination directory for the caller's device, created if missing.
    pub async fn destination(
        &self,
        identity: Option<&AuthUser>,
        device_id: &str,
    ) -> Result<PathBuf, AppError> {
        self.paths.resolve_dir(identity, device_id).await
    }

    pub fn file_name(
        &self,
        identity: Option<&AuthUser>,
        role: UploadFieldRole,
        declared_extension: &str,
        original_name: &str,
    ) -> Result<ResolvedName, AppError> {
        self.paths
            .resolve_name(identity, role, declared_extension, original_name)
    }

    /// Run one file field through the pipeline and persist it.
    ///
    /// No directory is created for a request rejected by the gate or the type
    /// filter. On a storage failure the partial file is gone and no descriptor
    /// is returned.
    pub async fn handle_file<R>(
        &self,
        identity: Option<&AuthUser>,
        request: UploadRequest<R>,
    ) -> Result<StoredFile, AppError>
    where
        R: AsyncRead + Send + Unpin,
    {
        let UploadRequest {
            original_name,
            mime_type,
            field_role,
            file_extension,
            device_id,
            reader,
        } = request;

        self.file_filter(identity, &original_name, &mime_type)?;
        let dir = self.destination(identity, &device_id).await?;
        let name = self.file_name(identity, field_role, &file_extension, &original_name)?;

        let written = self
            .storage
            .handle_file(&dir, &name.file_name, reader)
            .await
            .map_err(|e| {
                tracing::error!(
                    dir = %dir.display(),
                    file_name = %name.file_name,
                    error = %e,
                    "Upload stream failed"
                );
                AppError::from(e)
            })?;

        tracing::info!(
            path = %written.path.display(),
            size_bytes = written.size,
            field = field_role.field_name(),
            checksum = %written.checksum,
            "Upload stored"
        );

        Ok(StoredFile {
            path: written.path,
            file_name: name.file_name,
            original_name: name.original_name,
            field_role,
            mime_type,
            size: written.size,
            checksum: written.checksum,
        })
    }

    /// Remove a stored file, e.g. when a later field of the same request fails.
    pub async fn remove_file(&self, file: &StoredFile) -> Result<(), AppError> {
        self.storage.remove_file(&file.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalStorage;
    use photovault_core::RejectionLog;
    use std::io;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::task::{Context, Poll};
    use tempfile::{tempdir, TempDir};
    use tokio::io::ReadBuf;

    #[derive(Default)]
    struct RecordingLog {
        events: Mutex<Vec<(String, String)>>,
    }

    impl RejectionLog for RecordingLog {
        fn unsupported_media_type(&self, extension: &str, mime_type: &str) {
            self.events
                .lock()
                .unwrap()
                .push((extension.to_string(), mime_type.to_string()));
        }
    }

    /// Hands out `prefix`, then fails like a dropped connection.
    struct DisconnectingReader {
        prefix: Option<Vec<u8>>,
    }

    impl AsyncRead for DisconnectingReader {
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
                    io::ErrorKind::ConnectionAborted,
                    "client went away",
                ))),
            }
        }
    }

    async fn sink_with_log(log: Arc<RecordingLog>) -> (TempDir, UploadSink) {
        let root = tempdir().unwrap();
        let storage = LocalStorage::new(root.path()).await.unwrap();
        let sink = UploadSink::new(
            UploadPaths::new(root.path()),
            MediaTypeFilter::new(log),
            Arc::new(storage),
        );
        (root, sink)
    }

    async fn sink() -> (TempDir, UploadSink) {
        sink_with_log(Arc::new(RecordingLog::default())).await
    }

    fn owner(id: &str) -> AuthUser {
        AuthUser {
            id: id.to_string(),
            is_public_user: false,
            is_allow_upload: false,
        }
    }

    fn request<R>(mime: &str, role: UploadFieldRole, device: &str, reader: R) -> UploadRequest<R> {
        UploadRequest {
            original_name: "IMG_0001.jpg".to_string(),
            mime_type: mime.to_string(),
            field_role: role,
            file_extension: ".jpg".to_string(),
            device_id: device.to_string(),
            reader,
        }
    }

    #[tokio::test]
    async fn test_stores_hello_under_sanitized_device_dir() {
        let (root, sink) = sink().await;
        let u1 = owner("u1");

        let stored = sink
            .handle_file(
                Some(&u1),
                request("image/jpeg", UploadFieldRole::Asset, "../../etc", &b"hello"[..]),
            )
            .await
            .unwrap();

        let expected_dir = root.path().join("u1").join("original").join("etc");
        assert_eq!(stored.path.parent(), Some(expected_dir.as_path()));
        assert!(stored.file_name.ends_with(".jpg"));
        assert_eq!(stored.original_name, "IMG_0001.jpg");
        assert_eq!(stored.size, 5);
        assert_eq!(
            stored.checksum.to_hex(),
            "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"
        );
        assert_eq!(tokio::fs::read(&stored.path).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_unauthorized_caller_has_no_effects() {
        let (root, sink) = sink().await;
        let public = AuthUser {
            id: "share-link".to_string(),
            is_public_user: true,
            is_allow_upload: false,
        };

        for identity in [None, Some(&public)] {
            let result = sink
                .handle_file(
                    identity,
                    request("image/jpeg", UploadFieldRole::Asset, "phone", &b"hello"[..]),
                )
                .await;
            assert!(matches!(result, Err(AppError::Unauthorized(_))));
        }
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_public_caller_with_upload_permission() {
        let (_root, sink) = sink().await;
        let public = AuthUser {
            id: "share-link".to_string(),
            is_public_user: true,
            is_allow_upload: true,
        };

        let stored = sink
            .handle_file(
                Some(&public),
                request("image/png", UploadFieldRole::Asset, "phone", &b"png"[..]),
            )
            .await
            .unwrap();
        assert_eq!(stored.size, 3);
    }

    #[tokio::test]
    async fn test_unsupported_type_is_rejected_before_dir_creation() {
        let log = Arc::new(RecordingLog::default());
        let (root, sink) = sink_with_log(log.clone()).await;
        let mut req = request("application/pdf", UploadFieldRole::Asset, "phone", &b"%PDF"[..]);
        req.original_name = "scan.pdf".to_string();

        let err = sink.handle_file(Some(&owner("u1")), req).await.unwrap_err();

        match err {
            AppError::UnsupportedMediaType {
                extension,
                mime_type,
            } => {
                assert_eq!(extension, ".pdf");
                assert_eq!(mime_type, "application/pdf");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            *log.events.lock().unwrap(),
            vec![(".pdf".to_string(), "application/pdf".to_string())]
        );
        assert!(!root.path().join("u1").exists());
    }

    #[tokio::test]
    async fn test_concurrent_uploads_get_distinct_names() {
        let (_root, sink) = sink().await;
        let sink = Arc::new(sink);
        let u1 = owner("u1");

        let mut handles = Vec::new();
        for i in 0..8u8 {
            let sink = sink.clone();
            let u1 = u1.clone();
            handles.push(tokio::spawn(async move {
                let body = vec![i; 64];
                sink.handle_file(
                    Some(&u1),
                    request("image/jpeg", UploadFieldRole::Asset, "phone", &body[..]),
                )
                .await
                .unwrap()
            }));
        }

        let mut names = Vec::new();
        for handle in handles {
            names.push(handle.await.unwrap().file_name);
        }
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 8);
    }

    #[tokio::test]
    async fn test_live_photo_is_stored_as_mov() {
        let (_root, sink) = sink().await;
        let mut req = request("video/quicktime", UploadFieldRole::LivePhoto, "phone", &b"moov"[..]);
        req.file_extension = ".heic".to_string();

        let stored = sink.handle_file(Some(&owner("u1")), req).await.unwrap();

        assert!(stored.file_name.ends_with(".mov"));
        assert_eq!(stored.field_role, UploadFieldRole::LivePhoto);
    }

    #[tokio::test]
    async fn test_mid_stream_failure_returns_storage_error() {
        let (root, sink) = sink().await;
        let reader = DisconnectingReader {
            prefix: Some(b"partial bytes".to_vec()),
        };

        let err = sink
            .handle_file(
                Some(&owner("u1")),
                request("video/mp4", UploadFieldRole::Asset, "phone", reader),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        let dir = root.path().join("u1").join("original").join("phone");
        assert_eq!(std::fs::read_dir(dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_root_with_parent_components() {
        let tmp = tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("x")).unwrap();
        let root = tmp.path().join("x").join("..").join("upload");
        let storage = LocalStorage::new(&root).await.unwrap();
        let sink = UploadSink::new(
            UploadPaths::new(&root),
            MediaTypeFilter::new(Arc::new(RecordingLog::default())),
            Arc::new(storage),
        );

        let stored = sink
            .handle_file(
                Some(&owner("u1")),
                request("image/jpeg", UploadFieldRole::Asset, "phone", &b"hello"[..]),
            )
            .await
            .unwrap();

        assert_eq!(
            stored.checksum.to_hex(),
            "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"
        );
        let on_disk = tmp
            .path()
            .join("upload")
            .join("u1")
            .join("original")
            .join("phone")
            .join(&stored.file_name);
        assert_eq!(tokio::fs::read(on_disk).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_remove_file_deletes_stored_upload() {
        let (_root, sink) = sink().await;
        let stored = sink
            .handle_file(
                Some(&owner("u1")),
                request("image/jpeg", UploadFieldRole::Asset, "phone", &b"hello"[..]),
            )
            .await
            .unwrap();

        sink.remove_file(&stored).await.unwrap();
        assert!(!stored.path.exists());
    }
}
