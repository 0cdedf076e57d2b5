//! Media type allow-list applied to every uploaded file before storage is allocated.

use std::sync::Arc;

use crate::error::AppError;
use crate::validation::filename::extname;

/// MIME subtypes accepted for upload (photos, raw formats and videos)
pub const SUPPORTED_MEDIA_SUBTYPES: &[&str] = &[
    "jpg",
    "jpeg",
    "png",
    "gif",
    "mp4",
    "webm",
    "x-msvideo",
    "quicktime",
    "heic",
    "heif",
    "dng",
    "x-adobe-dng",
    "webp",
    "tiff",
    "3gpp",
    "nef",
    "x-nikon-nef",
    "x-fuji-raf",
    "x-samsung-srw",
    "mpeg",
    "x-flv",
    "x-ms-wmv",
    "x-matroska",
];

/// Sink for rejected-upload diagnostics.
pub trait RejectionLog: Send + Sync {
    fn unsupported_media_type(&self, extension: &str, mime_type: &str);
}

/// Records rejections as `tracing` error events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRejectionLog;

impl RejectionLog for TracingRejectionLog {
    fn unsupported_media_type(&self, extension: &str, mime_type: &str) {
        tracing::error!(
            extension = %extension,
            mime_type = %mime_type,
            "Unsupported file type {} file MIME type {}",
            extension,
            mime_type
        );
    }
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; q=1" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

/// Whether the subtype of `mime_type` is in the allow-list.
///
/// Only the subtype is compared, so `image/x-adobe-dng` and
/// `application/x-adobe-dng` are treated alike.
pub fn is_supported_media_type(mime_type: &str) -> bool {
    let normalized = normalize_mime_type(mime_type);
    match normalized.rsplit_once('/') {
        Some((_, subtype)) => SUPPORTED_MEDIA_SUBTYPES.contains(&subtype),
        None => false,
    }
}

/// Type filter with an injected rejection log
#[derive(Clone)]
pub struct MediaTypeFilter {
    log: Arc<dyn RejectionLog>,
}

impl MediaTypeFilter {
    pub fn new(log: Arc<dyn RejectionLog>) -> Self {
        Self { log }
    }

    /// Reject uploads whose declared MIME type is not supported.
    ///
    /// The error carries the extension of `original_name` and the declared MIME
    /// type; the same pair is handed to the rejection log.
    pub fn check(&self, original_name: &str, mime_type: &str) -> Result<(), AppError> {
        if is_supported_media_type(mime_type) {
            return Ok(());
        }

        let extension = extname(original_name).to_string();
        self.log.unsupported_media_type(&extension, mime_type);

        Err(AppError::UnsupportedMediaType {
            extension,
            mime_type: mime_type.to_string(),
        })
    }
}

impl Default for MediaTypeFilter {
    fn default() -> Self {
        Self::new(Arc::new(TracingRejectionLog))
    }
}

impl std::fmt::Debug for MediaTypeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaTypeFilter").finish_non_exhaustive()
    }
}
