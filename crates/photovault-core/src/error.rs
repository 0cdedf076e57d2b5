//! Error types module
//!
//! This module provides the core error types used throughout Photovault.
//! All errors surfaced to the HTTP layer are unified under the `AppError` enum,
//! which describes its own HTTP presentation through [`ErrorMetadata`].

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Rejected requests the client can fix
    Debug,
    Warn,
    /// Failures on our side
    Error,
}

/// How an error is presented to clients and logs
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same request may succeed
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Message safe to show to any client
    fn client_message(&self) -> String;

    /// Sensitive errors never expose details, whatever the environment
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Unsupported file type {extension} file MIME type {mime_type}")]
    UnsupportedMediaType {
        extension: String,
        mime_type: String,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Storage(format!("IO error: {}", err))
    }
}

/// Presentation shared by every instance of a variant
struct VariantMeta {
    status: u16,
    code: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

impl VariantMeta {
    /// A client mistake: not retryable, not sensitive, logged at debug.
    const fn rejected(status: u16, code: &'static str, action: &'static str) -> Self {
        Self {
            status,
            code,
            recoverable: false,
            action: Some(action),
            sensitive: false,
            level: LogLevel::Debug,
        }
    }

    /// A server-side failure: retryable, details hidden, logged at error.
    const fn failed(code: &'static str, action: &'static str) -> Self {
        Self {
            status: 500,
            code,
            recoverable: true,
            action: Some(action),
            sensitive: true,
            level: LogLevel::Error,
        }
    }
}

impl AppError {
    fn meta(&self) -> VariantMeta {
        match self {
            AppError::Unauthorized(_) => VariantMeta::rejected(
                401,
                "UNAUTHORIZED",
                "Check authentication token or shared link permissions",
            ),
            AppError::UnsupportedMediaType { .. } => VariantMeta::rejected(
                400,
                "UNSUPPORTED_MEDIA_TYPE",
                "Upload a supported photo or video format",
            ),
            AppError::BadRequest(_) => {
                VariantMeta::rejected(400, "BAD_REQUEST", "Check the multipart form fields")
            }
            AppError::PayloadTooLarge(_) => {
                VariantMeta::rejected(413, "PAYLOAD_TOO_LARGE", "Reduce file size")
            }
            AppError::Storage(_) => VariantMeta::failed("STORAGE_ERROR", "Retry the upload"),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                VariantMeta::failed("INTERNAL_ERROR", "Retry after a short delay")
            }
        }
    }

    /// Variant name, shown in non-production error bodies
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::UnsupportedMediaType { .. } => "UnsupportedMediaType",
            AppError::BadRequest(_) => "BadRequest",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Storage(_) => "Storage",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Full message followed by up to five levels of `source()` causes
    pub fn detailed_message(&self) -> String {
        const MAX_CAUSES: usize = 5;

        let mut details = self.to_string();
        let mut causes = std::iter::successors(std::error::Error::source(self), |e| e.source());

        for cause in causes.by_ref().take(MAX_CAUSES) {
            details.push_str(&format!("\n  Caused by: {}", cause));
        }
        if causes.next().is_some() {
            details.push_str("\n  ... (truncated)");
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.meta().status
    }

    fn error_code(&self) -> &'static str {
        self.meta().code
    }

    fn is_recoverable(&self) -> bool {
        self.meta().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.meta().action
    }

    fn is_sensitive(&self) -> bool {
        self.meta().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.meta().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::UnsupportedMediaType { extension, .. } => {
                format!("Unsupported file type {}", extension)
            }
            AppError::Storage(_) => "Failed to store file".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
