//! Photovault Core Library
//!
//! This crate provides the domain models, error types, configuration, the upload
//! access gate and input validation shared by the storage and API crates.

pub mod access;
pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use access::{can_upload, ensure_can_upload};
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{AuthUser, Checksum, StoredFile, UploadFieldRole};
pub use validation::media_type::{MediaTypeFilter, RejectionLog, TracingRejectionLog};
