//! Photovault Storage Library
//!
//! Persists uploaded originals to the local filesystem while hashing them in the
//! same pass.
//!
//! # Storage layout
//!
//! Every original lives at `<root>/<user id>/original/<device id>/<generated name>`.
//! Both the user id and the device id are sanitized into single path segments
//! before any directory is created, and generated names come from a fresh UUID
//! per file. Layout decisions are centralized in the `paths` module.

pub mod checksum;
pub mod local;
pub mod paths;
pub mod sink;
pub mod traits;
pub mod upload;

// Re-export commonly used types
pub use checksum::HashingReader;
pub use local::LocalStorage;
pub use paths::{ResolvedName, UploadPaths};
pub use sink::{ChecksumStorage, ChecksummedFile};
pub use traits::{Storage, StorageError, StorageResult, WrittenFile};
pub use upload::{UploadRequest, UploadSink};
