pub mod identity;
pub mod upload;

pub use identity::AuthUser;
pub use upload::{Checksum, StoredFile, UploadFieldRole};
