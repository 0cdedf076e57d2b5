//! Upload access gate
//!
//! A single predicate decides whether a caller may upload. Every entry point of
//! the upload pipeline that could cause a side effect (type filtering, directory
//! allocation, name allocation) calls it on its own, so the verdict must depend
//! on nothing but the identity.

use crate::error::AppError;
use crate::models::AuthUser;

/// Returns true when `identity` may upload.
///
/// Absent identities are refused, and so are public (shared-link) callers unless
/// the link explicitly allows uploads.
pub fn can_upload(identity: Option<&AuthUser>) -> bool {
    match identity {
        None => false,
        Some(user) => !user.is_public_user || user.is_allow_upload,
    }
}

/// [`can_upload`] as a `Result`, for use with `?` at gated entry points.
pub fn ensure_can_upload(identity: Option<&AuthUser>) -> Result<&AuthUser, AppError> {
    match identity {
        Some(user) if can_upload(identity) => Ok(user),
        _ => Err(AppError::Unauthorized(
            "Not allowed to upload assets".to_string(),
        )),
    }
}
