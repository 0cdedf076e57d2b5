//! Placement and naming of uploaded originals.
//!
//! Layout: `<root>/<user id>/original/<device id>/<uuid><ext>`. Live photo
//! companions are always named `<uuid>.mov`.

use photovault_core::validation::{repair_form_data_name, sanitize_filename, sanitize_path_segment};
use photovault_core::{ensure_can_upload, AppError, AuthUser, UploadFieldRole};
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

const ORIGINAL_DIR: &str = "original";
const LIVE_PHOTO_EXTENSION: &str = ".mov";

/// Generated storage name plus the repaired client name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub file_name: String,
    pub original_name: String,
}

/// Path allocator rooted at the configured upload location
#[derive(Debug, Clone)]
pub struct UploadPaths {
    root: PathBuf,
}

impl UploadPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory for originals uploaded by `identity` from `device_id`.
    ///
    /// Does not touch the filesystem.
    pub fn original_dir(&self, identity: &AuthUser, device_id: &str) -> Result<PathBuf, AppError> {
        let user_segment = sanitize_path_segment(&identity.id)
            .ok_or_else(|| AppError::Unauthorized("Invalid user id".to_string()))?;
        let device_segment = sanitize_path_segment(device_id).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid device id {:?}", device_id))
        })?;

        Ok(self
            .root
            .join(user_segment)
            .join(ORIGINAL_DIR)
            .join(device_segment))
    }

    /// Resolve and create the destination directory for an upload.
    ///
    /// Creation is recursive and tolerates the directory already existing,
    /// including when another upload creates it concurrently.
    pub async fn resolve_dir(
        &self,
        identity: Option<&AuthUser>,
        device_id: &str,
    ) -> Result<PathBuf, AppError> {
        let user = ensure_can_upload(identity)?;
        let dir = self.original_dir(user, device_id)?;

        fs::create_dir_all(&dir).await.map_err(|e| {
            tracing::error!(path = %dir.display(), error = %e, "Failed to create upload directory");
            AppError::Storage(format!(
                "Failed to create upload directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        Ok(dir)
    }

    /// Generate the stored file name for one upload field.
    pub fn resolve_name(
        &self,
        identity: Option<&AuthUser>,
        role: UploadFieldRole,
        declared_extension: &str,
        original_name: &str,
    ) -> Result<ResolvedName, AppError> {
        ensure_can_upload(identity)?;

        let original_name = repair_form_data_name(original_name);
        let token = Uuid::new_v4();

        let file_name = match role {
            UploadFieldRole::LivePhoto => format!("{}{}", token, LIVE_PHOTO_EXTENSION),
            UploadFieldRole::Asset => format!("{}{}", token, declared_extension),
        };

        Ok(ResolvedName {
            file_name: sanitize_filename(&file_name),
            original_name,
        })
    }
}
