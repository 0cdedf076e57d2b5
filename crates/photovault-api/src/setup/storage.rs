//! Upload storage initialization

use anyhow::{Context, Result};
use photovault_core::{Config, MediaTypeFilter};
use photovault_storage::{LocalStorage, Storage, UploadPaths, UploadSink};
use std::sync::Arc;

/// Create the storage root and assemble the upload pipeline on top of it.
pub async fn setup_upload_sink(config: &Config) -> Result<UploadSink> {
    let root = &config.upload_location;

    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(root.clone())
            .await
            .with_context(|| format!("Failed to initialize upload storage at {}", root.display()))?,
    );

    tracing::info!(path = %root.display(), "Local upload storage initialized");

    Ok(UploadSink::new(
        UploadPaths::new(root.clone()),
        MediaTypeFilter::default(),
        storage,
    ))
}
