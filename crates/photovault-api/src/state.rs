//! Application state shared by all handlers.

use photovault_storage::UploadSink;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Upload pipeline; immutable and shared across concurrent requests
    pub uploads: Arc<UploadSink>,
}

impl AppState {
    pub fn new(uploads: UploadSink) -> Self {
        Self {
            uploads: Arc::new(uploads),
        }
    }
}
