//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! so tests can build the same router.

pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use photovault_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production())?;

    tracing::info!("Configuration loaded and validated successfully");

    // Setup the upload pipeline
    let uploads = storage::setup_upload_sink(&config).await?;
    let state = Arc::new(AppState::new(uploads));

    // Setup routes
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
