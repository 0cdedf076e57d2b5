//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p photovault-api --test upload_test`.

#![allow(dead_code)]

pub mod auth;

use axum_test::TestServer;
use photovault_api::constants;
use photovault_api::setup::{routes, storage};
use photovault_api::state::AppState;
use photovault_core::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// API path prefix for tests (e.g. `/api/asset/upload`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus the scratch upload root it writes to.
pub struct TestApp {
    pub server: TestServer,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn root(&self) -> &Path {
        self.upload_dir.path()
    }

    /// Every regular file below the upload root.
    pub fn stored_files(&self) -> Vec<PathBuf> {
        fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
            for entry in std::fs::read_dir(dir).expect("read upload dir") {
                let path = entry.expect("dir entry").path();
                if path.is_dir() {
                    walk(&path, out);
                } else {
                    out.push(path);
                }
            }
        }

        let mut files = Vec::new();
        walk(self.root(), &mut files);
        files
    }
}

pub fn create_test_config(upload_location: &Path) -> Config {
    Config {
        server_port: 0,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        jwt_secret: auth::TEST_JWT_SECRET.to_string(),
        upload_location: upload_location.to_path_buf(),
        max_upload_size_bytes: 1024 * 1024,
    }
}

/// Setup test app with an isolated upload root.
pub async fn setup_test_app() -> TestApp {
    let upload_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = create_test_config(upload_dir.path());

    let uploads = storage::setup_upload_sink(&config)
        .await
        .expect("Failed to create upload sink");
    let state = Arc::new(AppState::new(uploads));
    let router = routes::setup_routes(&config, state).expect("Failed to build router");

    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp { server, upload_dir }
}
