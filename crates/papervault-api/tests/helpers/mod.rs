//! Test helpers: build AppState and router for integration tests.
//!
//! Stores are in-memory and payloads land in a temporary directory, so the
//! suites need neither Postgres nor S3. Run with `cargo test -p papervault-api`.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::TestServer;
use papervault_api::setup::routes;
use papervault_api::state::{AppState, Stores};
use papervault_core::{Config, PaperVaultConfig, StorageBackend};
use papervault_db::{InMemoryFeedbackStore, InMemoryPaperStore, InMemorySubjectStore};
use papervault_services::{DisabledModeration, LocalStorage, ModerationGate};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "s3cret-admin-password";

/// Test application: server plus handles on the in-memory stores.
pub struct TestApp {
    pub server: TestServer,
    pub papers: Arc<InMemoryPaperStore>,
    pub feedback: Arc<InMemoryFeedbackStore>,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of payload files currently on disk.
    pub fn stored_file_count(&self) -> usize {
        count_files(self.temp_dir.path())
    }
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| {
                    let path = entry.path();
                    if path.is_dir() {
                        count_files(&path)
                    } else {
                        1
                    }
                })
                .sum()
        })
        .unwrap_or(0)
}

/// Setup test app with moderation disabled.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(Arc::new(DisabledModeration)).await
}

pub async fn setup_test_app_with(moderation: Arc<dyn ModerationGate>) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path());

    let storage = LocalStorage::new(temp_dir.path(), "/uploads".to_string())
        .await
        .expect("Failed to create local storage");

    let papers = Arc::new(InMemoryPaperStore::new());
    let feedback = Arc::new(InMemoryFeedbackStore::new());
    let stores = Stores {
        papers: papers.clone(),
        feedback: feedback.clone(),
        subjects: Arc::new(InMemorySubjectStore::new()),
    };

    let state = Arc::new(AppState::new(
        config.clone(),
        stores,
        Arc::new(storage),
        moderation,
    ));

    let app = routes::setup_routes(&config, state).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        papers,
        feedback,
        temp_dir,
    }
}

fn create_test_config(storage_path: &Path) -> Config {
    Config(Box::new(PaperVaultConfig {
        database_url: "postgresql://unused".to_string(),
        storage_backend: Some(StorageBackend::Local),
        local_storage_path: Some(storage_path.to_string_lossy().into_owned()),
        local_storage_base_url: Some("/uploads".to_string()),
        storage_upload_retries: 0,
        admin_username: Some(ADMIN_USERNAME.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        max_file_size_bytes: 1024 * 1024,
        max_files_per_upload: 5,
        ..PaperVaultConfig::default()
    }))
}
