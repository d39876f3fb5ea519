//! Common test utilities and helpers

#![allow(dead_code)]

use feedback_monitor::{
    api::{build_router, AppState, OpenGate, TokenVerifier},
    config::{FeedbackConfig, ModelConfig},
    SqliteFeedbackStore, UnloadedClassifier,
};
use std::sync::Arc;
use tempfile::TempDir;

/// Create a file-backed store in a temporary directory.
///
/// Uses a file instead of `:memory:` because every pooled connection would
/// otherwise see its own empty database.
pub async fn create_test_store() -> (TempDir, Arc<SqliteFeedbackStore>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = SqliteFeedbackStore::open(temp_dir.path().join("feedback.db"))
        .expect("Failed to create test store");
    store.init_schema().await.expect("Failed to init schema");
    (temp_dir, Arc::new(store))
}

/// Create a router over a fresh store
pub async fn create_test_app(
    verifier: Arc<dyn TokenVerifier>,
    feedback: FeedbackConfig,
) -> (TempDir, Arc<SqliteFeedbackStore>, axum::Router) {
    let (temp_dir, store) = create_test_store().await;
    let state = AppState::new(
        store.clone(),
        Arc::new(UnloadedClassifier),
        verifier,
        &feedback,
        ModelConfig::default(),
    );
    (temp_dir, store, build_router(state))
}

/// Router with an open gate and default settings
pub async fn create_open_app() -> (TempDir, Arc<SqliteFeedbackStore>, axum::Router) {
    create_test_app(Arc::new(OpenGate), FeedbackConfig::default()).await
}
