//! HTTP API for feedback collection and performance reporting
//!
//! Provides:
//! - Feedback create/amend endpoint (token-gated)
//! - Performance report as JSON or text
//! - Prediction endpoint backed by the classifier seam (token-gated)
//! - Model info and health checks

pub mod auth;
pub mod error;
pub mod server;

pub use auth::{OpenGate, StaticTokenVerifier, TokenVerifier};
pub use error::ErrorBody;
pub use server::{build_router, ApiServer, ApiServerConfig, AppState};
