//! Feedback Monitor - prediction feedback for an image classification service
//!
//! Collects user judgments about the model's predictions and reports how
//! often users flag them as wrong.
//!
//! # Architecture
//!
//! - **Types**: Core data structures (FeedbackRecord, Judgment, ...)
//! - **Storage**: SQLite feedback store behind a connection pool
//! - **Feedback**: Create-then-amend recorder and the performance aggregator
//! - **Services**: Classification model seam
//! - **API**: axum HTTP server
//!
//! # Example
//!
//! ```ignore
//! use feedback_monitor::{FeedbackRecorder, FeedbackSubmission, Judgment, SqliteFeedbackStore};
//!
//! #[tokio::main]
//! async fn main() -> feedback_monitor::Result<()> {
//!     let store = Arc::new(SqliteFeedbackStore::open("feedback.db")?);
//!     store.init_schema().await?;
//!     let recorder = FeedbackRecorder::new(store, AmendPolicy::Ignore);
//!
//!     // Placeholder record right after the prediction
//!     let id = recorder.record(FeedbackSubmission {
//!         prediction: Some("Cat".to_string()),
//!         judgment: Judgment::Unreported,
//!         prior_id: None,
//!     }).await?;
//!
//!     // The user says the prediction was wrong
//!     recorder.record(FeedbackSubmission {
//!         prediction: Some("Cat".to_string()),
//!         judgment: Judgment::Incorrect,
//!         prior_id: Some(id),
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod feedback;
pub mod services;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use config::ServiceConfig;
pub use error::{FeedbackError, Result};
pub use feedback::{
    FeedbackRecorder, FeedbackSubmission, PerformanceAggregator, PerformanceReport, Verdict,
};
pub use services::{Classifier, Prediction, UnloadedClassifier};
pub use storage::{sqlite::SqliteFeedbackStore, FeedbackStore};
pub use types::{AmendPolicy, CountFilter, FeedbackId, FeedbackRecord, Judgment};
