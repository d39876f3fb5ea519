//! Feedback lifecycle and performance reporting
//!
//! - **FeedbackRecorder**: creates a placeholder record per prediction and
//!   amends it when the user judges the prediction
//! - **PerformanceAggregator**: counts stored judgments and turns the share
//!   of negative feedback into a verdict about the model

pub mod performance;
pub mod recorder;

pub use performance::{ClassBreakdown, PerformanceAggregator, PerformanceReport, Verdict};
pub use recorder::{FeedbackRecorder, FeedbackSubmission};
