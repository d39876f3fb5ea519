//! Services consumed by the feedback API
//!
//! Provides the classification model seam.

pub mod classifier;

pub use classifier::{Classifier, Prediction, UnloadedClassifier};
