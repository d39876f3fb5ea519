//! Image classification model seam
//!
//! The model itself lives outside this crate. The API only needs to know
//! whether one is loaded and to turn image bytes into a label.

use crate::error::{FeedbackError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Model output for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Winning label
    pub label: String,
    /// Probability of the winning label, in [0, 1]
    pub confidence: f32,
    /// Probability per label, in [0, 1]
    pub probabilities: BTreeMap<String, f32>,
}

/// Classification model interface
#[cfg_attr(test, mockall::automock)]
pub trait Classifier: Send + Sync {
    /// Whether a model is loaded and ready to predict
    fn is_loaded(&self) -> bool;

    /// Classify raw image bytes
    fn predict(&self, image: &[u8]) -> Result<Prediction>;

    /// Number of trainable parameters, 0 when unknown
    fn parameter_count(&self) -> u64;
}

/// Stand-in used when no model is wired into the service
#[derive(Debug, Default, Clone, Copy)]
pub struct UnloadedClassifier;

impl Classifier for UnloadedClassifier {
    fn is_loaded(&self) -> bool {
        false
    }

    fn predict(&self, _image: &[u8]) -> Result<Prediction> {
        Err(FeedbackError::ModelUnavailable)
    }

    fn parameter_count(&self) -> u64 {
        0
    }
}
