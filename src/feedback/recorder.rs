//! Feedback recording.
//!
//! A prediction first gets a placeholder record (`RAS`); the caller keeps the
//! returned id and resubmits with it whenever the user gives or changes a
//! judgment, which amends the same record in place.

use crate::error::{FeedbackError, Result};
use crate::storage::FeedbackStore;
use crate::types::{now_timestamp, AmendPolicy, FeedbackId, Judgment};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One feedback submission
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackSubmission {
    /// Label the model reported. Stored verbatim, never checked against the class set.
    pub prediction: Option<String>,
    pub judgment: Judgment,
    /// Id returned by an earlier submission; `None` starts a new record
    pub prior_id: Option<FeedbackId>,
}

/// Routes submissions to insert or amend
pub struct FeedbackRecorder {
    store: Arc<dyn FeedbackStore>,
    amend_policy: AmendPolicy,
}

impl FeedbackRecorder {
    pub fn new(store: Arc<dyn FeedbackStore>, amend_policy: AmendPolicy) -> Self {
        Self {
            store,
            amend_policy,
        }
    }

    /// Record a submission and return the id to reuse for later amendments
    pub async fn record(&self, submission: FeedbackSubmission) -> Result<FeedbackId> {
        let now = now_timestamp();
        let prediction = submission.prediction.as_deref();

        match submission.prior_id {
            None => {
                let id = self
                    .store
                    .insert(now, prediction, submission.judgment)
                    .await?;
                info!(
                    "Feedback record created: {} ({:?}, {})",
                    id, prediction, submission.judgment
                );
                Ok(id)
            }
            Some(prior_id) => {
                let matched = self
                    .store
                    .amend(prior_id, now, prediction, submission.judgment)
                    .await?;

                if matched {
                    debug!(
                        "Feedback record amended: {} ({:?}, {})",
                        prior_id, prediction, submission.judgment
                    );
                    return Ok(prior_id);
                }

                match self.amend_policy {
                    AmendPolicy::Ignore => {
                        warn!("Amendment for unknown feedback record {} ignored", prior_id);
                        Ok(prior_id)
                    }
                    AmendPolicy::Reject => Err(FeedbackError::NotFound(prior_id.0)),
                }
            }
        }
    }
}
