//! Performance report derived from stored feedback.

use crate::error::Result;
use crate::storage::FeedbackStore;
use crate::types::{CountFilter, Judgment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Ratio (percent) at which the model stops counting as performing well
pub const ADEQUATE_THRESHOLD: f64 = 30.0;

/// Ratio (percent) at which retraining is recommended
pub const UNDERPERFORMS_THRESHOLD: f64 = 50.0;

/// Qualitative reading of the bad-feedback ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    PerformsWell,
    Adequate,
    Underperforms,
}

impl Verdict {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= UNDERPERFORMS_THRESHOLD {
            Verdict::Underperforms
        } else if ratio >= ADEQUATE_THRESHOLD {
            Verdict::Adequate
        } else {
            Verdict::PerformsWell
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Verdict::PerformsWell => "The model performs well.",
            Verdict::Adequate => {
                "The model performs adequately but shows room for improvement."
            }
            Verdict::Underperforms => "The model underperforms; retraining is recommended.",
        }
    }
}

/// Positive/negative counts for one predicted class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassBreakdown {
    #[serde(rename = "positifs")]
    pub positives: u64,
    #[serde(rename = "negatifs")]
    pub negatives: u64,
}

/// Summary of the feedback store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    #[serde(rename = "total_feedback")]
    pub total: u64,
    #[serde(rename = "positifs")]
    pub positives: u64,
    #[serde(rename = "negatifs")]
    pub negatives: u64,
    #[serde(rename = "rien_a_signaler")]
    pub unreported: u64,
    pub per_class: BTreeMap<String, ClassBreakdown>,
    /// Share of records marked incorrect, in percent
    #[serde(rename = "bad_feedback_pourcentage")]
    pub bad_feedback_ratio: f64,
    pub verdict: Verdict,
    pub message: String,
}

impl PerformanceReport {
    /// Build a report from raw counts
    pub fn from_counts(
        total: u64,
        positives: u64,
        negatives: u64,
        unreported: u64,
        per_class: BTreeMap<String, ClassBreakdown>,
    ) -> Self {
        let bad_feedback_ratio = bad_feedback_ratio(negatives, total);
        let verdict = Verdict::from_ratio(bad_feedback_ratio);

        Self {
            total,
            positives,
            negatives,
            unreported,
            per_class,
            bad_feedback_ratio,
            verdict,
            message: verdict.message().to_string(),
        }
    }
}

/// Percentage of negative feedback; 0 for an empty store
pub fn bad_feedback_ratio(negatives: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    // Scale before dividing: 3 / 10 * 100 is 30.000000000000004 in f64
    negatives as f64 * 100.0 / total as f64
}

impl fmt::Display for PerformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Performance report")?;
        writeln!(f, "==================")?;
        writeln!(f, "Total feedback   : {}", self.total)?;
        writeln!(f, "Nothing reported : {}", self.unreported)?;
        writeln!(
            f,
            "Positive         : {} | Negative : {}",
            self.positives, self.negatives
        )?;
        writeln!(f, "Negative rate    : {:.2}%", self.bad_feedback_ratio)?;
        writeln!(f)?;
        writeln!(f, "{:<12} {:>9} {:>9}", "Class", "Positive", "Negative")?;
        for (class, counts) in &self.per_class {
            writeln!(
                f,
                "{:<12} {:>9} {:>9}",
                class, counts.positives, counts.negatives
            )?;
        }
        writeln!(f)?;
        write!(f, "{}", self.message)
    }
}

/// Computes performance reports from a feedback store
pub struct PerformanceAggregator {
    store: Arc<dyn FeedbackStore>,
    classes: Vec<String>,
}

impl PerformanceAggregator {
    pub fn new(store: Arc<dyn FeedbackStore>, classes: Vec<String>) -> Self {
        Self { store, classes }
    }

    /// Summarize the current store contents
    pub async fn summarize(&self) -> Result<PerformanceReport> {
        let mut filters = vec![
            CountFilter::all(),
            CountFilter::status(Judgment::Correct),
            CountFilter::status(Judgment::Incorrect),
            CountFilter::status(Judgment::Unreported),
        ];
        for class in &self.classes {
            filters.push(CountFilter::class_status(class.clone(), Judgment::Correct));
            filters.push(CountFilter::class_status(class.clone(), Judgment::Incorrect));
        }

        let counts = self.store.count_many(&filters).await?;
        let (totals, class_counts) = counts.split_at(4);

        let per_class = self
            .classes
            .iter()
            .zip(class_counts.chunks_exact(2))
            .map(|(class, pair)| {
                (
                    class.clone(),
                    ClassBreakdown {
                        positives: pair[0],
                        negatives: pair[1],
                    },
                )
            })
            .collect();

        let report =
            PerformanceReport::from_counts(totals[0], totals[1], totals[2], totals[3], per_class);

        debug!(
            "Performance summary: total={} negatives={} ratio={:.2}",
            report.total, report.negatives, report.bad_feedback_ratio
        );
        Ok(report)
    }
}
