//! Core data structures for feedback records

use crate::error::{FeedbackError, Result};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text layout of stored timestamps. Lexicographic order is chronological.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Store-assigned identifier of a feedback record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackId(pub i64);

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for FeedbackId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// User judgment about a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Judgment {
    /// Prediction confirmed correct
    #[serde(rename = "OUI")]
    Correct,
    /// Prediction flagged incorrect
    #[serde(rename = "NON")]
    Incorrect,
    /// No judgment given ("rien à signaler")
    #[default]
    #[serde(rename = "RAS")]
    Unreported,
}

impl Judgment {
    /// Wire and storage form
    pub fn as_str(&self) -> &'static str {
        match self {
            Judgment::Correct => "OUI",
            Judgment::Incorrect => "NON",
            Judgment::Unreported => "RAS",
        }
    }
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Judgment {
    type Err = FeedbackError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "OUI" => Ok(Judgment::Correct),
            "NON" => Ok(Judgment::Incorrect),
            "RAS" => Ok(Judgment::Unreported),
            other => Err(FeedbackError::MalformedInput(format!(
                "unknown feedback status '{}' (expected OUI, NON or RAS)",
                other
            ))),
        }
    }
}

/// Behaviour when an amendment references an id with no stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmendPolicy {
    /// Report success and hand the id back unchanged
    #[default]
    Ignore,
    /// Fail with `NotFound`
    Reject,
}

/// One stored judgment about a single prediction event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: FeedbackId,
    /// Time of the last write (creation or amendment), UTC
    pub timestamp: NaiveDateTime,
    pub predicted_class: Option<String>,
    pub status: Judgment,
}

/// Optional filters for counting records. `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountFilter {
    pub predicted_class: Option<String>,
    pub status: Option<Judgment>,
}

impl CountFilter {
    /// Match every record
    pub fn all() -> Self {
        Self::default()
    }

    /// Match records with the given status
    pub fn status(status: Judgment) -> Self {
        Self {
            predicted_class: None,
            status: Some(status),
        }
    }

    /// Match records of one class with the given status
    pub fn class_status(class: impl Into<String>, status: Judgment) -> Self {
        Self {
            predicted_class: Some(class.into()),
            status: Some(status),
        }
    }
}

/// Current time truncated to the stored precision
pub fn now_timestamp() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    // Round-trip through the stored layout so reads compare equal to writes
    NaiveDateTime::parse_from_str(&format_timestamp(&now), TIMESTAMP_FORMAT).unwrap_or(now)
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| FeedbackError::StorageUnavailable(format!("Corrupt timestamp '{}': {}", s, e)))
}
