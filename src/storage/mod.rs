//! Storage layer for feedback records
//!
//! Provides the store abstraction used by the recorder and the aggregator,
//! and its SQLite implementation.

pub mod schema;
pub mod sqlite;

use crate::error::Result;
use crate::types::{CountFilter, FeedbackId, FeedbackRecord, Judgment};
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Feedback store trait. Every call is one atomic transaction.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Append a new record and return its assigned id
    async fn insert(
        &self,
        timestamp: NaiveDateTime,
        predicted_class: Option<&str>,
        status: Judgment,
    ) -> Result<FeedbackId>;

    /// Overwrite class, status and timestamp of an existing record.
    ///
    /// Returns `false` when no record has that id; nothing is written then.
    async fn amend(
        &self,
        id: FeedbackId,
        timestamp: NaiveDateTime,
        predicted_class: Option<&str>,
        status: Judgment,
    ) -> Result<bool>;

    /// Count records matching the filter
    async fn count(&self, filter: &CountFilter) -> Result<u64>;

    /// Count several filters against the same snapshot
    async fn count_many(&self, filters: &[CountFilter]) -> Result<Vec<u64>> {
        let mut counts = Vec::with_capacity(filters.len());
        for filter in filters {
            counts.push(self.count(filter).await?);
        }
        Ok(counts)
    }

    /// Fetch a record by id
    async fn get(&self, id: FeedbackId) -> Result<Option<FeedbackRecord>>;
}
