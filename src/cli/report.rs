//! Performance report command

use super::helpers::open_store;
use feedback_monitor::{
    config::ServiceConfig,
    error::{FeedbackError, Result},
    PerformanceAggregator,
};
use std::sync::Arc;

/// Print the performance report for the configured database
pub async fn handle(config: &ServiceConfig, json: bool) -> Result<()> {
    // Opening a pool creates the file, so check first rather than leave an empty database behind
    if !config.database.path.exists() {
        return Err(FeedbackError::StorageUnavailable(format!(
            "no feedback database at {} (run `feedback-monitor init-db` first)",
            config.database.path.display()
        )));
    }

    let store = Arc::new(open_store(config)?);
    let aggregator = PerformanceAggregator::new(store, config.feedback.known_classes.clone());

    let report = aggregator.summarize().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }

    Ok(())
}
