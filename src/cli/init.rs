//! Database initialization command

use super::helpers::open_store;
use feedback_monitor::{config::ServiceConfig, error::Result};
use tracing::debug;

/// Handle database initialization command
pub async fn handle(config: &ServiceConfig) -> Result<()> {
    debug!("Initializing database...");

    let store = open_store(config)?;
    store.init_schema().await?;

    println!("Database initialized: {}", store.path().display());
    Ok(())
}
