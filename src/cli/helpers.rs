//! Shared helper functions for CLI commands

use feedback_monitor::{config::ServiceConfig, error::Result, SqliteFeedbackStore};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file picked up from the working directory when `--config` is absent
pub const LOCAL_CONFIG_FILE: &str = "feedback-monitor.toml";

/// Load configuration from the given file, the local file, or defaults,
/// then apply the database path override
pub fn load_config(config_path: Option<&Path>, db_path: Option<PathBuf>) -> Result<ServiceConfig> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    let mut config = match config_path {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            ServiceConfig::from_file(path)?
        }
        None if local.exists() => {
            debug!("Loading configuration from {}", local.display());
            ServiceConfig::from_file(&local)?
        }
        None => {
            debug!("No configuration file, using defaults");
            ServiceConfig::default()
        }
    };

    if let Some(db_path) = db_path {
        config.database.path = db_path;
    }
    config.validate()?;

    Ok(config)
}

/// Open the feedback store described by the configuration
pub fn open_store(config: &ServiceConfig) -> Result<SqliteFeedbackStore> {
    debug!("Using database: {}", config.database.path.display());
    SqliteFeedbackStore::with_pool_size(&config.database.path, config.database.pool_size)
}
