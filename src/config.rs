// Service Configuration
//
// Defines configuration for the HTTP server, the feedback database,
// the token gate, and the feedback/report settings.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::AmendPolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub feedback: FeedbackConfig,
    pub model: ModelConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: ([127, 0, 0, 1], 8000).into(),
        }
    }
}

/// Feedback database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,

    /// Maximum number of pooled connections
    pub pool_size: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            pool_size: 8,
        }
    }
}

/// Token gate in front of the mutating endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Bearer token expected on `/api/feedback` and `/api/predict`.
    /// When unset the gate lets every request through.
    pub token: Option<String>,
}

/// Feedback lifecycle and report settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Labels broken down in the performance report
    pub known_classes: Vec<String>,

    /// What to do when an amendment references an unknown id
    pub amend_missing: AmendPolicy,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            known_classes: vec!["Cat".to_string(), "Dog".to_string()],
            amend_missing: AmendPolicy::default(),
        }
    }
}

/// Metadata reported for the classification model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub version: String,
    pub description: String,

    /// Location of the trained model artifact
    pub path: PathBuf,

    /// Expected input image size as `[width, height]`
    pub input_size: [u32; 2],
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "Cats vs Dogs Classifier".to_string(),
            version: "1.0.0".to_string(),
            description: "CNN model for cat/dog image classification".to_string(),
            path: PathBuf::from("models/cats_dogs_model.keras"),
            input_size: [128, 128],
        }
    }
}

/// Default database location under the platform data directory
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("feedback-monitor")
        .join("feedback.db")
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.pool_size == 0 {
            return Err(ConfigError::ValidationError(
                "database.pool_size must be at least 1".to_string(),
            ));
        }

        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.path cannot be empty".to_string(),
            ));
        }

        if self.feedback.known_classes.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "feedback.known_classes cannot contain empty labels".to_string(),
            ));
        }

        if matches!(self.auth.token.as_deref(), Some(t) if t.is_empty()) {
            return Err(ConfigError::ValidationError(
                "auth.token cannot be empty (omit it to disable the gate)".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.feedback.known_classes, vec!["Cat", "Dog"]);
        assert_eq!(config.feedback.amend_missing, AmendPolicy::Ignore);
        assert_eq!(config.server.addr.port(), 8000);
    }

    #[test]
    fn test_from_toml() {
        let toml_str = r#"
            [server]
            addr = "0.0.0.0:9000"

            [database]
            path = "/tmp/feedback.db"
            pool_size = 4

            [auth]
            token = "secret"

            [feedback]
            known_classes = ["Cat", "Dog", "Bird"]
            amend_missing = "reject"

            [model]
            path = "/srv/models/classifier.keras"
            input_size = [224, 224]
        "#;

        let config = ServiceConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.server.addr.port(), 9000);
        assert_eq!(config.database.path, PathBuf::from("/tmp/feedback.db"));
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.auth.token.as_deref(), Some("secret"));
        assert_eq!(config.feedback.known_classes.len(), 3);
        assert_eq!(config.feedback.amend_missing, AmendPolicy::Reject);
        assert_eq!(
            config.model.path,
            PathBuf::from("/srv/models/classifier.keras")
        );
        assert_eq!(config.model.input_size, [224, 224]);
        // Missing fields fall back to defaults
        assert_eq!(config.model.version, "1.0.0");
    }

    #[test]
    fn test_validate_pool_size_zero() {
        let mut config = ServiceConfig::default();
        config.database.pool_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_empty_class_label() {
        let mut config = ServiceConfig::default();
        config.feedback.known_classes.push("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_token() {
        let mut config = ServiceConfig::default();
        config.auth.token = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let result = ServiceConfig::from_toml("[database\npath = ");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
