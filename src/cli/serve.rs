//! HTTP API server command

use super::helpers::open_store;
use feedback_monitor::{
    api::{ApiServer, ApiServerConfig, AppState, OpenGate, StaticTokenVerifier, TokenVerifier},
    config::ServiceConfig,
    error::Result,
    UnloadedClassifier,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Handle API server startup command
pub async fn handle(config: ServiceConfig) -> Result<()> {
    debug!("Starting HTTP API server...");

    let store = open_store(&config)?;
    store.init_schema().await?;

    let verifier: Arc<dyn TokenVerifier> = match config.auth.token.as_deref() {
        Some(token) => Arc::new(StaticTokenVerifier::new(token)),
        None => {
            warn!("No API token configured; feedback and predict endpoints are open");
            Arc::new(OpenGate)
        }
    };

    let state = AppState::new(
        Arc::new(store),
        Arc::new(UnloadedClassifier),
        verifier,
        &config.feedback,
        config.model.clone(),
    );

    println!();
    println!("Feedback Monitor API Server");
    println!();
    println!("   Address: http://{}", config.server.addr);
    println!("   Database: {}", config.database.path.display());
    println!();
    println!("   Endpoints:");
    println!("   - POST /api/feedback - Create or amend feedback");
    println!("   - GET  /api/feedback/:id - Show a feedback record");
    println!("   - GET  /performance - Performance report (?format=text)");
    println!("   - POST /api/predict - Classify an image");
    println!("   - GET  /api/info - Model information");
    println!("   - GET  /health - Health check");
    println!();

    let server = ApiServer::new(
        ApiServerConfig {
            addr: config.server.addr,
        },
        state,
    );
    server.serve().await?;

    Ok(())
}
