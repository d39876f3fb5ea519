//! HTTP API server for feedback collection and performance reports

use super::auth::{require_token, TokenVerifier};
use crate::config::{FeedbackConfig, ModelConfig};
use crate::error::FeedbackError;
use crate::feedback::{FeedbackRecorder, FeedbackSubmission, PerformanceAggregator};
use crate::services::Classifier;
use crate::storage::FeedbackStore;
use crate::types::{FeedbackId, FeedbackRecord, Judgment};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{net::SocketAddr, sync::Arc, time::Instant};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

/// Header carrying the original file name of an uploaded image
pub const FILENAME_HEADER: &str = "x-filename";

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Server address
    pub addr: SocketAddr,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            addr: ([127, 0, 0, 1], 8000).into(),
        }
    }
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub(crate) store: Arc<dyn FeedbackStore>,
    pub(crate) recorder: Arc<FeedbackRecorder>,
    pub(crate) aggregator: Arc<PerformanceAggregator>,
    pub(crate) classifier: Arc<dyn Classifier>,
    pub(crate) verifier: Arc<dyn TokenVerifier>,
    pub(crate) model: Arc<ModelConfig>,
    pub(crate) classes: Arc<Vec<String>>,
    pub(crate) instance_id: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn FeedbackStore>,
        classifier: Arc<dyn Classifier>,
        verifier: Arc<dyn TokenVerifier>,
        feedback: &FeedbackConfig,
        model: ModelConfig,
    ) -> Self {
        let recorder = FeedbackRecorder::new(store.clone(), feedback.amend_missing);
        let aggregator =
            PerformanceAggregator::new(store.clone(), feedback.known_classes.clone());

        Self {
            store,
            recorder: Arc::new(recorder),
            aggregator: Arc::new(aggregator),
            classifier,
            verifier,
            model: Arc::new(model),
            classes: Arc::new(feedback.known_classes.clone()),
            instance_id: uuid::Uuid::new_v4().to_string()[..8].to_string(),
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/api/feedback", post(record_feedback_handler))
        .route("/api/predict", post(predict_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/api/feedback/:id", get(get_feedback_handler))
        .route("/performance", get(performance_handler))
        .route("/api/info", get(info_handler))
        .route("/health", get(health_handler))
        .merge(gated)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Create new API server
    pub fn new(config: ApiServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Get instance ID
    pub fn instance_id(&self) -> &str {
        &self.state.instance_id
    }

    /// Serve until Ctrl-C
    pub async fn serve(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;
        info!(
            "API server [{}] listening on http://{}",
            self.state.instance_id,
            listener.local_addr()?
        );
        if !self.state.classifier.is_loaded() {
            warn!("No classification model loaded; /api/predict will answer 503");
        }

        let router = build_router(self.state);
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    debug!("Shutdown signal received");
}

/// `updated_id` as sent by the front end: `false` before the first save, an id afterwards.
/// Ids start at 1, so `0` also means "no record yet".
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum PriorIdField {
    Flag(bool),
    Id(i64),
}

/// Record feedback request
#[derive(Debug, Deserialize)]
pub struct RecordFeedbackRequest {
    feedback: String,
    #[serde(default)]
    prediction: Option<String>,
    #[serde(default)]
    updated_id: Option<PriorIdField>,
}

impl TryFrom<RecordFeedbackRequest> for FeedbackSubmission {
    type Error = FeedbackError;

    fn try_from(req: RecordFeedbackRequest) -> Result<Self, Self::Error> {
        let judgment: Judgment = req.feedback.parse()?;
        let prior_id = match req.updated_id {
            None | Some(PriorIdField::Flag(false)) => None,
            Some(PriorIdField::Id(id)) if id <= 0 => None,
            Some(PriorIdField::Id(id)) => Some(FeedbackId(id)),
            Some(PriorIdField::Flag(true)) => {
                return Err(FeedbackError::MalformedInput(
                    "updated_id must be false or a record id".to_string(),
                ))
            }
        };

        Ok(FeedbackSubmission {
            prediction: req.prediction,
            judgment,
            prior_id,
        })
    }
}

/// Record feedback response
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordFeedbackResponse {
    pub status: String,
    pub updated_id: FeedbackId,
}

async fn record_feedback_handler(
    State(state): State<AppState>,
    payload: Result<Json<RecordFeedbackRequest>, JsonRejection>,
) -> Result<Json<RecordFeedbackResponse>, FeedbackError> {
    let Json(req) = payload.map_err(|e| FeedbackError::MalformedInput(e.body_text()))?;
    let submission = FeedbackSubmission::try_from(req)?;

    let id = state.recorder.record(submission).await?;

    Ok(Json(RecordFeedbackResponse {
        status: "ok".to_string(),
        updated_id: id,
    }))
}

async fn get_feedback_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FeedbackRecord>, FeedbackError> {
    state
        .store
        .get(FeedbackId(id))
        .await?
        .map(Json)
        .ok_or(FeedbackError::NotFound(id))
}

/// Report rendering requested by the client
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ReportFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Deserialize)]
struct PerformanceQuery {
    #[serde(default)]
    format: ReportFormat,
}

async fn performance_handler(
    State(state): State<AppState>,
    Query(query): Query<PerformanceQuery>,
) -> Result<Response, FeedbackError> {
    let report = state.aggregator.summarize().await?;

    Ok(match query.format {
        ReportFormat::Json => Json(report).into_response(),
        ReportFormat::Text => report.to_string().into_response(),
    })
}

/// Prediction response
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub filename: String,
    pub prediction: String,
    pub confidence: String,
    pub probabilities: BTreeMap<String, String>,
}

fn as_percent(p: f32) -> String {
    format!("{:.2}%", p * 100.0)
}

async fn predict_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PredictionResponse>, FeedbackError> {
    if !state.classifier.is_loaded() {
        return Err(FeedbackError::ModelUnavailable);
    }

    let is_image = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("image/"));
    if !is_image {
        return Err(FeedbackError::MalformedInput(
            "invalid image format".to_string(),
        ));
    }

    let filename = headers
        .get(FILENAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("upload")
        .to_string();

    let start = Instant::now();
    let classifier = state.classifier.clone();
    let result = tokio::task::spawn_blocking(move || classifier.predict(&body))
        .await
        .map_err(|e| FeedbackError::Prediction(format!("inference task failed: {}", e)))
        .and_then(|r| r);
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(prediction) => {
            info!(
                filename = %filename,
                prediction = %prediction.label,
                confidence = %as_percent(prediction.confidence),
                inference_time_ms = elapsed_ms,
                success = true,
                "Inference completed"
            );

            Ok(Json(PredictionResponse {
                filename,
                confidence: as_percent(prediction.confidence),
                probabilities: prediction
                    .probabilities
                    .iter()
                    .map(|(label, p)| (label.to_lowercase(), as_percent(*p)))
                    .collect(),
                prediction: prediction.label,
            }))
        }
        Err(e) => {
            warn!(
                filename = %filename,
                inference_time_ms = elapsed_ms,
                success = false,
                "Inference failed: {}",
                e
            );
            Err(e)
        }
    }
}

/// Model metadata response
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub model_path: String,
    pub input_size: String,
    pub classes: Vec<String>,
    pub parameters: u64,
    pub model_loaded: bool,
}

async fn info_handler(State(state): State<AppState>) -> Json<ModelInfoResponse> {
    let loaded = state.classifier.is_loaded();
    Json(ModelInfoResponse {
        name: state.model.name.clone(),
        version: state.model.version.clone(),
        description: state.model.description.clone(),
        model_path: state.model.path.display().to_string(),
        input_size: format!(
            "{}x{}",
            state.model.input_size[0], state.model.input_size[1]
        ),
        classes: state.classes.as_ref().clone(),
        parameters: if loaded {
            state.classifier.parameter_count()
        } else {
            0
        },
        model_loaded: loaded,
    })
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub instance_id: String,
    pub model_loaded: bool,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        instance_id: state.instance_id.clone(),
        model_loaded: state.classifier.is_loaded(),
    })
}
