//! Error conversion from FeedbackError to HTTP responses

use crate::error::FeedbackError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// JSON body returned for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl FeedbackError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            FeedbackError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            FeedbackError::NotFound(_) => StatusCode::NOT_FOUND,
            FeedbackError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            FeedbackError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            FeedbackError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            FeedbackError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FeedbackError::Serialization(_)
            | FeedbackError::Config(_)
            | FeedbackError::Io(_)
            | FeedbackError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FeedbackError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status, self);
        }

        (
            status,
            Json(ErrorBody {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}
