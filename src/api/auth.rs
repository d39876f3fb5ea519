//! Token gate for mutating endpoints

use super::server::AppState;
use crate::error::FeedbackError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Decides whether a bearer token grants access
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: Option<&str>) -> bool;
}

/// Accepts exactly one configured token
pub struct StaticTokenVerifier {
    digest: [u8; 32],
}

impl StaticTokenVerifier {
    pub fn new(token: &str) -> Self {
        Self {
            digest: Sha256::digest(token.as_bytes()).into(),
        }
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: Option<&str>) -> bool {
        let Some(token) = token else {
            return false;
        };
        // Compare fixed-size digests so timing does not depend on the secret's length
        let candidate: [u8; 32] = Sha256::digest(token.as_bytes()).into();
        candidate
            .iter()
            .zip(self.digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

/// Lets every request through (no token configured)
pub struct OpenGate;

impl TokenVerifier for OpenGate {
    fn verify(&self, _token: Option<&str>) -> bool {
        true
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Middleware rejecting requests the verifier does not accept
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, FeedbackError> {
    if !state.verifier.verify(bearer_token(&request)) {
        debug!("Rejected request to {}: bad or missing token", request.uri().path());
        return Err(FeedbackError::Unauthorized(
            "invalid or missing bearer token".to_string(),
        ));
    }
    Ok(next.run(request).await)
}
