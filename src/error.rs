use axum::{ http::StatusCode, response::{ IntoResponse, Response }, Json };
use serde_json::json;
use thiserror::Error;
use crate::llm::chat::UpstreamError;
use crate::store::StoreError;

/// Failures surfaced to HTTP callers. Every variant renders as
/// `{"detail": "<message>"}`.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid API key")]
    Auth,
    #[error("{0}")]
    Upstream(#[from] UpstreamError),
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Auth => StatusCode::UNAUTHORIZED,
            RelayError::Upstream(_) | RelayError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
