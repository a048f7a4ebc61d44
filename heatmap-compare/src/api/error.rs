//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::loader::LoadError;

/// Errors surfaced to HTTP clients as `{"error": message}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unknown entity kind: {0}")]
    UnknownKind(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error(transparent)]
    Load(#[from] LoadError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::UnknownKind(_) | ApiError::UnknownMetric(_) => StatusCode::NOT_FOUND,
            ApiError::Load(LoadError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Load(LoadError::InvalidCode(_)) => StatusCode::BAD_REQUEST,
            ApiError::Load(LoadError::Parse { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Load(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
