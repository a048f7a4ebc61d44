//! Health check endpoint
//!
//! Reports whether the data root answers, using the country index as the
//! probe document.

use std::time::Duration;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use heatmap_common::model::EntityKind;

use crate::loader::fetch_index;
use crate::AppState;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" when the data root answers, "degraded" otherwise
    pub status: String,
    pub module: String,
    pub version: String,
    pub data_root: String,
    pub data_source_reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /health
///
/// Always 200; an unreachable data root only degrades the status.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let probe = tokio::time::timeout(PROBE_TIMEOUT, fetch_index(state.source.as_ref(), EntityKind::Country)).await;
    let error = match probe {
        Ok(Ok(_)) => None,
        Ok(Err(e)) => Some(e.to_string()),
        Err(_) => Some(format!("no answer within {}s", PROBE_TIMEOUT.as_secs())),
    };
    if let Some(e) = &error {
        warn!(data_root = %state.source.describe(), error = %e, "Health probe failed");
    }

    Json(HealthResponse {
        status: if error.is_none() { "ok" } else { "degraded" }.to_string(),
        module: "heatmap-compare".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data_root: state.source.describe(),
        data_source_reachable: error.is_none(),
        error,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
