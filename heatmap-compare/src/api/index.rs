//! Entity index endpoint

use axum::{
    extract::{Path, State},
    Json,
};

use heatmap_common::model::{EntityIndex, EntityKind};

use super::ApiError;
use crate::loader::fetch_index;
use crate::AppState;

/// GET /api/index/:kind
///
/// `kind` is `countries` or `states`.
pub async fn get_index(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<EntityIndex>, ApiError> {
    let kind = EntityKind::from_str(&kind).ok_or(ApiError::UnknownKind(kind))?;
    let index = fetch_index(state.source.as_ref(), kind).await?;
    Ok(Json(index))
}
