//! Single heatmap as SVG

use axum::{
    extract::{Path, RawQuery, State},
    http::header,
    response::{IntoResponse, Response},
};

use heatmap_common::model::{EntityKind, Metric};
use heatmap_common::params::decode_query;
use heatmap_common::render::{HeatmapRenderer, RenderConfig, SvgTarget};
use heatmap_common::YearRange;

use super::ApiError;
use crate::compare::theme_param;
use crate::loader::fetch_series;
use crate::AppState;

/// GET /heatmap/:metric/:code
///
/// Optional query: `kind=states`, `yearStart`, `yearEnd`, `theme`. The
/// series' own color scale is used.
pub async fn heatmap_svg(
    State(state): State<AppState>,
    Path((metric, code)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let metric = Metric::from_slug(&metric).ok_or(ApiError::UnknownMetric(metric))?;
    let code = code.trim_end_matches(".svg").to_string();

    let pairs = decode_query(query.as_deref().unwrap_or(""));
    let kind = pairs
        .get("kind")
        .and_then(|k| EntityKind::from_str(k))
        .unwrap_or(EntityKind::Country);
    let theme = theme_param(pairs.get("theme").map(String::as_str));

    let series = fetch_series(state.source.as_ref(), kind, metric, &code).await?;

    let year_start = pairs.get("yearStart").and_then(|y| y.trim().parse::<i32>().ok());
    let year_end = pairs.get("yearEnd").and_then(|y| y.trim().parse::<i32>().ok());
    let filter = match (series.year_span(), year_start, year_end) {
        (_, None, None) => None,
        (Some(span), start, end) => Some(YearRange::new(
            start.unwrap_or(span.start),
            end.unwrap_or(span.end),
        )),
        (None, _, _) => None,
    };

    let config = RenderConfig {
        width: state.config.width,
        theme,
        ..Default::default()
    };
    let mut renderer = HeatmapRenderer::new(SvgTarget::new(), series.clone(), config, None);
    if filter.is_some() {
        renderer.update(series, filter);
    }

    Ok((
        [(header::CONTENT_TYPE, "image/svg+xml")],
        renderer.target().svg(),
    )
        .into_response())
}
