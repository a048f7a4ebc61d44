//! Comparison endpoints
//!
//! Query strings are parsed leniently: bad values fall back to defaults
//! instead of producing an error response.

use axum::{
    extract::{RawQuery, State},
    response::Html,
    Json,
};

use heatmap_common::model::EntityKind;
use heatmap_common::params::{decode_query, CompareParams, ScaleMode};
use heatmap_common::render::{escape_xml, RenderConfig};

use crate::compare::{comparison_html, load_comparison, theme_param, Comparison};
use crate::AppState;

const PAGE_HTML: &str = include_str!("../../ui/compare.html");

/// Parse a raw query, using the configured scale mode when none is given
pub fn params_from_query(query: Option<&str>, kind: EntityKind, default_scale: ScaleMode) -> CompareParams {
    let pairs = decode_query(query.unwrap_or(""));
    let mut params = CompareParams::from_pairs(&pairs, kind);
    if pairs.get("scale").and_then(|s| ScaleMode::from_str(s)).is_none() {
        params.scale = default_scale;
    }
    params
}

async fn comparison_for(state: &AppState, query: Option<&str>, kind: EntityKind) -> Comparison {
    let params = params_from_query(query, kind, state.config.default_scale);
    load_comparison(state.source.as_ref(), kind, &params).await
}

/// GET /api/compare
pub async fn compare_countries(State(state): State<AppState>, RawQuery(query): RawQuery) -> Json<Comparison> {
    Json(comparison_for(&state, query.as_deref(), EntityKind::Country).await)
}

/// GET /api/compare/states
pub async fn compare_states(State(state): State<AppState>, RawQuery(query): RawQuery) -> Json<Comparison> {
    Json(comparison_for(&state, query.as_deref(), EntityKind::State).await)
}

/// GET /compare
pub async fn compare_countries_page(State(state): State<AppState>, RawQuery(query): RawQuery) -> Html<String> {
    render_page(&state, query.as_deref(), EntityKind::Country).await
}

/// GET /compare/states
pub async fn compare_states_page(State(state): State<AppState>, RawQuery(query): RawQuery) -> Html<String> {
    render_page(&state, query.as_deref(), EntityKind::State).await
}

async fn render_page(state: &AppState, query: Option<&str>, kind: EntityKind) -> Html<String> {
    let pairs = decode_query(query.unwrap_or(""));
    let theme = theme_param(pairs.get("theme").map(String::as_str));
    let comparison = comparison_for(state, query, kind).await;

    let config = RenderConfig {
        width: state.config.width,
        theme,
        ..Default::default()
    };

    let kind_label = match kind {
        EntityKind::Country => "countries",
        EntityKind::State => "states",
    };
    let title = format!(
        "{} comparison ({} {}, {}-{})",
        comparison.metric.display_name(),
        comparison.entities.len(),
        kind_label,
        comparison.year_range.start,
        comparison.year_range.end
    );

    let page = PAGE_HTML
        .replace("<!--THEME-->", theme.as_str())
        .replace("<!--TITLE-->", &escape_xml(&title))
        .replace("<!--CONTENT-->", &comparison_html(&comparison, &config));
    Html(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scale_from_config() {
        let params = params_from_query(Some("countries=usa"), EntityKind::Country, ScaleMode::PerCountry);
        assert_eq!(params.scale, ScaleMode::PerCountry);

        let params = params_from_query(Some("countries=usa&scale=unified"), EntityKind::Country, ScaleMode::PerCountry);
        assert_eq!(params.scale, ScaleMode::Unified);

        let params = params_from_query(Some("scale=bogus"), EntityKind::Country, ScaleMode::PerCountry);
        assert_eq!(params.scale, ScaleMode::PerCountry);
    }

    #[test]
    fn test_states_query_key() {
        let params = params_from_query(Some("states=texas,ohio"), EntityKind::State, ScaleMode::Unified);
        assert_eq!(params.countries, vec!["texas", "ohio"]);
    }

    #[test]
    fn test_missing_query() {
        let params = params_from_query(None, EntityKind::Country, ScaleMode::Unified);
        assert!(params.countries.is_empty());
    }
}
