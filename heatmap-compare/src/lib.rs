//! heatmap-compare library - side-by-side heatmap comparison service
//!
//! Loads exported birth-data series for several countries or U.S. states,
//! aligns them to a common year range and serves them as JSON or rendered
//! SVG heatmaps.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use heatmap_common::config::HeatmapConfig;

pub mod api;
pub mod compare;
pub mod loader;

pub use loader::LoadError;

use loader::DataSource;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Where series and index documents are read from
    pub source: Arc<dyn DataSource>,
    pub config: Arc<HeatmapConfig>,
}

impl AppState {
    pub fn new(source: Arc<dyn DataSource>, config: HeatmapConfig) -> Self {
        Self {
            source,
            config: Arc::new(config),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let data = Router::new()
        .route("/api/index/:kind", get(api::get_index))
        .route("/api/compare", get(api::compare_countries))
        .route("/api/compare/states", get(api::compare_states))
        .route("/heatmap/:metric/:code", get(api::heatmap_svg));

    let pages = Router::new()
        .route("/", get(api::serve_index))
        .route("/compare", get(api::compare_countries_page))
        .route("/compare/states", get(api::compare_states_page))
        .route("/static/:file", get(api::serve_static))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    Router::new()
        .merge(data)
        .merge(pages)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
