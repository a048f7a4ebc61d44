//! HTTP API handlers for heatmap-compare

pub mod buildinfo;
pub mod compare;
pub mod error;
pub mod health;
pub mod heatmap;
pub mod index;
pub mod ui;

pub use buildinfo::get_build_info;
pub use compare::{compare_countries, compare_countries_page, compare_states, compare_states_page};
pub use error::ApiError;
pub use health::health_routes;
pub use heatmap::heatmap_svg;
pub use index::get_index;
pub use ui::{serve_index, serve_static};
