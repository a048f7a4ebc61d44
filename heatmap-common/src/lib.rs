//! # Heatmap Common Library
//!
//! Shared code for the births heatmap services including:
//! - Series data model (cells, metadata, color-scale configuration)
//! - Color scales and named interpolation schemes
//! - Year-range alignment and unified color scales for comparisons
//! - Comparison query-parameter parsing
//! - State-document normalization
//! - Observable values for cross-component state
//! - Heatmap rendering (SVG backend)
//! - Configuration loading

pub mod align;
pub mod color;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod observable;
pub mod params;
pub mod render;
pub mod ticks;
pub mod unified;

pub use error::{Error, Result};
pub use model::{
    AlignedSeries, ColorScaleConfig, EntityKind, HeatmapCell, ScaleType, SeriesMetadata,
    YearRange,
};
