//! Color mapping for heatmap cells
//!
//! - `scheme`: closed set of named interpolation schemes
//! - `scale`: sequential/diverging scales, null color, domain derivation

pub mod scale;
pub mod scheme;

pub use scale::{calculate_domain, create_color_scale, get_color, ColorScale, DOMAIN_EPSILON, NULL_COLOR};
pub use scheme::{ColorScheme, Rgb};
