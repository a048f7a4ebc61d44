//! Sequential and diverging color scales
//!
//! A `ColorScale` maps a value (or a missing value) to a CSS color string.
//! Values outside the domain clamp to the nearest endpoint color; missing
//! values always map to `NULL_COLOR`.

use super::scheme::{ColorScheme, Rgb};
use crate::model::{is_seasonality_metric, ColorScaleConfig, ScaleType};

/// Fill color for missing data, independent of scale type and domain
pub const NULL_COLOR: &str = "#cccccc";

/// Floor applied to non-positive domain minimums
pub const DOMAIN_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mapping {
    Sequential { x0: f64, x1: f64 },
    /// `x0` and `x2` may be in descending order (seasonality swap)
    Diverging { x0: f64, x1: f64, x2: f64 },
}

/// Interpolating color scale built from a `ColorScaleConfig`
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    mapping: Mapping,
    scheme: ColorScheme,
}

/// Build a color scale from a configuration
///
/// `metric` selects the seasonality convention: diverging scales for a
/// seasonality metric have their min and max swapped around the fixed
/// center, so below-center values take the cool end of the scheme and
/// above-center values the warm end.
///
/// Domains whose length does not match the scale type are coerced rather
/// than rejected: a sequential scale uses the first and last points, a
/// diverging scale given two points centers between them, and an empty
/// domain takes the default for its type.
pub fn create_color_scale(config: &ColorScaleConfig, metric: &str) -> ColorScale {
    let scheme = ColorScheme::from_name_or_default(&config.scheme);
    let d = &config.domain;

    let mapping = match config.scale_type {
        ScaleType::Sequential => match d.as_slice() {
            [] => Mapping::Sequential { x0: 0.0, x1: 1.0 },
            [only] => Mapping::Sequential { x0: *only, x1: *only },
            [first, .., last] => Mapping::Sequential { x0: *first, x1: *last },
        },
        ScaleType::Diverging => {
            let (min, mid, max) = match d.as_slice() {
                [] => (0.0, 0.5, 1.0),
                [only] => (*only, *only, *only),
                [a, b] => (*a, (a + b) / 2.0, *b),
                [a, b, c, ..] => (*a, *b, *c),
            };
            if is_seasonality_metric(metric) {
                Mapping::Diverging { x0: max, x1: mid, x2: min }
            } else {
                Mapping::Diverging { x0: min, x1: mid, x2: max }
            }
        }
    };

    ColorScale { mapping, scheme }
}

/// Color for a value; `NULL_COLOR` for missing values
pub fn get_color(scale: &ColorScale, value: Option<f64>) -> String {
    scale.color(value)
}

impl ColorScale {
    /// Normalized position of `value` within the domain, clamped to [0, 1]
    ///
    /// A degenerate sequential domain (`min == max`) maps everything to 0.5.
    pub fn position(&self, value: f64) -> f64 {
        let t = match self.mapping {
            Mapping::Sequential { x0, x1 } => {
                if x0 == x1 {
                    0.5
                } else {
                    (value - x0) / (x1 - x0)
                }
            }
            Mapping::Diverging { x0, x1, x2 } => {
                let k10 = if x0 == x1 { 0.0 } else { 0.5 / (x1 - x0) };
                let k21 = if x1 == x2 { 0.0 } else { 0.5 / (x2 - x1) };
                let s = if x1 < x0 { -1.0 } else { 1.0 };
                let k = if s * value < s * x1 { k10 } else { k21 };
                0.5 + (value - x1) * k
            }
        };
        t.clamp(0.0, 1.0)
    }

    /// Color for a present value
    pub fn rgb(&self, value: f64) -> Rgb {
        self.scheme.interpolate(self.position(value))
    }

    /// CSS color string; missing or NaN values map to `NULL_COLOR`
    pub fn color(&self, value: Option<f64>) -> String {
        match value {
            Some(v) if !v.is_nan() => self.rgb(v).to_string(),
            _ => NULL_COLOR.to_string(),
        }
    }

    pub fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    pub fn scale_type(&self) -> ScaleType {
        match self.mapping {
            Mapping::Sequential { .. } => ScaleType::Sequential,
            Mapping::Diverging { .. } => ScaleType::Diverging,
        }
    }

    /// Lowest and highest domain values, in ascending order
    pub fn extent(&self) -> (f64, f64) {
        let (a, b) = match self.mapping {
            Mapping::Sequential { x0, x1 } => (x0, x1),
            Mapping::Diverging { x0, x2, .. } => (x0, x2),
        };
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// Derive a domain from a set of possibly missing values
///
/// Uses the absolute min and max (no percentile trimming). A minimum at or
/// below zero is floored to `DOMAIN_EPSILON`. Diverging domains put the
/// midpoint at the mean of the floored min and the max. With no present
/// values the result is `[0, 1]` (sequential) or `[0, 0.5, 1]` (diverging).
pub fn calculate_domain(values: &[Option<f64>], scale_type: ScaleType) -> Vec<f64> {
    let present = values.iter().flatten().copied().filter(|v| !v.is_nan());

    let extent = present.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    });

    let Some((min, max)) = extent else {
        return match scale_type {
            ScaleType::Sequential => vec![0.0, 1.0],
            ScaleType::Diverging => vec![0.0, 0.5, 1.0],
        };
    };

    let min = if min <= 0.0 { DOMAIN_EPSILON } else { min };

    match scale_type {
        ScaleType::Sequential => vec![min, max],
        ScaleType::Diverging => vec![min, (min + max) / 2.0, max],
    }
}
