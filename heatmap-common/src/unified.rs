//! One color scale shared by every heatmap in a comparison

use crate::model::{ColorScaleConfig, ScaleType, SeriesMetadata, YearRange};

/// Center of a diverging seasonality scale: an equal share across 12 months
pub const SEASONALITY_CENTER: f64 = 1.0 / 12.0;

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Shared color-scale configuration for a set of aligned series
///
/// The first series supplies the scale type and scheme (compared series are
/// assumed to share a metric). Every non-null value in `range` across all
/// series is pooled:
/// - sequential: `[round(min, 1), round(max, 1)]`
/// - diverging: `[min, center, max]` rounded to 4 places, with the center
///   `SEASONALITY_CENTER` clamped into `[min, max]`
///
/// With no series the default sequential turbo `[0, 1]` scale is returned;
/// with no values the first series' own configuration is returned unchanged.
pub fn compute_unified_color_scale(
    series_list: &[SeriesMetadata],
    range: YearRange,
) -> ColorScaleConfig {
    let Some(first) = series_list.first() else {
        return ColorScaleConfig::default();
    };
    let base = &first.color_scale;

    let pooled = series_list
        .iter()
        .flat_map(|s| s.data.iter())
        .filter(|c| range.contains(c.year))
        .filter_map(|c| c.value)
        .filter(|v| !v.is_nan());

    let extent = pooled.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    });

    let Some((min, max)) = extent else {
        return base.clone();
    };

    match base.scale_type {
        ScaleType::Sequential => {
            ColorScaleConfig::sequential(round_to(min, 1), round_to(max, 1), base.scheme.clone())
        }
        ScaleType::Diverging => {
            let center = SEASONALITY_CENTER.clamp(min, max);
            ColorScaleConfig::diverging(
                round_to(min, 4),
                round_to(center, 4),
                round_to(max, 4),
                base.scheme.clone(),
            )
        }
    }
}
