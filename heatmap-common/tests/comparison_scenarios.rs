//! End-to-end scenarios over the public data-preparation API

use heatmap_common::align::{align_data_to_range, align_series, compute_common_year_range};
use heatmap_common::color::{calculate_domain, create_color_scale, get_color, NULL_COLOR};
use heatmap_common::model::{EntityRef, Metric, MONTH_LABELS};
use heatmap_common::params::{parse_compare_params, ScaleMode};
use heatmap_common::render::{HeatmapRenderer, RenderConfig, SvgTarget};
use heatmap_common::unified::compute_unified_color_scale;
use heatmap_common::{ColorScaleConfig, HeatmapCell, ScaleType, SeriesMetadata, YearRange};

fn constant_series(code: &str, start: i32, end: i32, value: f64) -> SeriesMetadata {
    let data = (start..=end)
        .flat_map(|year| (1..=12u8).map(move |month| HeatmapCell::new(year, month, Some(value), "UN")))
        .collect();
    SeriesMetadata {
        entity: EntityRef {
            code: code.to_string(),
            name: code.to_uppercase(),
        },
        metric: "daily_fertility_rate".to_string(),
        title: "Daily Births Per 100k Women (Age 15-44)".to_string(),
        subtitle: None,
        years: (start..=end).collect(),
        months: MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
        color_scale: ColorScaleConfig::sequential(value, value + 1.0, "turbo"),
        data,
        sources: vec!["UN".to_string()],
        generated_at: None,
    }
}

#[test]
fn two_series_comparison_scenario() {
    let a = constant_series("a", 1990, 1993, 5.0);
    let b = constant_series("b", 1992, 1996, 15.0);
    let both = vec![a.clone(), b.clone()];

    let range = compute_common_year_range(&both);
    assert_eq!(range, YearRange::new(1992, 1996));

    let aligned = align_data_to_range(&a, range);
    assert_eq!(aligned.len(), 60);
    assert_eq!(aligned.iter().filter(|c| c.value == Some(5.0)).count(), 24);
    assert_eq!(aligned.iter().filter(|c| c.value.is_none()).count(), 36);

    let unified = compute_unified_color_scale(&both, range);
    assert_eq!(unified.scale_type, ScaleType::Sequential);
    assert_eq!(unified.domain, vec![5.0, 15.0]);
}

#[test]
fn malformed_query_falls_back() {
    let params = parse_compare_params("countries=usa,,norway,&metric=bogus&scale=per-country&yearStart=abc");
    assert_eq!(params.countries, vec!["usa", "norway"]);
    assert_eq!(params.metric, Metric::Fertility);
    assert_eq!(params.scale, ScaleMode::PerCountry);
    assert_eq!(params.year_start, None);
}

#[test]
fn seasonality_swap_cross_comparison() {
    let seasonal = create_color_scale(
        &ColorScaleConfig::diverging(0.06, 0.0833, 0.10, "RdBu"),
        "seasonality_percentage_normalized",
    );
    let plain = create_color_scale(
        &ColorScaleConfig::diverging(0.10, 0.0833, 0.06, "RdBu"),
        "daily_fertility_rate",
    );
    assert_eq!(get_color(&seasonal, Some(0.06)), get_color(&plain, Some(0.06)));
    assert_eq!(get_color(&seasonal, None), NULL_COLOR);
}

#[test]
fn empty_inputs_degrade_to_defaults() {
    assert_eq!(calculate_domain(&[], ScaleType::Sequential), vec![0.0, 1.0]);
    assert_eq!(calculate_domain(&[], ScaleType::Diverging), vec![0.0, 0.5, 1.0]);

    let range = compute_common_year_range(&[]);
    assert!(range.start <= range.end);
    assert_eq!(compute_unified_color_scale(&[], range), ColorScaleConfig::default());
}

#[test]
fn aligned_series_renders_with_shared_scale() {
    let a = constant_series("a", 1990, 1993, 5.0);
    let b = constant_series("b", 1992, 1996, 15.0);
    let both = vec![a.clone(), b];
    let range = compute_common_year_range(&both);
    let unified = compute_unified_color_scale(&both, range);

    let aligned = align_series(&a, range);
    let config = RenderConfig {
        color_scale: Some(unified),
        ..Default::default()
    };
    let renderer = HeatmapRenderer::new(SvgTarget::new(), aligned.into_inner(), config, None);
    let svg = renderer.target().svg();
    assert_eq!(svg.matches("<rect").count(), 60);
    assert_eq!(svg.matches(&format!("fill=\"{}\"", NULL_COLOR)).count(), 36);
}
