//! Comparison orchestration
//!
//! Loads the selected entities, puts them on a common year axis and picks
//! the color scale each heatmap is drawn with.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;
use tracing::info;

use heatmap_common::align::{align_series, compute_common_year_range};
use heatmap_common::color::create_color_scale;
use heatmap_common::model::{EntityKind, Metric};
use heatmap_common::params::{CompareParams, ScaleMode};
use heatmap_common::render::{escape_xml, legend_svg, HeatmapRenderer, RenderConfig, ScrollInfo, SvgTarget, Theme};
use heatmap_common::unified::compute_unified_color_scale;
use heatmap_common::{AlignedSeries, ColorScaleConfig, SeriesMetadata, YearRange};

use crate::loader::{load_series_batch, DataSource};

/// One loaded entity, aligned and paired with the scale it is drawn with
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparedEntity {
    pub code: String,
    pub series: AlignedSeries,
    pub color_scale: ColorScaleConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub kind: EntityKind,
    pub metric: Metric,
    pub scale_mode: ScaleMode,
    /// Common range every entity is aligned to
    pub year_range: YearRange,
    /// Year filter requested by the user, applied at render time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_range: Option<YearRange>,
    /// Scale shared by every entity in unified mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_scale: Option<ColorScaleConfig>,
    /// Loaded entities in request order
    pub entities: Vec<ComparedEntity>,
    /// Requested codes that could not be loaded
    pub missing: Vec<String>,
}

impl Comparison {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Assemble a comparison from already loaded series
///
/// Duplicate codes are drawn once. With no loaded series the result is an
/// empty comparison over the default year range.
pub fn build_comparison(
    params: &CompareParams,
    kind: EntityKind,
    mut loaded: BTreeMap<String, SeriesMetadata>,
) -> Comparison {
    let mut ordered: Vec<(String, SeriesMetadata)> = Vec::new();
    let mut missing = Vec::new();
    for code in &params.countries {
        if ordered.iter().any(|(c, _)| c == code) || missing.contains(code) {
            continue;
        }
        match loaded.remove(code) {
            Some(series) => ordered.push((code.clone(), series)),
            None => missing.push(code.clone()),
        }
    }

    let series_list: Vec<SeriesMetadata> = ordered.iter().map(|(_, s)| s.clone()).collect();
    let year_range = compute_common_year_range(&series_list);

    let shared_scale = match params.scale {
        ScaleMode::Unified if !series_list.is_empty() => {
            Some(compute_unified_color_scale(&series_list, year_range))
        }
        _ => None,
    };

    let entities = ordered
        .into_iter()
        .map(|(code, series)| {
            let color_scale = shared_scale
                .clone()
                .unwrap_or_else(|| series.color_scale.clone());
            ComparedEntity {
                code,
                series: align_series(&series, year_range),
                color_scale,
            }
        })
        .collect();

    Comparison {
        kind,
        metric: params.metric,
        scale_mode: params.scale,
        year_range,
        display_range: params.year_override(year_range),
        shared_scale,
        entities,
        missing,
    }
}

/// Load every requested entity and build the comparison
pub async fn load_comparison(
    source: &dyn DataSource,
    kind: EntityKind,
    params: &CompareParams,
) -> Comparison {
    let loaded = load_series_batch(source, kind, params.metric, &params.countries).await;
    let comparison = build_comparison(params, kind, loaded);
    info!(
        metric = %comparison.metric,
        requested = params.countries.len(),
        loaded = comparison.entities.len(),
        missing = comparison.missing.len(),
        padded = comparison.entities.iter().map(|e| e.series.padded_cells()).sum::<usize>(),
        start = comparison.year_range.start,
        end = comparison.year_range.end,
        "Comparison assembled"
    );
    comparison
}

/// Rendered heatmap for one entity
#[derive(Debug, Clone)]
pub struct RenderedHeatmap {
    pub code: String,
    pub name: String,
    pub svg: String,
    pub legend: Option<String>,
    pub scroll: ScrollInfo,
}

/// Draw one heatmap per entity with the comparison's scales and year filter
///
/// Per-entity legends are only attached in per-country mode; unified
/// comparisons share the single legend from `comparison_legend`.
pub fn render_comparison(comparison: &Comparison, config: &RenderConfig) -> Vec<RenderedHeatmap> {
    comparison
        .entities
        .iter()
        .map(|entity| {
            let series = entity.series.series.clone();
            let entity_config = RenderConfig {
                color_scale: Some(entity.color_scale.clone()),
                ..config.clone()
            };
            let mut renderer = HeatmapRenderer::new(SvgTarget::new(), series.clone(), entity_config, None);
            if comparison.display_range.is_some() {
                renderer.update(series, comparison.display_range);
            }

            let legend = match comparison.scale_mode {
                ScaleMode::PerCountry => Some(legend_for(
                    &entity.color_scale,
                    &entity.series.metric,
                    config,
                    &format!("legend-{}", entity.code),
                )),
                ScaleMode::Unified => None,
            };

            RenderedHeatmap {
                code: entity.code.clone(),
                name: entity.series.entity.name.clone(),
                scroll: renderer.scroll_info(),
                svg: renderer.target().svg(),
                legend,
            }
        })
        .collect()
}

/// Legend for the shared scale of a unified comparison
pub fn comparison_legend(comparison: &Comparison, config: &RenderConfig) -> Option<String> {
    let scale = comparison.shared_scale.as_ref()?;
    let metric = comparison
        .entities
        .first()
        .map(|e| e.series.metric.clone())
        .unwrap_or_else(|| comparison.metric.series_metric().to_string());
    Some(legend_for(scale, &metric, config, "legend-shared"))
}

fn legend_for(scale: &ColorScaleConfig, metric: &str, config: &RenderConfig, gradient_id: &str) -> String {
    let color_scale = create_color_scale(scale, metric);
    legend_svg(&color_scale, config.width.min(420.0), config.theme, "", gradient_id)
}

/// HTML fragment listing the rendered heatmaps
pub fn comparison_html(comparison: &Comparison, config: &RenderConfig) -> String {
    let mut html = String::new();

    if comparison.is_empty() {
        html.push_str("<p class=\"empty\">No data loaded for this selection.</p>\n");
    }

    if let Some(legend) = comparison_legend(comparison, config) {
        let _ = writeln!(html, "<div class=\"legend shared\">{}</div>", legend);
    }

    for heatmap in render_comparison(comparison, config) {
        let scroll_class = if heatmap.scroll.scrollable { " scrollable" } else { "" };
        let _ = writeln!(
            html,
            "<section class=\"heatmap\" data-code=\"{}\">\n<h2>{}</h2>\n<div class=\"heatmap-scroll{}\">{}</div>",
            escape_xml(&heatmap.code),
            escape_xml(&heatmap.name),
            scroll_class,
            heatmap.svg
        );
        if let Some(legend) = heatmap.legend {
            let _ = writeln!(html, "<div class=\"legend\">{}</div>", legend);
        }
        html.push_str("</section>\n");
    }

    if !comparison.missing.is_empty() {
        let names: Vec<String> = comparison.missing.iter().map(|c| escape_xml(c)).collect();
        let _ = writeln!(
            html,
            "<p class=\"missing\">Not available: {}</p>",
            names.join(", ")
        );
    }
    html
}

/// Theme from a query value, light when absent or unknown
pub fn theme_param(value: Option<&str>) -> Theme {
    value.and_then(Theme::from_str).unwrap_or_default()
}
