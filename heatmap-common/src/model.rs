//! Series data model shared by the alignment, scale and rendering code
//!
//! Field names follow the camelCase JSON documents written by the data
//! pipeline, so every type here deserializes straight from a fetched file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Deref;

/// Fixed month labels used for the month axis of every heatmap
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Source tag carried by synthetic cells appended during alignment
pub const PADDING_SOURCE: &str = "no-data";

/// One (year, month) data point within a series
///
/// `value = None` means missing or unreported data. It renders in the null
/// color and is never treated as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub year: i32,
    /// Month number, 1 = January
    pub month: u8,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub births: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<f64>,
    /// Births ten months later (conception series only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub future_births: Option<f64>,
    /// Pre-formatted display value (seasonality series only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_value: Option<String>,
    #[serde(default)]
    pub source: String,
}

impl HeatmapCell {
    /// Create a cell with a value and no count fields
    pub fn new(year: i32, month: u8, value: Option<f64>, source: impl Into<String>) -> Self {
        Self {
            year,
            month,
            value,
            births: None,
            population: None,
            future_births: None,
            formatted_value: None,
            source: source.into(),
        }
    }

    /// Synthetic null cell used to pad a series out to a comparison range
    pub fn padding(year: i32, month: u8) -> Self {
        Self::new(year, month, None, PADDING_SOURCE)
    }

    /// True for cells synthesized by alignment rather than read from a document
    pub fn is_padding(&self) -> bool {
        self.value.is_none() && self.source == PADDING_SOURCE
    }

    /// Sort key: year, then month
    pub fn key(&self) -> (i32, u8) {
        (self.year, self.month)
    }
}

/// Entity (country or state) identity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityRef {
    pub code: String,
    pub name: String,
}

/// Kind of entity a series describes
///
/// Countries and states live under different paths and use different
/// document shapes (see `normalize`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Country,
    State,
}

impl EntityKind {
    /// Relative path of a per-(entity, metric) document under the data root
    pub fn series_path(&self, metric: Metric, code: &str) -> String {
        match self {
            EntityKind::Country => format!("{}/{}.json", metric.slug(), code),
            EntityKind::State => format!("{}/states/{}.json", metric.slug(), code),
        }
    }

    /// Relative path of the entity index document
    pub fn index_path(&self) -> &'static str {
        match self {
            EntityKind::Country => "countries.json",
            EntityKind::State => "states.json",
        }
    }

    /// Query-string key holding the comma-separated entity codes
    pub fn query_key(&self) -> &'static str {
        match self {
            EntityKind::Country => "countries",
            EntityKind::State => "states",
        }
    }

    /// Parse from a route segment ("countries", "country", "states", "state")
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "country" | "countries" => Some(EntityKind::Country),
            "state" | "states" => Some(EntityKind::State),
            _ => None,
        }
    }
}

/// Metrics offered by the comparison view
///
/// The order of `all_variants` is significant: the first entry is the
/// fallback for unrecognized slugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Daily births per 100k women aged 15-44
    Fertility,
    /// Share of annual births falling in each month
    Seasonality,
    /// Daily conceptions per 100k women, from births ten months later
    Conception,
}

impl Metric {
    /// URL slug, also the top-level data directory name
    pub fn slug(&self) -> &'static str {
        match self {
            Metric::Fertility => "fertility",
            Metric::Seasonality => "seasonality",
            Metric::Conception => "conception",
        }
    }

    /// Metric name as written into series documents
    pub fn series_metric(&self) -> &'static str {
        match self {
            Metric::Fertility => "daily_fertility_rate",
            Metric::Seasonality => "seasonality_percentage_normalized",
            Metric::Conception => "daily_conception_rate",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Metric::Fertility => "Fertility",
            Metric::Seasonality => "Seasonality",
            Metric::Conception => "Conception",
        }
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        Self::all_variants()
            .iter()
            .copied()
            .find(|m| m.slug() == s.trim())
    }

    pub fn all_variants() -> &'static [Metric] {
        &[Metric::Fertility, Metric::Seasonality, Metric::Conception]
    }
}

impl Default for Metric {
    fn default() -> Self {
        Metric::all_variants()[0]
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// Color scale kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    /// Two-point (min, max) mapping for magnitudes
    #[default]
    Sequential,
    /// Three-point (min, center, max) mapping for deviations from a center
    Diverging,
}

/// Color scale configuration as found in series documents
///
/// Not schema-validated on load; `color::create_color_scale` tolerates
/// malformed domains and unknown scheme names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScaleConfig {
    #[serde(rename = "type", default)]
    pub scale_type: ScaleType,
    #[serde(default)]
    pub domain: Vec<f64>,
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

fn default_scheme() -> String {
    "turbo".to_string()
}

impl ColorScaleConfig {
    pub fn sequential(min: f64, max: f64, scheme: impl Into<String>) -> Self {
        Self {
            scale_type: ScaleType::Sequential,
            domain: vec![min, max],
            scheme: scheme.into(),
        }
    }

    pub fn diverging(min: f64, center: f64, max: f64, scheme: impl Into<String>) -> Self {
        Self {
            scale_type: ScaleType::Diverging,
            domain: vec![min, center, max],
            scheme: scheme.into(),
        }
    }
}

impl Default for ColorScaleConfig {
    /// Sequential `[0, 1]` turbo, the configuration used when nothing is known
    fn default() -> Self {
        Self::sequential(0.0, 1.0, default_scheme())
    }
}

/// Inclusive span of years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    /// Every year in the range, in order
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }

    /// Number of years covered (0 when `end < start`)
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One entity's full dataset for one metric
///
/// Built once from a fetched document and never mutated in place; a new
/// fetch yields a new instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesMetadata {
    #[serde(alias = "country")]
    pub entity: EntityRef,
    pub metric: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub years: Vec<i32>,
    #[serde(default = "default_months")]
    pub months: Vec<String>,
    #[serde(default)]
    pub color_scale: ColorScaleConfig,
    #[serde(default)]
    pub data: Vec<HeatmapCell>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

fn default_months() -> Vec<String> {
    MONTH_LABELS.iter().map(|m| m.to_string()).collect()
}

impl SeriesMetadata {
    /// Parse a country-shaped series document
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Earliest year of the series (from `years`, else from the cells)
    pub fn min_year(&self) -> Option<i32> {
        self.years
            .iter()
            .copied()
            .min()
            .or_else(|| self.data.iter().map(|c| c.year).min())
    }

    /// Latest year of the series (from `years`, else from the cells)
    pub fn max_year(&self) -> Option<i32> {
        self.years
            .iter()
            .copied()
            .max()
            .or_else(|| self.data.iter().map(|c| c.year).max())
    }

    /// Own year span, `None` for a series with no years and no cells
    pub fn year_span(&self) -> Option<YearRange> {
        Some(YearRange::new(self.min_year()?, self.max_year()?))
    }
}

/// True when a metric name follows the seasonality convention
pub fn is_seasonality_metric(metric: &str) -> bool {
    metric.to_lowercase().contains("seasonality")
}

/// A series re-based onto a comparison year range
///
/// `series.years` is exactly `range.start..=range.end` and `series.data`
/// covers every (year, month) pair from the first kept cell through
/// `range.end`, sorted by year then month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedSeries {
    #[serde(flatten)]
    pub series: SeriesMetadata,
    pub range: YearRange,
}

impl AlignedSeries {
    /// Number of synthetic null cells appended during alignment
    pub fn padded_cells(&self) -> usize {
        self.series.data.iter().filter(|c| c.is_padding()).count()
    }

    pub fn into_inner(self) -> SeriesMetadata {
        self.series
    }
}

impl Deref for AlignedSeries {
    type Target = SeriesMetadata;

    fn deref(&self) -> &SeriesMetadata {
        &self.series
    }
}

/// Availability of one metric for an index entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricAvailability {
    pub year_range: [i32; 2],
    #[serde(default)]
    pub has_data: bool,
}

/// One entity listed in `countries.json` / `states.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_years: Option<u32>,
    /// Keyed by metric slug ("fertility", "seasonality", "conception")
    #[serde(flatten)]
    pub metrics: BTreeMap<String, MetricAvailability>,
}

impl IndexEntry {
    /// Year range for a metric, only when the entity has data for it
    pub fn year_range(&self, metric: Metric) -> Option<YearRange> {
        self.metrics
            .get(metric.slug())
            .filter(|m| m.has_data)
            .map(|m| YearRange::new(m.year_range[0], m.year_range[1]))
    }
}

/// Data source attribution listed in an index document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceInfo {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Entity index document (countries or states)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityIndex {
    #[serde(alias = "countries", alias = "states")]
    pub entities: Vec<IndexEntry>,
    #[serde(default)]
    pub data_sources: BTreeMap<String, DataSourceInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_years_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

impl EntityIndex {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn find(&self, code: &str) -> Option<&IndexEntry> {
        self.entities.iter().find(|e| e.code == code)
    }
}
