//! State documents reshaped into the country document structure
//!
//! State series carry a `state` key, separate birth/population source lists
//! and per-cell `birthSource`/`populationSource` fields. Everything
//! downstream works on the country shape, so states are converted on load.
//! Only field renaming and combination happens here; numbers pass through.

use serde::Deserialize;

use crate::model::{ColorScaleConfig, EntityRef, HeatmapCell, SeriesMetadata};

/// Cell as written in state documents
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateCell {
    pub year: i32,
    pub month: u8,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub births: Option<f64>,
    #[serde(default)]
    pub population: Option<f64>,
    #[serde(default)]
    pub future_births: Option<f64>,
    #[serde(default)]
    pub formatted_value: Option<String>,
    #[serde(default)]
    pub birth_source: Option<String>,
    #[serde(default)]
    pub population_source: Option<String>,
    /// Some exports already use the single-source field
    #[serde(default)]
    pub source: Option<String>,
}

/// Series document for a U.S. state or territory
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSeriesDocument {
    pub state: EntityRef,
    pub metric: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub years: Vec<i32>,
    #[serde(default)]
    pub months: Vec<String>,
    #[serde(default)]
    pub color_scale: ColorScaleConfig,
    #[serde(default)]
    pub data: Vec<StateCell>,
    #[serde(default)]
    pub birth_sources: Vec<String>,
    #[serde(default)]
    pub population_sources: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

impl StateSeriesDocument {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Convert a state document into a country-shaped series
///
/// The series-level source list is the union (first-seen order) of
/// `sources`, `birthSources` and `populationSources`. A cell's source is
/// its `source` field if present, otherwise the birth and population
/// sources joined with " / " (once, when they are equal).
pub fn normalize_state_series(doc: StateSeriesDocument) -> SeriesMetadata {
    let mut sources: Vec<String> = Vec::new();
    for s in doc
        .sources
        .into_iter()
        .chain(doc.birth_sources)
        .chain(doc.population_sources)
    {
        if !sources.contains(&s) {
            sources.push(s);
        }
    }

    let data = doc.data.into_iter().map(normalize_cell).collect();

    let mut series = SeriesMetadata {
        entity: doc.state,
        metric: doc.metric,
        title: doc.title,
        subtitle: doc.subtitle,
        years: doc.years,
        months: doc.months,
        color_scale: doc.color_scale,
        data,
        sources,
        generated_at: doc.generated_at,
    };
    if series.months.is_empty() {
        series.months = crate::model::MONTH_LABELS.iter().map(|m| m.to_string()).collect();
    }
    series
}

fn normalize_cell(cell: StateCell) -> HeatmapCell {
    let source = match (cell.source, cell.birth_source, cell.population_source) {
        (Some(s), _, _) => s,
        (None, Some(b), Some(p)) if b == p => b,
        (None, Some(b), Some(p)) => format!("{} / {}", b, p),
        (None, Some(b), None) => b,
        (None, None, Some(p)) => p,
        (None, None, None) => String::new(),
    };

    HeatmapCell {
        year: cell.year,
        month: cell.month,
        value: cell.value,
        births: cell.births,
        population: cell.population,
        future_births: cell.future_births,
        formatted_value: cell.formatted_value,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScaleType;

    const STATE_DOC: &str = r#"{
        "state": {"code": "texas", "name": "Texas"},
        "metric": "daily_fertility_rate",
        "title": "Daily Births Per 100k Women (Age 15-44)",
        "colorScale": {"type": "sequential", "domain": [4.2, 9.9], "scheme": "turbo"},
        "years": [2001],
        "months": ["Jan","Feb","Mar","Apr","May","Jun","Jul","Aug","Sep","Oct","Nov","Dec"],
        "data": [
            {"year": 2001, "month": 1, "value": 6.51, "births": 30000, "population": 4500000,
             "birthSource": "CDC", "populationSource": "Census"},
            {"year": 2001, "month": 2, "value": 6.02, "births": 28000, "population": 4500000,
             "birthSource": "CDC", "populationSource": "CDC"},
            {"year": 2001, "month": 3, "value": null, "birthSource": "Historical"}
        ],
        "birthSources": ["CDC", "Historical"],
        "populationSources": ["Census", "CDC"]
    }"#;

    #[test]
    fn test_state_entity_becomes_series_entity() {
        let series = normalize_state_series(StateSeriesDocument::from_json(STATE_DOC).unwrap());
        assert_eq!(series.entity.code, "texas");
        assert_eq!(series.entity.name, "Texas");
        assert_eq!(series.color_scale.scale_type, ScaleType::Sequential);
    }

    #[test]
    fn test_sources_combined_without_duplicates() {
        let series = normalize_state_series(StateSeriesDocument::from_json(STATE_DOC).unwrap());
        assert_eq!(series.sources, vec!["CDC", "Historical", "Census"]);
    }

    #[test]
    fn test_cell_sources_combined() {
        let series = normalize_state_series(StateSeriesDocument::from_json(STATE_DOC).unwrap());
        assert_eq!(series.data[0].source, "CDC / Census");
        assert_eq!(series.data[1].source, "CDC");
        assert_eq!(series.data[2].source, "Historical");
    }

    #[test]
    fn test_values_untouched() {
        let series = normalize_state_series(StateSeriesDocument::from_json(STATE_DOC).unwrap());
        assert_eq!(series.data[0].value, Some(6.51));
        assert_eq!(series.data[0].births, Some(30000.0));
        assert_eq!(series.data[2].value, None);
        assert_eq!(series.years, vec![2001]);
    }

    #[test]
    fn test_missing_months_filled() {
        let doc = r#"{"state": {"code": "ohio", "name": "Ohio"}, "metric": "m"}"#;
        let series = normalize_state_series(StateSeriesDocument::from_json(doc).unwrap());
        assert_eq!(series.months.len(), 12);
        assert!(series.data.is_empty());
    }
}
