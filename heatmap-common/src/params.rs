//! Query parameters of the comparison view
//!
//! Malformed URLs never produce an error: unknown metrics fall back to the
//! first metric, unknown scale modes to `unified`, and non-numeric years are
//! ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::{EntityKind, Metric, YearRange};

/// How color scales are shared between compared heatmaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleMode {
    /// One scale for every entity, so colors mean the same thing everywhere
    #[default]
    Unified,
    /// Each entity keeps its own document scale
    PerCountry,
}

impl ScaleMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "unified" => Some(ScaleMode::Unified),
            "per-country" => Some(ScaleMode::PerCountry),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleMode::Unified => "unified",
            ScaleMode::PerCountry => "per-country",
        }
    }
}

/// Parsed comparison request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareParams {
    /// Entity codes in request order, empty entries removed
    pub countries: Vec<String>,
    pub metric: Metric,
    pub scale: ScaleMode,
    pub year_start: Option<i32>,
    pub year_end: Option<i32>,
}

impl CompareParams {
    /// Build from already-decoded key/value pairs
    ///
    /// Entity codes are read from `kind.query_key()` ("countries" or
    /// "states"); state requests also accept "countries".
    pub fn from_pairs(pairs: &HashMap<String, String>, kind: EntityKind) -> Self {
        let codes = pairs
            .get(kind.query_key())
            .or_else(|| pairs.get(EntityKind::Country.query_key()))
            .map(|raw| split_codes(raw))
            .unwrap_or_default();

        Self {
            countries: codes,
            metric: pairs
                .get("metric")
                .and_then(|m| Metric::from_slug(m))
                .unwrap_or_default(),
            scale: pairs
                .get("scale")
                .and_then(|s| ScaleMode::from_str(s))
                .unwrap_or_default(),
            year_start: pairs.get("yearStart").and_then(|y| parse_year(y)),
            year_end: pairs.get("yearEnd").and_then(|y| parse_year(y)),
        }
    }

    /// Explicit year override, if either bound was given
    ///
    /// A missing bound is taken from `fallback`.
    pub fn year_override(&self, fallback: YearRange) -> Option<YearRange> {
        if self.year_start.is_none() && self.year_end.is_none() {
            return None;
        }
        Some(YearRange::new(
            self.year_start.unwrap_or(fallback.start),
            self.year_end.unwrap_or(fallback.end),
        ))
    }
}

/// Parse a raw query string (with or without a leading `?`)
pub fn parse_compare_params(query: &str) -> CompareParams {
    parse_params_for(query, EntityKind::Country)
}

/// Parse a raw query string for the given entity kind
pub fn parse_params_for(query: &str, kind: EntityKind) -> CompareParams {
    CompareParams::from_pairs(&decode_query(query), kind)
}

/// Decode `a=b&c=d` into a map; later duplicates win
///
/// Decoding is lossy rather than failing, so a mangled query still yields
/// whatever pairs it contains.
pub fn decode_query(query: &str) -> HashMap<String, String> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(query.trim_start_matches('?'))
        .unwrap_or_default()
        .into_iter()
        .collect()
}

fn split_codes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_year(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}
