//! Year-range alignment for side-by-side comparison
//!
//! Several series with different year spans are re-based onto one common
//! range. The range starts at the latest per-series start year and ends at
//! the latest per-series end year: early years are trimmed, but shorter
//! series are padded with null cells rather than cutting off recent data.

use crate::model::{AlignedSeries, HeatmapCell, SeriesMetadata, YearRange};

/// Range returned when there is nothing to compare
pub const DEFAULT_YEAR_RANGE: YearRange = YearRange {
    start: 1900,
    end: 2024,
};

/// Common comparison range for a set of series
///
/// `start` is the maximum of the per-series minimum years and `end` the
/// maximum of the per-series maximum years. Series without any years are
/// ignored; if none remain, `DEFAULT_YEAR_RANGE` is returned. The result
/// does not depend on input order.
pub fn compute_common_year_range(series_list: &[SeriesMetadata]) -> YearRange {
    series_list
        .iter()
        .filter_map(SeriesMetadata::year_span)
        .reduce(|acc, span| YearRange::new(acc.start.max(span.start), acc.end.max(span.end)))
        .unwrap_or(DEFAULT_YEAR_RANGE)
}

/// Cells of `series` re-based onto `range`
///
/// Cells before `range.start` are dropped. When the series ends before
/// `range.end`, a null cell tagged `PADDING_SOURCE` is appended for every
/// (year, month) pair after the series' last year (never before
/// `range.start`). Existing cells, including nulls inside the series' own
/// span, are kept verbatim. Output is sorted by year, then month.
pub fn align_data_to_range(series: &SeriesMetadata, range: YearRange) -> Vec<HeatmapCell> {
    let mut cells: Vec<HeatmapCell> = series
        .data
        .iter()
        .filter(|c| c.year >= range.start)
        .cloned()
        .collect();

    let own_max = series.max_year().unwrap_or(range.start - 1);
    if own_max < range.end {
        let pad_from = (own_max + 1).max(range.start);
        for year in pad_from..=range.end {
            for month in 1..=12u8 {
                cells.push(HeatmapCell::padding(year, month));
            }
        }
    }

    cells.sort_by_key(HeatmapCell::key);
    cells
}

/// Year axis for an aligned series: `range.start..=range.end`
///
/// Independent of which years actually carry data.
pub fn get_aligned_years(_original_years: &[i32], range: YearRange) -> Vec<i32> {
    range.years().collect()
}

/// Build an aligned copy of `series` for one comparison session
pub fn align_series(series: &SeriesMetadata, range: YearRange) -> AlignedSeries {
    let mut aligned = series.clone();
    aligned.data = align_data_to_range(series, range);
    aligned.years = get_aligned_years(&series.years, range);
    AlignedSeries {
        series: aligned,
        range,
    }
}
