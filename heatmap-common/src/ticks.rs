//! Tick helpers for legends and the year axis

/// Rounded tick values between `vmin` and `vmax`
///
/// Candidate steps are 2, 5 and 10 times the order of magnitude of the
/// rough step. Steps yielding 3-7 ticks are preferred, closest to
/// `target` first, then the smaller step on a tie. If no step qualifies,
/// the step is picked from the normalized rough step instead.
pub fn rounded_ticks(vmin: f64, vmax: f64, target: usize) -> Vec<f64> {
    if !(vmax > vmin) || !vmin.is_finite() || !vmax.is_finite() {
        return if vmin.is_finite() { vec![vmin] } else { Vec::new() };
    }
    let target = target.max(2);

    let rough_step = (vmax - vmin) / (target - 1) as f64;
    let magnitude = 10f64.powf(rough_step.log10().floor());
    let normalized = rough_step / magnitude;

    let mut best: Option<(f64, Vec<f64>)> = None;
    for multiplier in [2.0, 5.0, 10.0] {
        let step = multiplier * magnitude;
        let ticks = ticks_for_step(vmin, vmax, step);
        if !(3..=7).contains(&ticks.len()) {
            continue;
        }
        let distance = ticks.len().abs_diff(target);
        let better = match &best {
            None => true,
            Some((best_step, best_ticks)) => {
                let best_distance = best_ticks.len().abs_diff(target);
                distance < best_distance || (distance == best_distance && step < *best_step)
            }
        };
        if better {
            best = Some((step, ticks));
        }
    }

    if let Some((_, ticks)) = best {
        return ticks;
    }

    let multiplier = if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    ticks_for_step(vmin, vmax, multiplier * magnitude)
}

fn ticks_for_step(vmin: f64, vmax: f64, step: f64) -> Vec<f64> {
    let first = (vmin / step).ceil() as i64;
    let last = (vmax / step).floor() as i64;
    (first..=last)
        .map(|i| i as f64 * step)
        // Strip float noise such as 0.30000000000000004
        .map(|v| (v / step).round() * step)
        .map(|v| (v * 1e9).round() / 1e9)
        .filter(|v| *v >= vmin - 1e-12 && *v <= vmax + 1e-12)
        .collect()
}

/// Label spacing for a year axis with `count` years and `max_labels` room
pub fn year_label_spacing(count: usize, max_labels: usize) -> i32 {
    let max_labels = max_labels.max(1);
    [1, 2, 5, 10]
        .into_iter()
        .find(|&s| count.div_ceil(s as usize) <= max_labels)
        .unwrap_or(10)
}

/// First year at or after `first_year` that falls on the label grid
///
/// Spacing 2 lands on even years, 5 on years ending in 0 or 5, 10 on
/// decades. Spacing 1 returns `first_year` unchanged.
pub fn first_aligned_year(first_year: i32, spacing: i32) -> i32 {
    match spacing {
        2 => {
            if first_year % 2 == 0 {
                first_year
            } else {
                first_year + 1
            }
        }
        5 => {
            let remainder = first_year.rem_euclid(10);
            match remainder {
                0 | 5 => first_year,
                r if r < 5 => first_year - r + 5,
                r => first_year - r + 10,
            }
        }
        10 => {
            let remainder = first_year.rem_euclid(10);
            if remainder == 0 {
                first_year
            } else {
                first_year - remainder + 10
            }
        }
        _ => first_year,
    }
}

/// Years that receive a label on an axis showing `years`
pub fn labelled_years(years: &[i32], max_labels: usize) -> Vec<i32> {
    let Some(&first) = years.first() else {
        return Vec::new();
    };
    let spacing = year_label_spacing(years.len(), max_labels);
    if spacing == 1 {
        return years.to_vec();
    }
    let anchor = first_aligned_year(first, spacing);
    years
        .iter()
        .copied()
        .filter(|y| *y >= anchor && (y - anchor) % spacing == 0)
        .collect()
}
