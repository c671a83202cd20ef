//! Weekly series construction for charts.
//!
//! Two shapes come out of here: a sparse single-key trend (weeks with no
//! activity are simply absent) and a dense two-key breakdown where every
//! series is zero-filled onto the union of observed weeks, so charting
//! code can stack them without aligning axes itself. Both have cumulative
//! variants for burn-down views.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One point of a weekly trend, keyed by the week's Monday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub week_start: NaiveDate,
    pub value: f64,
}

/// One raw observation attributed to a named series.
#[derive(Debug, Clone)]
pub struct KeyedSample {
    /// Series name (a resource name or a project name).
    pub key: String,
    pub week_start: NaiveDate,
    pub value: f64,
}

/// A set of named weekly series sharing one week axis.
///
/// Every vector in `series` has exactly `weeks.len()` entries; weeks a
/// series had no activity in hold 0.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BreakdownSeries {
    pub weeks: Vec<NaiveDate>,
    pub series: BTreeMap<String, Vec<f64>>,
}

impl BreakdownSeries {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

/// Groups samples by week, summing values per week, sorted ascending.
///
/// Non-finite values are dropped. Weeks with no samples are omitted, not
/// zero-filled.
#[must_use]
pub fn weekly_totals(samples: impl IntoIterator<Item = (NaiveDate, f64)>) -> Vec<TrendPoint> {
    let mut by_week: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (week_start, value) in samples {
        if value.is_finite() {
            *by_week.entry(week_start).or_insert(0.0) += value;
        }
    }

    by_week
        .into_iter()
        .map(|(week_start, value)| TrendPoint { week_start, value })
        .collect()
}

/// Groups samples by (week, key) into a dense breakdown.
///
/// The first pass collects the union of all weeks and all keys; every
/// series is then initialized to 0 across the full week axis before real
/// sums are overlaid. This guarantees identical week coverage for every
/// key. Non-finite values are dropped.
#[must_use]
pub fn weekly_breakdown(samples: impl IntoIterator<Item = KeyedSample>) -> BreakdownSeries {
    let samples: Vec<KeyedSample> = samples
        .into_iter()
        .filter(|sample| sample.value.is_finite())
        .collect();

    let week_set: BTreeSet<NaiveDate> = samples.iter().map(|s| s.week_start).collect();
    let weeks: Vec<NaiveDate> = week_set.into_iter().collect();
    let index_of: HashMap<NaiveDate, usize> = weeks
        .iter()
        .enumerate()
        .map(|(index, week)| (*week, index))
        .collect();

    let mut series: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for sample in samples {
        let values = series
            .entry(sample.key)
            .or_insert_with(|| vec![0.0; weeks.len()]);
        values[index_of[&sample.week_start]] += sample.value;
    }

    BreakdownSeries { weeks, series }
}

/// Turns a sorted weekly trend into a running total: each week's value is
/// the previous cumulative plus that week's delta.
#[must_use]
pub fn cumulative(mut points: Vec<TrendPoint>) -> Vec<TrendPoint> {
    for index in 1..points.len() {
        points[index].value += points[index - 1].value;
    }
    points
}

/// Applies the running-total transform to every series of a breakdown.
#[must_use]
pub fn cumulative_breakdown(mut breakdown: BreakdownSeries) -> BreakdownSeries {
    for values in breakdown.series.values_mut() {
        for index in 1..values.len() {
            values[index] += values[index - 1];
        }
    }
    breakdown
}

/// Week-over-week differences of a sorted trend; the first week's delta is
/// its own value (previous taken as 0).
#[must_use]
pub fn deltas(points: &[TrendPoint]) -> Vec<TrendPoint> {
    let mut previous = 0.0;
    points
        .iter()
        .map(|point| {
            let delta = point.value - previous;
            previous = point.value;
            TrendPoint {
                week_start: point.week_start,
                value: delta,
            }
        })
        .collect()
}
