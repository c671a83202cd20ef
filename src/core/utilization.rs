//! Resource utilization estimation.
//!
//! Capacity is estimated per resource from their own logged pattern: the
//! 20th-percentile value of their weekly hours sorted descending. An
//! overtime outlier week does not set the bar, and a part-timer is read
//! against their own norm rather than a flat 40-hour assumption.

use crate::db::EffortRecord;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Percentile rank (into the descending-sorted weekly hours) used as a
/// resource's realistic capacity. Product policy, not a tuning knob.
pub const CAPACITY_PERCENTILE_RANK: f64 = 0.2;

/// Estimates a realistic weekly capacity from observed weekly hours.
///
/// With more than two observations, sorts descending and takes the value
/// at the [`CAPACITY_PERCENTILE_RANK`] rank; with one or two, takes the
/// maximum. Returns 0 for no observations.
#[must_use]
pub fn realistic_capacity(weekly_hours: &[f64]) -> f64 {
    let mut sorted = weekly_hours.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    if sorted.len() > 2 {
        // Cast safety: the rank is in [0, 1] and len is a small observation
        // count, so the product lies in [0, len) and flooring to usize is
        // the intended index.
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let index = (CAPACITY_PERCENTILE_RANK * sorted.len() as f64).floor() as usize;
        sorted[index]
    } else {
        sorted.first().copied().unwrap_or(0.0)
    }
}

/// Derives the mean utilization ratio across all resources present in the
/// given effort records, in `[0, 1]`.
///
/// For each resource the records are summed into hours-per-week
/// observations (a resource split across projects still has one
/// observation per week). A resource's utilization is
/// `min(avg / capacity, 1)` with capacity from [`realistic_capacity`], or
/// 0 when the capacity is 0. Resources with no observed weeks, orphaned
/// references, and malformed rows are skipped; the result is 0 when no
/// resource qualifies.
#[must_use]
pub fn resource_utilization(records: &[EffortRecord]) -> f64 {
    let mut weekly: BTreeMap<(i64, NaiveDate), f64> = BTreeMap::new();
    for record in records {
        if record.resource.resolved().is_none() {
            continue;
        }
        let hours = record.effort.hours;
        if !hours.is_finite() || hours < 0.0 {
            continue;
        }
        *weekly
            .entry((record.resource.id(), record.effort.week_start_date))
            .or_insert(0.0) += hours;
    }

    let mut per_resource: HashMap<i64, Vec<f64>> = HashMap::new();
    for ((resource_id, _week), hours) in weekly {
        per_resource.entry(resource_id).or_default().push(hours);
    }

    if per_resource.is_empty() {
        return 0.0;
    }

    // Cast safety: observation and resource counts are small positive
    // integers, far below f64's exact-integer range.
    #[allow(clippy::cast_precision_loss)]
    let resource_count = per_resource.len() as f64;

    let mut total = 0.0;
    for observations in per_resource.values() {
        let capacity = realistic_capacity(observations);
        if capacity > 0.0 {
            #[allow(clippy::cast_precision_loss)]
            let average = observations.iter().sum::<f64>() / observations.len() as f64;
            total += (average / capacity).min(1.0);
        }
    }

    total / resource_count
}
