//! Cost accumulation and variance arithmetic.
//!
//! Numeric primitives under every dashboard figure. Malformed effort rows
//! (non-finite or negative hours) and rows whose resource reference is
//! orphaned are skipped and logged at debug level, never propagated as
//! errors.

use crate::{
    core::rates::resolve_hourly_rate,
    db::{EffortRecord, ResourceRef},
    entities::project,
};
use tracing::debug;

/// Sums the cost of a project's effort records.
///
/// Each valid record contributes `hours * resolved rate`; records with
/// non-finite or negative hours, or an orphaned resource reference, are
/// skipped. The result is 0 for empty or all-invalid input, and is never
/// negative and never NaN.
#[must_use]
pub fn actual_cost(records: &[EffortRecord], project: &project::Model, default_rate: f64) -> f64 {
    records
        .iter()
        .filter_map(|record| {
            let hours = record.effort.hours;
            if !hours.is_finite() || hours < 0.0 {
                debug!(
                    "Skipping effort row {} with invalid hours {hours}",
                    record.effort.id
                );
                return None;
            }
            match &record.resource {
                ResourceRef::Resolved(resource) => {
                    Some(hours * resolve_hourly_rate(project, Some(resource), default_rate))
                }
                ResourceRef::Orphaned(resource_id) => {
                    debug!(
                        "Skipping effort row {} referencing missing resource {resource_id}",
                        record.effort.id
                    );
                    None
                }
            }
        })
        .sum()
}

/// Sums the hours of valid, non-orphaned effort records, with the same
/// skip rules as [`actual_cost`].
#[must_use]
pub fn total_valid_hours(records: &[EffortRecord]) -> f64 {
    records
        .iter()
        .filter(|record| {
            record.effort.hours.is_finite()
                && record.effort.hours >= 0.0
                && record.resource.resolved().is_some()
        })
        .map(|record| record.effort.hours)
        .sum()
}

/// Computes the percentage deviation of an actual value from an estimate.
///
/// - Either input non-finite: 0.
/// - `estimated <= 0`: 0 when `actual == 0`, otherwise ±100 matching the
///   sign of `actual` (avoids division by zero while preserving the
///   direction of the over/under-run).
/// - Otherwise `((actual - estimated) / estimated) * 100`, unrounded;
///   callers round for display with [`round1`].
#[must_use]
pub fn variance_pct(actual: f64, estimated: f64) -> f64 {
    if !actual.is_finite() || !estimated.is_finite() {
        return 0.0;
    }

    if estimated <= 0.0 {
        if actual == 0.0 {
            return 0.0;
        }
        return if actual > 0.0 { 100.0 } else { -100.0 };
    }

    ((actual - estimated) / estimated) * 100.0
}

/// Expresses `actual` as a percentage of `estimated`, or 0 when the
/// estimate is non-positive or either input is non-finite.
#[must_use]
pub fn percent_of(actual: f64, estimated: f64) -> f64 {
    if !actual.is_finite() || !estimated.is_finite() || estimated <= 0.0 {
        return 0.0;
    }

    (actual / estimated) * 100.0
}

/// Rounds to one decimal place for display.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        entities::RateSource,
        test_utils::{make_effort_record, make_orphaned_record, make_project, make_resource},
    };
    use chrono::NaiveDate;

    const DEFAULT: f64 = 65.0;

    fn week(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap() + chrono::Duration::weeks(i64::from(n))
    }

    #[test]
    fn test_actual_cost_project_rate() {
        // estimated_budget 10000, project rate 50, 40h + 60h => 5000.
        let mut project = make_project(1, "Fixed Rate");
        project.estimated_budget = 10_000.0;
        project.hourly_rate_source = RateSource::Project;
        project.hourly_rate = Some(50.0);

        let resource = make_resource(7, "Asha", 95.0);
        let records = vec![
            make_effort_record(1, &resource, week(0), 40.0),
            make_effort_record(1, &resource, week(1), 60.0),
        ];

        let cost = actual_cost(&records, &project, DEFAULT);
        assert_eq!(cost, 5000.0);
        assert_eq!(variance_pct(cost, project.estimated_budget), -50.0);
    }

    #[test]
    fn test_actual_cost_empty_and_all_invalid() {
        let project = make_project(1, "Empty");
        assert_eq!(actual_cost(&[], &project, DEFAULT), 0.0);

        let resource = make_resource(7, "Asha", 95.0);
        let records = vec![
            make_effort_record(1, &resource, week(0), f64::NAN),
            make_effort_record(1, &resource, week(1), -8.0),
            make_orphaned_record(1, 404, week(2), 40.0),
        ];
        assert_eq!(actual_cost(&records, &project, DEFAULT), 0.0);
    }

    #[test]
    fn test_actual_cost_monotonic_under_appends() {
        let mut project = make_project(1, "Growing");
        project.hourly_rate_source = RateSource::Resource;
        let resource = make_resource(7, "Asha", 80.0);

        let mut records = Vec::new();
        let mut previous = 0.0;
        for n in 0..6 {
            records.push(make_effort_record(1, &resource, week(n), f64::from(n) * 4.0));
            let cost = actual_cost(&records, &project, DEFAULT);
            assert!(cost >= previous);
            previous = cost;
        }
    }

    #[test]
    fn test_actual_cost_unaffected_by_orphans() {
        let mut project = make_project(1, "Orphaned");
        project.hourly_rate_source = RateSource::Project;
        project.hourly_rate = Some(100.0);

        let resource = make_resource(7, "Asha", 95.0);
        let mut records = vec![make_effort_record(1, &resource, week(0), 10.0)];
        let baseline = actual_cost(&records, &project, DEFAULT);

        records.push(make_orphaned_record(1, 404, week(1), 500.0));
        assert_eq!(actual_cost(&records, &project, DEFAULT), baseline);
    }

    #[test]
    fn test_total_valid_hours_skips_bad_rows() {
        let resource = make_resource(7, "Asha", 95.0);
        let records = vec![
            make_effort_record(1, &resource, week(0), 12.0),
            make_effort_record(1, &resource, week(1), f64::INFINITY),
            make_orphaned_record(1, 404, week(2), 40.0),
            make_effort_record(1, &resource, week(3), 8.0),
        ];

        assert_eq!(total_valid_hours(&records), 20.0);
    }

    #[test]
    fn test_variance_equal_inputs_is_zero() {
        for x in [0.5, 1.0, 42.0, 10_000.0] {
            assert_eq!(variance_pct(x, x), 0.0);
        }
    }

    #[test]
    fn test_variance_zero_estimate_policy() {
        assert_eq!(variance_pct(0.0, 0.0), 0.0);
        assert_eq!(variance_pct(250.0, 0.0), 100.0);
        assert_eq!(variance_pct(-250.0, 0.0), -100.0);
        assert_eq!(variance_pct(10.0, -5.0), 100.0);
    }

    #[test]
    fn test_variance_non_finite_inputs() {
        assert_eq!(variance_pct(f64::NAN, 100.0), 0.0);
        assert_eq!(variance_pct(100.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_variance_ordinary_case() {
        assert_eq!(variance_pct(150.0, 100.0), 50.0);
        assert_eq!(variance_pct(50.0, 100.0), -50.0);
        assert_eq!(round1(variance_pct(100.0, 300.0)), -66.7);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(50.0, 200.0), 25.0);
        assert_eq!(percent_of(50.0, 0.0), 0.0);
        assert_eq!(percent_of(f64::NAN, 200.0), 0.0);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(-66.666), -66.7);
        assert_eq!(round1(50.0), 50.0);
    }
}
