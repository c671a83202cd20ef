//! Hourly-rate resolution.
//!
//! Every logged hour is costed at a rate chosen by the project's
//! `hourly_rate_source` policy. Resolution never fails: a missing or
//! invalid rate at the configured source silently degrades to the
//! organization default, because dashboards must keep rendering over bad
//! historical configuration.

use crate::entities::{RateSource, project, resource};

/// Resolves the hourly rate to apply to one logged hour.
///
/// Policy, in order of the project's configured source:
/// - `Project`: the project's own `hourly_rate`, when present, finite and
///   non-negative; otherwise the organization default.
/// - `Resource`: the resource's `per_hour_rate`, when the resource is
///   known and its rate is finite and non-negative; otherwise the
///   organization default.
/// - `Organization`: always the organization default.
///
/// The default itself is sanitized here: a non-finite or negative
/// `default_rate` degrades to 0.0, so the result is never negative and
/// never NaN no matter what the caller passes.
///
/// # Arguments
/// * `project` - The project whose rate policy applies
/// * `resource` - The resource who logged the hour, if resolved
/// * `default_rate` - The organization-wide default hourly rate
///
/// # Returns
/// The rate to multiply hours by, always finite and non-negative
#[must_use]
pub fn resolve_hourly_rate(
    project: &project::Model,
    resource: Option<&resource::Model>,
    default_rate: f64,
) -> f64 {
    let fallback = if default_rate.is_finite() && default_rate >= 0.0 {
        default_rate
    } else {
        0.0
    };
    match project.hourly_rate_source {
        RateSource::Project => project
            .hourly_rate
            .filter(|rate| rate.is_finite() && *rate >= 0.0)
            .unwrap_or(fallback),
        RateSource::Resource => resource
            .map(|r| r.per_hour_rate)
            .filter(|rate| rate.is_finite() && *rate >= 0.0)
            .unwrap_or(fallback),
        RateSource::Organization => fallback,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{make_project, make_resource};

    const DEFAULT: f64 = 65.0;

    #[test]
    fn test_project_source_uses_project_rate() {
        let mut project = make_project(1, "Rated");
        project.hourly_rate_source = RateSource::Project;
        project.hourly_rate = Some(120.0);

        let rate = resolve_hourly_rate(&project, None, DEFAULT);
        assert_eq!(rate, 120.0);
    }

    #[test]
    fn test_project_source_falls_back_when_rate_invalid() {
        let mut project = make_project(1, "Unrated");
        project.hourly_rate_source = RateSource::Project;

        for bad in [None, Some(f64::NAN), Some(-10.0), Some(f64::INFINITY)] {
            project.hourly_rate = bad;
            assert_eq!(resolve_hourly_rate(&project, None, DEFAULT), DEFAULT);
        }
    }

    #[test]
    fn test_resource_source_uses_resource_rate() {
        let mut project = make_project(1, "By Resource");
        project.hourly_rate_source = RateSource::Resource;
        let resource = make_resource(7, "Asha", 95.0);

        let rate = resolve_hourly_rate(&project, Some(&resource), DEFAULT);
        assert_eq!(rate, 95.0);
    }

    #[test]
    fn test_resource_source_falls_back_without_resource() {
        let mut project = make_project(1, "By Resource");
        project.hourly_rate_source = RateSource::Resource;

        assert_eq!(resolve_hourly_rate(&project, None, DEFAULT), DEFAULT);

        let broken = make_resource(7, "Broken", f64::NAN);
        assert_eq!(resolve_hourly_rate(&project, Some(&broken), DEFAULT), DEFAULT);

        let negative = make_resource(8, "Negative", -5.0);
        assert_eq!(
            resolve_hourly_rate(&project, Some(&negative), DEFAULT),
            DEFAULT
        );
    }

    #[test]
    fn test_organization_source_ignores_specific_rates() {
        let mut project = make_project(1, "Org Rated");
        project.hourly_rate_source = RateSource::Organization;
        project.hourly_rate = Some(200.0);
        let resource = make_resource(7, "Asha", 95.0);

        assert_eq!(
            resolve_hourly_rate(&project, Some(&resource), DEFAULT),
            DEFAULT
        );
    }

    #[test]
    fn test_invalid_default_degrades_to_zero() {
        let mut project = make_project(1, "Org Rated");
        project.hourly_rate_source = RateSource::Organization;

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -20.0] {
            assert_eq!(resolve_hourly_rate(&project, None, bad), 0.0);
        }

        // The fallback paths land on the same degraded default.
        project.hourly_rate_source = RateSource::Project;
        project.hourly_rate = None;
        assert_eq!(resolve_hourly_rate(&project, None, f64::NAN), 0.0);
    }

    #[test]
    fn test_resolved_rate_is_never_negative_or_nan() {
        let sources = [
            RateSource::Project,
            RateSource::Resource,
            RateSource::Organization,
        ];
        let rates = [None, Some(-1.0), Some(f64::NAN), Some(50.0)];
        let defaults = [DEFAULT, 0.0, -20.0, f64::NAN, f64::INFINITY];
        let resource = make_resource(7, "Asha", 95.0);

        for source in sources {
            for rate in rates {
                for default in defaults {
                    let mut project = make_project(1, "Any");
                    project.hourly_rate_source = source;
                    project.hourly_rate = rate;

                    for res in [None, Some(&resource)] {
                        let resolved = resolve_hourly_rate(&project, res, default);
                        assert!(resolved.is_finite());
                        assert!(resolved >= 0.0);
                    }
                }
            }
        }
    }
}
