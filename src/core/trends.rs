//! Time-windowed trend views.
//!
//! Where the drill-down shows a project's whole history, this view slices
//! the recent past: weekly effort split by resource (one project) or by
//! project (whole portfolio), the cost burn-down over the window, and the
//! scope-completion trajectory. The window is measured in days back from
//! the caller's reference date and defaults to roughly a month.

use crate::{
    config::settings::OrganizationSettings,
    core::{
        rates::resolve_hourly_rate,
        timeseries::{
            BreakdownSeries, KeyedSample, TrendPoint, cumulative, weekly_breakdown, weekly_totals,
        },
    },
    db::{self, EffortRecord},
    entities::project,
    errors::Result,
};
use chrono::{Duration, NaiveDate};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::HashMap;
use tracing::instrument;

/// Window applied when the caller does not ask for a specific one.
pub const DEFAULT_TREND_WINDOW_DAYS: i64 = 30;

/// Recent-activity trends over a day window, for one project or the whole
/// portfolio.
#[derive(Debug, Clone, Serialize)]
pub struct TrendsView {
    pub window_days: i64,
    /// First date inside the window; only weeks starting on or after this
    /// date contribute.
    pub window_start: NaiveDate,
    /// Weekly hours per resource (single project) or per project
    /// (portfolio), zero-filled onto a shared week axis.
    pub effort_breakdown: BreakdownSeries,
    /// Cumulative cost per week within the window.
    pub budget_burndown: Vec<TrendPoint>,
    /// Scope percentage per metrics week: as reported for a single
    /// project, summed across projects for the portfolio.
    pub scope_trend: Vec<TrendPoint>,
}

/// Assembles the trend view.
///
/// With a project ID the series cover that project alone and the effort
/// breakdown is keyed by resource name; without one they cover every
/// live project, keyed by project name.
///
/// # Errors
/// Returns [`crate::errors::Error::ProjectNotFound`] when a requested
/// project is missing or soft-deleted.
#[instrument(skip(db, settings))]
pub async fn trends_view(
    db: &DatabaseConnection,
    project_id: Option<i64>,
    window_days: Option<i64>,
    today: NaiveDate,
    settings: &OrganizationSettings,
) -> Result<TrendsView> {
    let window_days = window_days.unwrap_or(DEFAULT_TREND_WINDOW_DAYS);
    let window_start = today - Duration::days(window_days);

    let (effort_breakdown, budget_burndown, scope_trend) = match project_id {
        Some(id) => single_project_trends(db, id, window_start, settings).await?,
        None => portfolio_trends(db, window_start, settings).await?,
    };

    Ok(TrendsView {
        window_days,
        window_start,
        effort_breakdown,
        budget_burndown,
        scope_trend,
    })
}

type TrendSeries = (BreakdownSeries, Vec<TrendPoint>, Vec<TrendPoint>);

async fn single_project_trends(
    db: &DatabaseConnection,
    project_id: i64,
    window_start: NaiveDate,
    settings: &OrganizationSettings,
) -> Result<TrendSeries> {
    let project = db::get_project(db, project_id).await?;
    let project_ids = [project_id];

    let (records, metrics) = tokio::try_join!(
        db::list_efforts_for_projects(db, &project_ids, Some(window_start)),
        db::list_metrics_for_project(db, project_id, Some(window_start)),
    )?;

    let effort_samples = records.iter().filter_map(|record| {
        let resource = record.resource.resolved()?;
        let hours = record.effort.hours;
        if !hours.is_finite() || hours < 0.0 {
            return None;
        }
        Some(KeyedSample {
            key: resource.name.clone(),
            week_start: record.effort.week_start_date,
            value: hours,
        })
    });
    let effort_breakdown = weekly_breakdown(effort_samples);

    let projects_by_id = HashMap::from([(project.id, project)]);
    let budget_burndown = cumulative(weekly_totals(weekly_cost_samples(
        &records,
        &projects_by_id,
        settings.default_hourly_rate,
    )));

    let scope_trend = metrics
        .iter()
        .map(|row| TrendPoint {
            week_start: row.week_start_date,
            value: row.scope_completed,
        })
        .collect();

    Ok((effort_breakdown, budget_burndown, scope_trend))
}

async fn portfolio_trends(
    db: &DatabaseConnection,
    window_start: NaiveDate,
    settings: &OrganizationSettings,
) -> Result<TrendSeries> {
    let projects = db::list_projects(db).await?;
    let project_ids: Vec<i64> = projects.iter().map(|p| p.id).collect();

    let (records, weekly_sums, metrics) = tokio::try_join!(
        db::list_efforts_for_projects(db, &project_ids, Some(window_start)),
        db::sum_hours_by_project_and_week(db, &project_ids, Some(window_start)),
        db::list_metrics_for_projects_since(db, &project_ids, window_start),
    )?;

    let projects_by_id: HashMap<i64, project::Model> =
        projects.into_iter().map(|p| (p.id, p)).collect();

    let effort_samples = weekly_sums.iter().filter_map(|(project_id, week_start, hours)| {
        let project = projects_by_id.get(project_id)?;
        Some(KeyedSample {
            key: project.name.clone(),
            week_start: *week_start,
            value: *hours,
        })
    });
    let effort_breakdown = weekly_breakdown(effort_samples);

    let budget_burndown = cumulative(weekly_totals(weekly_cost_samples(
        &records,
        &projects_by_id,
        settings.default_hourly_rate,
    )));

    let scope_trend = weekly_totals(
        metrics
            .iter()
            .map(|row| (row.week_start_date, row.scope_completed)),
    );

    Ok((effort_breakdown, budget_burndown, scope_trend))
}

/// Per-week cost contributions of the valid, non-orphaned records, each
/// costed at its own project's resolved rate.
fn weekly_cost_samples<'a>(
    records: &'a [EffortRecord],
    projects_by_id: &'a HashMap<i64, project::Model>,
    default_rate: f64,
) -> impl Iterator<Item = (NaiveDate, f64)> + 'a {
    records.iter().filter_map(move |record| {
        let resource = record.resource.resolved()?;
        let hours = record.effort.hours;
        if !hours.is_finite() || hours < 0.0 {
            return None;
        }
        let project = projects_by_id.get(&record.effort.project_id)?;
        let rate = resolve_hourly_rate(project, Some(resource), default_rate);
        Some((record.effort.week_start_date, hours * rate))
    })
}
