//! Single-project drill-down.
//!
//! The deep view behind a dashboard row: cumulative effort split by
//! resource, budget burn-down against the estimate, the scope-completion
//! history with week-over-week deltas, milestone states, and headline
//! consumption percentages. Before assembly the project's stored weekly
//! rollups are refreshed from the effort table, the one write this module
//! triggers.

use crate::{
    core::{
        cost::{actual_cost, percent_of, round1, total_valid_hours},
        rates::resolve_hourly_rate,
        timeseries::{
            BreakdownSeries, KeyedSample, TrendPoint, cumulative, cumulative_breakdown, deltas,
            weekly_breakdown, weekly_totals,
        },
    },
    config::settings::OrganizationSettings,
    db,
    entities::{milestone, project},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::instrument;

/// Schedule state of one milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MilestoneStatus {
    Completed,
    Delayed,
    OnTrack,
}

/// One milestone with its derived schedule state.
#[derive(Debug, Clone, Serialize)]
pub struct MilestoneView {
    pub id: i64,
    pub description: String,
    pub estimated_date: NaiveDate,
    pub completed_date: Option<NaiveDate>,
    pub estimated_effort: f64,
    /// Share of project scope this milestone delivered, percentage points.
    pub scope_completed: f64,
    pub status: MilestoneStatus,
}

/// The drill-down payload for a single project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDrilldown {
    pub project: project::Model,
    /// Customer name, when the reference resolves.
    pub customer: Option<String>,
    /// Cumulative logged hours per resource over a shared week axis.
    pub effort_by_resource: BreakdownSeries,
    /// Cumulative cost per week, for plotting against the estimate.
    pub budget_burndown: Vec<TrendPoint>,
    /// Reported cumulative scope percentage per metrics week.
    pub scope_trend: Vec<TrendPoint>,
    /// Week-over-week scope movement; the first week counts from 0.
    pub scope_deltas: Vec<TrendPoint>,
    pub milestones: Vec<MilestoneView>,
    pub actual_effort_hours: f64,
    pub actual_cost: f64,
    /// Hours consumed as a percentage of estimated effort, one decimal.
    pub effort_used_pct: f64,
    /// Cost consumed as a percentage of estimated budget, one decimal.
    pub cost_used_pct: f64,
}

/// Derives a milestone's schedule state as of `today`.
///
/// Completed once a completion date is set; Delayed when incomplete past
/// its estimated date; otherwise On Track.
#[must_use]
pub fn milestone_status(milestone: &milestone::Model, today: NaiveDate) -> MilestoneStatus {
    if milestone.completed_date.is_some() {
        MilestoneStatus::Completed
    } else if today > milestone.estimated_date {
        MilestoneStatus::Delayed
    } else {
        MilestoneStatus::OnTrack
    }
}

/// Assembles the drill-down for one project.
///
/// # Errors
/// Returns [`crate::errors::Error::ProjectNotFound`] when the project is
/// missing or soft-deleted; malformed underlying rows are excluded, not
/// raised.
#[instrument(skip(db, settings))]
pub async fn project_drilldown(
    db: &DatabaseConnection,
    project_id: i64,
    today: NaiveDate,
    settings: &OrganizationSettings,
) -> Result<ProjectDrilldown> {
    let project = db::get_project(db, project_id).await?;

    // The stored rollups may trail the effort table; bring them in line
    // before reading anything derived from them.
    db::refresh_rollup_hours(db, project_id).await?;

    let (records, metrics, milestones, customers) = tokio::try_join!(
        db::list_efforts_for_project(db, project_id),
        db::list_metrics_for_project(db, project_id, None),
        db::list_milestones(db, project_id),
        db::customer_names(db),
    )?;

    let default_rate = settings.default_hourly_rate;

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
    let effort_by_resource = cumulative_breakdown(weekly_breakdown(effort_samples));

    let cost_samples = records.iter().filter_map(|record| {
        let resource = record.resource.resolved()?;
        let hours = record.effort.hours;
        if !hours.is_finite() || hours < 0.0 {
            return None;
        }
        let rate = resolve_hourly_rate(&project, Some(resource), default_rate);
        Some((record.effort.week_start_date, hours * rate))
    });
    let budget_burndown = cumulative(weekly_totals(cost_samples));

    let scope_trend: Vec<TrendPoint> = metrics
        .iter()
        .map(|row| TrendPoint {
            week_start: row.week_start_date,
            value: row.scope_completed,
        })
        .collect();
    let scope_deltas = deltas(&scope_trend);

    let milestones = milestones
        .into_iter()
        .map(|m| {
            let status = milestone_status(&m, today);
            MilestoneView {
                id: m.id,
                description: m.description,
                estimated_date: m.estimated_date,
                completed_date: m.completed_date,
                estimated_effort: m.estimated_effort,
                scope_completed: m.scope_completed,
                status,
            }
        })
        .collect();

    let actual_effort_hours = total_valid_hours(&records);
    let cost = actual_cost(&records, &project, default_rate);
    let effort_used_pct = round1(percent_of(actual_effort_hours, project.estimated_effort));
    let cost_used_pct = round1(percent_of(cost, project.estimated_budget));
    let customer = project.customer_id.and_then(|id| customers.get(&id).cloned());

    Ok(ProjectDrilldown {
        project,
        customer,
        effort_by_resource,
        budget_burndown,
        scope_trend,
        scope_deltas,
        milestones,
        actual_effort_hours,
        actual_cost: cost,
        effort_used_pct,
        cost_used_pct,
    })
}
