//! Scalar KPI rollup.
//!
//! Where the dashboards return series, this module boils a project set down
//! to headline numbers: the share of projects reading Green, how often
//! completed projects actually finished on time, summed budget and schedule
//! variances, and the mean resource utilization. On-time classification
//! follows each project's tracking mode - against the planned end date for
//! end-date-tracked projects, against the milestone plan otherwise.

use crate::{
    config::settings::OrganizationSettings,
    core::{
        cost::{actual_cost, round1, total_valid_hours, variance_pct},
        utilization::resource_utilization,
    },
    db::{self, EffortRecord},
    entities::{ProjectStatus, RagStatus, TrackingBy, milestone, project},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::HashMap;
use tracing::instrument;

/// Scalar KPI rollup across a project set.
#[derive(Debug, Clone, Serialize)]
pub struct KpiSummary {
    pub total_projects: usize,
    pub completed_projects: usize,
    /// Percentage of projects whose overall RAG status is Green, one decimal.
    pub health_score: f64,
    /// Percentage of completed projects that finished on time, one decimal.
    /// 0 when nothing has completed yet.
    pub on_time_completion_rate: f64,
    /// Deviation of summed actual cost from summed estimated budget, one
    /// decimal.
    pub budget_variance_pct: f64,
    /// Deviation of summed valid hours from summed estimated effort, one
    /// decimal.
    pub schedule_variance_pct: f64,
    /// Mean per-resource utilization ratio in `[0, 1]`.
    pub resource_utilization: f64,
}

/// Decides whether a completed project finished on time.
///
/// End-date-tracked projects compare their derived completion date - the
/// week end of the last recorded activity, metrics rows first, effort rows
/// as fallback - against the planned end date; with no recorded activity
/// there is no evidence of lateness and the project counts as on time.
/// Milestone-tracked projects are on time when every completed milestone
/// has a completion date no later than its estimated date; open milestones
/// are not judged.
#[must_use]
pub fn completed_on_time(
    project: &project::Model,
    milestones: &[milestone::Model],
    last_activity: Option<NaiveDate>,
) -> bool {
    match project.tracking_by {
        TrackingBy::EndDate => last_activity.is_none_or(|done| done <= project.end_date),
        TrackingBy::Milestone => milestones
            .iter()
            .filter_map(|m| m.completed_date.map(|done| (done, m.estimated_date)))
            .all(|(done, estimated)| done <= estimated),
    }
}

/// Computes the KPI summary for one manager's projects, or for the whole
/// organization when no manager is given.
///
/// The health score reads the manually assessed overall RAG statuses; the
/// variances compare summed actuals against summed estimates with
/// per-project rate resolution; the on-time rate judges completed projects
/// per [`completed_on_time`]. An unknown manager ID selects an empty
/// project set, not an error.
#[instrument(skip(db, settings))]
pub async fn kpi_summary(
    db: &DatabaseConnection,
    manager_id: Option<i64>,
    settings: &OrganizationSettings,
) -> Result<KpiSummary> {
    let projects = match manager_id {
        Some(id) => db::list_projects_for_manager(db, id).await?,
        None => db::list_projects(db).await?,
    };

    let project_ids: Vec<i64> = projects.iter().map(|p| p.id).collect();
    let completed_ids: Vec<i64> = projects
        .iter()
        .filter(|p| p.project_status == ProjectStatus::Completed)
        .map(|p| p.id)
        .collect();

    // Independent reads, issued together. The milestone and last-activity
    // reads only matter for completed projects, so they are scoped to those.
    let (records, milestones, last_metrics, last_efforts) = tokio::try_join!(
        db::list_efforts_for_projects(db, &project_ids, None),
        db::list_milestones_for_projects(db, &completed_ids),
        db::last_metrics_week_end_by_project(db, &completed_ids),
        db::last_effort_week_end_by_project(db, &completed_ids),
    )?;

    let green = projects
        .iter()
        .filter(|p| p.overall_status == RagStatus::Green)
        .count();
    let health_score = percentage(green, projects.len());

    let total_estimated_budget: f64 = projects.iter().map(|p| p.estimated_budget).sum();
    let total_estimated_effort: f64 = projects.iter().map(|p| p.estimated_effort).sum();
    let total_hours = total_valid_hours(&records);
    let utilization = resource_utilization(&records);

    let mut records_by_project: HashMap<i64, Vec<EffortRecord>> = HashMap::new();
    for record in records {
        records_by_project
            .entry(record.effort.project_id)
            .or_default()
            .push(record);
    }
    let total_cost: f64 = projects
        .iter()
        .map(|project| {
            records_by_project.get(&project.id).map_or(0.0, |rows| {
                actual_cost(rows, project, settings.default_hourly_rate)
            })
        })
        .sum();

    let mut milestones_by_project: HashMap<i64, Vec<milestone::Model>> = HashMap::new();
    for milestone in milestones {
        milestones_by_project
            .entry(milestone.project_id)
            .or_default()
            .push(milestone);
    }

    let completed: Vec<&project::Model> = projects
        .iter()
        .filter(|p| p.project_status == ProjectStatus::Completed)
        .collect();
    let on_time = completed
        .iter()
        .filter(|project| {
            let project_milestones: &[milestone::Model] = milestones_by_project
                .get(&project.id)
                .map_or(&[], Vec::as_slice);
            let last_activity = last_metrics
                .get(&project.id)
                .or_else(|| last_efforts.get(&project.id))
                .copied();
            completed_on_time(project, project_milestones, last_activity)
        })
        .count();
    let on_time_completion_rate = percentage(on_time, completed.len());

    Ok(KpiSummary {
        total_projects: projects.len(),
        completed_projects: completed.len(),
        health_score,
        on_time_completion_rate,
        budget_variance_pct: round1(variance_pct(total_cost, total_estimated_budget)),
        schedule_variance_pct: round1(variance_pct(total_hours, total_estimated_effort)),
        resource_utilization: utilization,
    })
}

/// Share of `count` in `total` as a percentage rounded to one decimal, 0
/// for an empty total.
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    // Cast safety: project counts are small positive integers, far below
    // f64's exact-integer range.
    #[allow(clippy::cast_precision_loss)]
    let ratio = count as f64 / total as f64;
    round1(ratio * 100.0)
}

/// Formats a KPI summary into a human-readable block, for logging or
/// terminal display.
#[must_use]
pub fn format_kpi_summary(summary: &KpiSummary) -> String {
    use std::fmt::Write;

    let mut out = format!(
        "KPIs across {} projects ({} completed)\n",
        summary.total_projects, summary.completed_projects
    );

    // write! is infallible when writing to String, so unwrap is safe
    #[allow(clippy::unwrap_used)]
    {
        writeln!(out, "  Health score: {:.1}% green", summary.health_score).unwrap();
        writeln!(
            out,
            "  On-time completion: {:.1}%",
            summary.on_time_completion_rate
        )
        .unwrap();
        writeln!(
            out,
            "  Budget variance: {:+.1}% | Schedule variance: {:+.1}%",
            summary.budget_variance_pct, summary.schedule_variance_pct
        )
        .unwrap();
        writeln!(
            out,
            "  Resource utilization: {:.0}%",
            summary.resource_utilization * 100.0
        )
        .unwrap();
    }

    out
}
