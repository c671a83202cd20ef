//! Manager and organization dashboards.
//!
//! Both views share one payload shape: headline counts, per-project
//! summaries, status and customer breakdowns, a rolling effort trend, a
//! bounded budget-vs-actual comparison, and resource allocation totals.
//! The manager view scopes the project set to one manager; the
//! organization view takes every non-deleted project.

use crate::{
    config::settings::OrganizationSettings,
    core::{
        cost::{actual_cost, round1, variance_pct},
        timeseries::TrendPoint,
    },
    db::{self, EffortRecord},
    entities::{ProjectStatus, RagStatus, project},
    errors::Result,
};
use chrono::{Duration, NaiveDate};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::instrument;

/// Length of the rolling effort trend shown on portfolio dashboards,
/// counting the current week.
pub const EFFORT_TREND_WEEKS: i64 = 12;

/// Number of projects included in the budget comparison, to bound the
/// payload for large portfolios. Projects are taken in name order.
pub const BUDGET_COMPARISON_PROJECT_LIMIT: usize = 10;

/// One project's headline row on a portfolio dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub id: i64,
    pub name: String,
    /// Customer name, when the reference resolves.
    pub customer: Option<String>,
    pub project_status: ProjectStatus,
    pub overall_status: RagStatus,
    /// Latest reported cumulative scope percentage, 0 when never reported.
    pub scope_completed: f64,
    pub estimated_budget: f64,
}

/// Counts of projects by overall RAG status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub red: usize,
    pub amber: usize,
    pub green: usize,
}

/// Budget position of one project: estimate against cost to date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetComparison {
    pub project_id: i64,
    pub name: String,
    pub estimated_budget: f64,
    pub actual_cost: f64,
    /// Percentage deviation of actual cost from the estimate, one decimal.
    pub variance_pct: f64,
}

/// Total hours a resource has logged across the selected projects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceAllocation {
    pub resource_id: i64,
    pub name: String,
    pub total_hours: f64,
}

/// The assembled dashboard payload for a manager or the whole
/// organization.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioDashboard {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    pub deferred_projects: usize,
    pub project_summaries: Vec<ProjectSummary>,
    pub status_breakdown: StatusBreakdown,
    /// Project counts per customer name; projects without a resolvable
    /// customer are not counted.
    pub customer_breakdown: BTreeMap<String, usize>,
    /// Rolling [`EFFORT_TREND_WEEKS`]-week effort trend, sparse.
    pub effort_trend: Vec<TrendPoint>,
    /// Budget-vs-actual for the first
    /// [`BUDGET_COMPARISON_PROJECT_LIMIT`] projects.
    pub budget_comparison: Vec<BudgetComparison>,
    /// All-time logged hours per resource, highest first.
    pub resource_allocation: Vec<ResourceAllocation>,
}

/// Builds the dashboard for the projects managed by one resource.
///
/// An unknown manager ID is not an error; it simply selects an empty
/// project set.
#[instrument(skip(db, settings))]
pub async fn manager_dashboard(
    db: &DatabaseConnection,
    manager_id: i64,
    today: NaiveDate,
    settings: &OrganizationSettings,
) -> Result<PortfolioDashboard> {
    let projects = db::list_projects_for_manager(db, manager_id).await?;
    assemble_dashboard(db, projects, today, settings).await
}

/// Builds the organization-wide dashboard over every non-deleted project.
#[instrument(skip(db, settings))]
pub async fn organization_dashboard(
    db: &DatabaseConnection,
    today: NaiveDate,
    settings: &OrganizationSettings,
) -> Result<PortfolioDashboard> {
    let projects = db::list_projects(db).await?;
    assemble_dashboard(db, projects, today, settings).await
}

async fn assemble_dashboard(
    db: &DatabaseConnection,
    projects: Vec<project::Model>,
    today: NaiveDate,
    settings: &OrganizationSettings,
) -> Result<PortfolioDashboard> {
    let project_ids: Vec<i64> = projects.iter().map(|p| p.id).collect();
    let trend_since = db::week_bounds(today).0 - Duration::weeks(EFFORT_TREND_WEEKS - 1);

    // Independent reads, issued together.
    let (weekly_hours, records, customers, latest_scope) = tokio::try_join!(
        db::sum_hours_by_week(db, &project_ids, Some(trend_since)),
        db::list_efforts_for_projects(db, &project_ids, None),
        db::customer_names(db),
        db::latest_scope_by_project(db, &project_ids),
    )?;

    let mut active_projects = 0;
    let mut completed_projects = 0;
    let mut deferred_projects = 0;
    let mut status_breakdown = StatusBreakdown::default();
    let mut customer_breakdown: BTreeMap<String, usize> = BTreeMap::new();

    for project in &projects {
        match project.project_status {
            ProjectStatus::Active => active_projects += 1,
            ProjectStatus::Completed => completed_projects += 1,
            ProjectStatus::Deferred => deferred_projects += 1,
        }
        match project.overall_status {
            RagStatus::Red => status_breakdown.red += 1,
            RagStatus::Amber => status_breakdown.amber += 1,
            RagStatus::Green => status_breakdown.green += 1,
        }
        if let Some(customer_id) = project.customer_id {
            if let Some(name) = customers.get(&customer_id) {
                *customer_breakdown.entry(name.clone()).or_insert(0) += 1;
            }
        }
    }

    let project_summaries = projects
        .iter()
        .map(|project| ProjectSummary {
            id: project.id,
            name: project.name.clone(),
            customer: project.customer_id.and_then(|id| customers.get(&id).cloned()),
            project_status: project.project_status,
            overall_status: project.overall_status,
            scope_completed: latest_scope.get(&project.id).copied().unwrap_or(0.0),
            estimated_budget: project.estimated_budget,
        })
        .collect();

    let mut records_by_project: HashMap<i64, Vec<EffortRecord>> = HashMap::new();
    for record in records {
        records_by_project
            .entry(record.effort.project_id)
            .or_default()
            .push(record);
    }

    let budget_comparison = projects
        .iter()
        .take(BUDGET_COMPARISON_PROJECT_LIMIT)
        .map(|project| {
            let cost = records_by_project
                .get(&project.id)
                .map_or(0.0, |rows| actual_cost(rows, project, settings.default_hourly_rate));
            BudgetComparison {
                project_id: project.id,
                name: project.name.clone(),
                estimated_budget: project.estimated_budget,
                actual_cost: cost,
                variance_pct: round1(variance_pct(cost, project.estimated_budget)),
            }
        })
        .collect();

    let mut allocation_totals: HashMap<i64, (String, f64)> = HashMap::new();
    for record in records_by_project.values().flatten() {
        if let Some(resource) = record.resource.resolved() {
            let hours = record.effort.hours;
            if hours.is_finite() && hours >= 0.0 {
                let entry = allocation_totals
                    .entry(resource.id)
                    .or_insert_with(|| (resource.name.clone(), 0.0));
                entry.1 += hours;
            }
        }
    }
    let mut resource_allocation: Vec<ResourceAllocation> = allocation_totals
        .into_iter()
        .map(|(resource_id, (name, total_hours))| ResourceAllocation {
            resource_id,
            name,
            total_hours,
        })
        .collect();
    resource_allocation.sort_by(|a, b| {
        b.total_hours
            .partial_cmp(&a.total_hours)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    let effort_trend = weekly_hours
        .into_iter()
        .map(|(week_start, value)| TrendPoint { week_start, value })
        .collect();

    Ok(PortfolioDashboard {
        total_projects: projects.len(),
        active_projects,
        completed_projects,
        deferred_projects,
        project_summaries,
        status_breakdown,
        customer_breakdown,
        effort_trend,
        budget_comparison,
        resource_allocation,
    })
}

/// Formats a dashboard into a human-readable summary block, for logging
/// or terminal display.
#[must_use]
pub fn format_portfolio_dashboard(dashboard: &PortfolioDashboard) -> String {
    use std::fmt::Write;

    let mut out = format!(
        "Portfolio: {} projects ({} active, {} completed, {} deferred)\n",
        dashboard.total_projects,
        dashboard.active_projects,
        dashboard.completed_projects,
        dashboard.deferred_projects
    );

    // write! is infallible when writing to String, so unwrap is safe
    #[allow(clippy::unwrap_used)]
    {
        writeln!(
            out,
            "Overall status: {} green | {} amber | {} red",
            dashboard.status_breakdown.green,
            dashboard.status_breakdown.amber,
            dashboard.status_breakdown.red
        )
        .unwrap();

        if !dashboard.budget_comparison.is_empty() {
            writeln!(out, "Budget positions:").unwrap();
            for row in &dashboard.budget_comparison {
                writeln!(
                    out,
                    "  {} | ${:.2} est → ${:.2} actual ({:+.1}%)",
                    row.name, row.estimated_budget, row.actual_cost, row.variance_pct
                )
                .unwrap();
            }
        }

        if !dashboard.resource_allocation.is_empty() {
            writeln!(out, "Resource allocation:").unwrap();
            for row in &dashboard.resource_allocation {
                writeln!(out, "  {} - {:.1}h", row.name, row.total_hours).unwrap();
            }
        }
    }

    out
}
