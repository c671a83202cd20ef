//! Core analytics engine - framework-agnostic computation over persisted
//! portfolio records.
//!
//! The leaf modules are pure primitives: rate resolution, cost and variance
//! arithmetic, weekly series construction, and utilization estimation. The
//! aggregator modules compose them over a selected project set into the
//! dashboard payloads. Aggregators read through [`crate::db`] and hold no
//! state between calls - every invocation re-derives from current data.

pub mod cost;
pub mod dashboard;
pub mod drilldown;
pub mod kpi;
pub mod rates;
pub mod timeseries;
pub mod trends;
pub mod utilization;

pub use cost::{actual_cost, percent_of, round1, total_valid_hours, variance_pct};
pub use dashboard::{
    BUDGET_COMPARISON_PROJECT_LIMIT, EFFORT_TREND_WEEKS, PortfolioDashboard,
    format_portfolio_dashboard, manager_dashboard, organization_dashboard,
};
pub use drilldown::{MilestoneStatus, ProjectDrilldown, milestone_status, project_drilldown};
pub use kpi::{KpiSummary, completed_on_time, format_kpi_summary, kpi_summary};
pub use rates::resolve_hourly_rate;
pub use timeseries::{BreakdownSeries, KeyedSample, TrendPoint};
pub use trends::{DEFAULT_TREND_WINDOW_DAYS, TrendsView, trends_view};
pub use utilization::{CAPACITY_PERCENTILE_RANK, realistic_capacity, resource_utilization};
