//! Persistence layer: validated writes and read queries over the portfolio
//! schema. Analytics in [`crate::core`] consume these reads and never talk
//! to the database directly.

pub mod customers;
pub mod efforts;
pub mod metrics;
pub mod projects;
pub mod resources;

pub use customers::{create_customer, customer_names, list_customers, soft_delete_customer};
pub use efforts::{
    EffortRecord, MAX_WEEKLY_HOURS, ResourceRef, last_effort_week_end_by_project,
    list_efforts_for_project, list_efforts_for_projects, log_weekly_effort,
    sum_hours_by_project_and_week, sum_hours_by_week, sum_hours_for_week, week_bounds,
};
pub use metrics::{
    last_metrics_week_end_by_project, latest_scope_by_project, list_metrics_for_project,
    list_metrics_for_projects_since, record_weekly_metrics, refresh_rollup_hours,
};
pub use projects::{
    CreateProjectArgs, StatusUpdateArgs, add_milestone, complete_milestone, create_project,
    get_project, list_milestones, list_milestones_for_projects, list_projects,
    list_projects_for_manager, soft_delete_project, update_project_statuses,
};
pub use resources::{
    create_resource, get_resource_by_id, list_resources, resource_map, seed_initial_resources,
    set_resource_active, soft_delete_resource,
};
