//! Project and milestone persistence.
//!
//! Projects carry the estimation baseline (effort, budget, dates) and the
//! manually assessed RAG statuses; milestones hang off milestone-tracked
//! projects. Soft-deleted projects are treated as missing by every read
//! here, so the analytics layer never sees them.

use crate::{
    entities::{
        Customer, Milestone, Project, ProjectStatus, RagStatus, RateSource, Resource, TrackingBy,
        customer, milestone, project, resource,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{info, instrument};

/// Arguments for creating a project. Grouped because the estimation
/// baseline alone is five fields.
#[derive(Debug)]
pub struct CreateProjectArgs {
    pub name: String,
    pub customer_id: Option<i64>,
    pub manager_id: Option<i64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub estimated_effort: f64,
    pub estimated_budget: f64,
    pub hourly_rate: Option<f64>,
    pub hourly_rate_source: RateSource,
    pub tracking_by: TrackingBy,
}

/// Flexible status update: only the fields set to `Some` change.
#[derive(Debug, Default)]
pub struct StatusUpdateArgs {
    pub project_status: Option<ProjectStatus>,
    pub overall_status: Option<RagStatus>,
    pub scope_status: Option<RagStatus>,
    pub quality_status: Option<RagStatus>,
    pub budget_status: Option<RagStatus>,
}

/// Creates a new project with its estimation baseline.
///
/// Validates the name, the date range, and every numeric field (finite and
/// non-negative). Referenced customers and managers must exist and not be
/// soft-deleted. New projects start `Active` with all RAG statuses `Green`.
#[instrument(skip(db, args))]
pub async fn create_project(
    db: &DatabaseConnection,
    args: CreateProjectArgs,
) -> Result<project::Model> {
    if args.name.trim().is_empty() {
        return Err(Error::Config {
            message: "Project name cannot be empty".to_string(),
        });
    }

    if args.end_date < args.start_date {
        return Err(Error::Config {
            message: format!(
                "Project end date {} precedes start date {}",
                args.end_date, args.start_date
            ),
        });
    }

    if !args.estimated_effort.is_finite() || args.estimated_effort < 0.0 {
        return Err(Error::InvalidHours {
            hours: args.estimated_effort,
        });
    }

    if !args.estimated_budget.is_finite() || args.estimated_budget < 0.0 {
        return Err(Error::InvalidAmount {
            amount: args.estimated_budget,
        });
    }

    if let Some(rate) = args.hourly_rate {
        if !rate.is_finite() || rate < 0.0 {
            return Err(Error::InvalidAmount { amount: rate });
        }
    }

    if let Some(customer_id) = args.customer_id {
        Customer::find_by_id(customer_id)
            .filter(customer::Column::IsDeleted.eq(false))
            .one(db)
            .await?
            .ok_or(Error::CustomerNotFound { id: customer_id })?;
    }

    if let Some(manager_id) = args.manager_id {
        Resource::find_by_id(manager_id)
            .filter(resource::Column::IsDeleted.eq(false))
            .one(db)
            .await?
            .ok_or(Error::ResourceNotFound { id: manager_id })?;
    }

    let model = project::ActiveModel {
        name: Set(args.name.trim().to_string()),
        customer_id: Set(args.customer_id),
        manager_id: Set(args.manager_id),
        start_date: Set(args.start_date),
        end_date: Set(args.end_date),
        estimated_effort: Set(args.estimated_effort),
        estimated_budget: Set(args.estimated_budget),
        hourly_rate: Set(args.hourly_rate),
        hourly_rate_source: Set(args.hourly_rate_source),
        project_status: Set(ProjectStatus::Active),
        overall_status: Set(RagStatus::Green),
        scope_status: Set(RagStatus::Green),
        quality_status: Set(RagStatus::Green),
        budget_status: Set(RagStatus::Green),
        tracking_by: Set(args.tracking_by),
        is_deleted: Set(false),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    info!("Created project '{}' (id {})", result.name, result.id);
    Ok(result)
}

/// Fetches a single project by ID, treating soft-deleted rows as missing.
pub async fn get_project(db: &DatabaseConnection, project_id: i64) -> Result<project::Model> {
    Project::find_by_id(project_id)
        .filter(project::Column::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or(Error::ProjectNotFound { id: project_id })
}

/// Retrieves all non-deleted projects ordered alphabetically by name.
pub async fn list_projects(db: &DatabaseConnection) -> Result<Vec<project::Model>> {
    Project::find()
        .filter(project::Column::IsDeleted.eq(false))
        .order_by_asc(project::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the non-deleted projects managed by the given resource,
/// ordered alphabetically by name.
pub async fn list_projects_for_manager(
    db: &DatabaseConnection,
    manager_id: i64,
) -> Result<Vec<project::Model>> {
    Project::find()
        .filter(project::Column::IsDeleted.eq(false))
        .filter(project::Column::ManagerId.eq(manager_id))
        .order_by_asc(project::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial status update to a project.
#[instrument(skip(db))]
pub async fn update_project_statuses(
    db: &DatabaseConnection,
    project_id: i64,
    args: StatusUpdateArgs,
) -> Result<project::Model> {
    let existing = get_project(db, project_id).await?;

    let mut active: project::ActiveModel = existing.into();
    if let Some(status) = args.project_status {
        active.project_status = Set(status);
    }
    if let Some(status) = args.overall_status {
        active.overall_status = Set(status);
    }
    if let Some(status) = args.scope_status {
        active.scope_status = Set(status);
    }
    if let Some(status) = args.quality_status {
        active.quality_status = Set(status);
    }
    if let Some(status) = args.budget_status {
        active.budget_status = Set(status);
    }

    let updated = active.update(db).await?;
    info!("Updated statuses for project {project_id}");
    Ok(updated)
}

/// Soft-deletes a project. Its effort and metrics history persists but is
/// excluded from every dashboard.
#[instrument(skip(db))]
pub async fn soft_delete_project(db: &DatabaseConnection, project_id: i64) -> Result<()> {
    let existing = get_project(db, project_id).await?;

    let mut active: project::ActiveModel = existing.into();
    active.is_deleted = Set(true);
    active.update(db).await?;

    info!("Soft-deleted project {project_id}");
    Ok(())
}

/// Adds a milestone to a project.
///
/// The parent project must exist and not be soft-deleted. New milestones
/// start with zero scope completed and no completion date.
#[instrument(skip(db, description))]
pub async fn add_milestone(
    db: &DatabaseConnection,
    project_id: i64,
    description: String,
    estimated_date: NaiveDate,
    estimated_effort: f64,
) -> Result<milestone::Model> {
    get_project(db, project_id).await?;

    if description.trim().is_empty() {
        return Err(Error::Config {
            message: "Milestone description cannot be empty".to_string(),
        });
    }

    if !estimated_effort.is_finite() || estimated_effort < 0.0 {
        return Err(Error::InvalidHours {
            hours: estimated_effort,
        });
    }

    let model = milestone::ActiveModel {
        project_id: Set(project_id),
        description: Set(description.trim().to_string()),
        estimated_date: Set(estimated_date),
        estimated_effort: Set(estimated_effort),
        scope_completed: Set(0.0),
        completed_date: Set(None),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    info!(
        "Added milestone {} to project {project_id} (due {})",
        result.id, result.estimated_date
    );
    Ok(result)
}

/// Marks a milestone complete on the given date, recording the share of
/// project scope it delivered (percentage points, 0 to 100).
#[instrument(skip(db))]
pub async fn complete_milestone(
    db: &DatabaseConnection,
    milestone_id: i64,
    completed_date: NaiveDate,
    scope_completed: f64,
) -> Result<milestone::Model> {
    if !scope_completed.is_finite() || !(0.0..=100.0).contains(&scope_completed) {
        return Err(Error::InvalidAmount {
            amount: scope_completed,
        });
    }

    let existing = Milestone::find_by_id(milestone_id)
        .one(db)
        .await?
        .ok_or(Error::MilestoneNotFound { id: milestone_id })?;

    let mut active: milestone::ActiveModel = existing.into();
    active.completed_date = Set(Some(completed_date));
    active.scope_completed = Set(scope_completed);

    let updated = active.update(db).await?;
    info!("Completed milestone {milestone_id} on {completed_date}");
    Ok(updated)
}

/// Retrieves a project's milestones ordered by estimated date, ties broken
/// by id.
pub async fn list_milestones(
    db: &DatabaseConnection,
    project_id: i64,
) -> Result<Vec<milestone::Model>> {
    Milestone::find()
        .filter(milestone::Column::ProjectId.eq(project_id))
        .order_by_asc(milestone::Column::EstimatedDate)
        .order_by_asc(milestone::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves milestones for a set of projects in one query, ordered by
/// estimated date, ties broken by id.
pub async fn list_milestones_for_projects(
    db: &DatabaseConnection,
    project_ids: &[i64],
) -> Result<Vec<milestone::Model>> {
    if project_ids.is_empty() {
        return Ok(Vec::new());
    }

    Milestone::find()
        .filter(milestone::Column::ProjectId.is_in(project_ids.iter().copied()))
        .order_by_asc(milestone::Column::EstimatedDate)
        .order_by_asc(milestone::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
