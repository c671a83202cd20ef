//! Project entity - The unit the portfolio is tracked and reported on.
//!
//! A project carries its schedule (`start_date`/`end_date`), its estimates
//! (effort in hours, budget in currency), the rate-source policy that decides
//! how logged hours are costed, a lifecycle status and the four RAG health
//! statuses set by the project manager. Projects reference a customer and an
//! assigned manager (a resource); both references are soft and may dangle
//! after deletions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where the hourly rate applied to logged effort comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RateSource {
    /// Use the project's own `hourly_rate`
    #[sea_orm(string_value = "project")]
    Project,
    /// Use the logging resource's `per_hour_rate`
    #[sea_orm(string_value = "resource")]
    Resource,
    /// Use the organization-wide default rate
    #[sea_orm(string_value = "organization")]
    Organization,
}

/// Lifecycle status of a project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ProjectStatus {
    /// Work is ongoing
    #[sea_orm(string_value = "active")]
    Active,
    /// Delivery finished
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Paused or pushed out
    #[sea_orm(string_value = "deferred")]
    Deferred,
}

/// Red/Amber/Green qualitative health indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum RagStatus {
    /// Off track
    #[sea_orm(string_value = "red")]
    Red,
    /// At risk
    #[sea_orm(string_value = "amber")]
    Amber,
    /// On track
    #[sea_orm(string_value = "green")]
    Green,
}

/// How schedule completion is judged for the project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TrackingBy {
    /// A single planned end date
    #[sea_orm(string_value = "end_date")]
    EndDate,
    /// A sequence of dated milestones
    #[sea_orm(string_value = "milestone")]
    Milestone,
}

/// Project database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    /// Unique identifier for the project
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable project name
    pub name: String,
    /// Customer the project is delivered for (soft reference)
    pub customer_id: Option<i64>,
    /// Resource id of the assigned manager (soft reference)
    pub manager_id: Option<i64>,
    /// Planned start date
    pub start_date: Date,
    /// Planned end date
    pub end_date: Date,
    /// Estimated total effort in hours
    pub estimated_effort: f64,
    /// Estimated budget in the organization currency
    pub estimated_budget: f64,
    /// Project-specific hourly rate, used when `hourly_rate_source` is `Project`
    pub hourly_rate: Option<f64>,
    /// Which rate tier applies to logged hours
    pub hourly_rate_source: RateSource,
    /// Lifecycle status
    pub project_status: ProjectStatus,
    /// Manager-set overall RAG health
    pub overall_status: RagStatus,
    /// Manager-set scope RAG health
    pub scope_status: RagStatus,
    /// Manager-set quality RAG health
    pub quality_status: RagStatus,
    /// Manager-set budget RAG health
    pub budget_status: RagStatus,
    /// Whether completion is judged against the end date or the milestones
    pub tracking_by: TrackingBy,
    /// Soft delete flag - if true, project is hidden but data is preserved
    pub is_deleted: bool,
}

/// Defines relationships between Project and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each project belongs to at most one customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    /// One project has many milestones
    #[sea_orm(has_many = "super::milestone::Entity")]
    Milestones,
    /// One project has many weekly effort rows
    #[sea_orm(has_many = "super::weekly_effort::Entity")]
    WeeklyEfforts,
    /// One project has many weekly metrics rollups
    #[sea_orm(has_many = "super::weekly_metrics::Entity")]
    WeeklyMetrics,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::milestone::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Milestones.def()
    }
}

impl Related<super::weekly_effort::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WeeklyEfforts.def()
    }
}

impl Related<super::weekly_metrics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WeeklyMetrics.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
