//! Milestone entity - A dated delivery checkpoint within a project.
//!
//! Milestone-tracked projects judge schedule health against these rows: a
//! milestone is completed when `completed_date` is set, and it was on time
//! when that date is no later than `estimated_date`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Milestone database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "milestones")]
pub struct Model {
    /// Unique identifier for the milestone
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the project this milestone belongs to
    pub project_id: i64,
    /// What the milestone delivers
    pub description: String,
    /// Date the milestone is planned to complete
    pub estimated_date: Date,
    /// Effort in hours estimated for this milestone
    pub estimated_effort: f64,
    /// Share of total project scope completed at this milestone (percent)
    pub scope_completed: f64,
    /// Actual completion date, None while the milestone is open
    pub completed_date: Option<Date>,
}

/// Defines relationships between Milestone and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each milestone belongs to one project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
