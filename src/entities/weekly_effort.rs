//! Weekly effort entity - Hours one resource logged against one project in
//! one calendar week.
//!
//! The write path keeps at most one row per (project, resource,
//! `week_start_date`) and normalizes weeks to Monday..Sunday. Both references
//! are soft: rows survive project or resource deletion and are then treated
//! as orphaned by the analytics engine.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Weekly effort database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "weekly_efforts")]
pub struct Model {
    /// Unique identifier for the effort row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the project the hours were logged against (soft reference)
    pub project_id: i64,
    /// ID of the resource who logged the hours (soft reference)
    pub resource_id: i64,
    /// Hours logged during the week, validated to 0-168 at write time
    pub hours: f64,
    /// Monday of the week the hours belong to
    pub week_start_date: Date,
    /// Sunday of the same week
    pub week_end_date: Date,
}

/// Defines relationships between WeeklyEffort and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each effort row belongs to one project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
    /// Each effort row belongs to one resource
    #[sea_orm(
        belongs_to = "super::resource::Entity",
        from = "Column::ResourceId",
        to = "super::resource::Column::Id"
    )]
    Resource,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resource.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
