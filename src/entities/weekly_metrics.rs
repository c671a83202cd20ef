//! Weekly metrics entity - A per-project weekly rollup snapshot.
//!
//! Distinct from the individual effort rows: one row per (project,
//! `week_start_date`) carrying the pre-aggregated `rollup_hours` and the
//! manager-reported scope completion for that week. `scope_completed` may
//! regress week-over-week - scope can shrink on re-estimation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Weekly metrics database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "weekly_metrics")]
pub struct Model {
    /// Unique identifier for the metrics row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the project the rollup belongs to (soft reference)
    pub project_id: i64,
    /// Monday of the week the rollup covers
    pub week_start_date: Date,
    /// Sunday of the same week
    pub week_end_date: Date,
    /// Total hours rolled up from the week's effort rows
    pub rollup_hours: f64,
    /// Scope completion reported for the week (percent, may regress)
    pub scope_completed: f64,
    /// Free-text status commentary for the week
    pub comments: Option<String>,
}

/// Defines relationships between WeeklyMetrics and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each metrics row belongs to one project
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
