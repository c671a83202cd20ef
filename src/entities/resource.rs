//! Resource entity - Represents a person who logs hours against projects.
//!
//! Each resource carries its own hourly rate, used when a project is
//! configured with the resource-level rate source. Resources can be marked
//! inactive (on leave, left the organization) without being deleted; weekly
//! effort rows referencing a soft-deleted resource are treated as orphaned
//! by the analytics engine.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Resource database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    /// Unique identifier for the resource
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the person
    pub name: String,
    /// Billing rate per logged hour, in `currency`
    pub per_hour_rate: f64,
    /// ISO currency code the rate is denominated in (e.g., "USD")
    pub currency: String,
    /// Whether the resource is currently available for assignment
    pub is_active: bool,
    /// Soft delete flag - if true, resource is hidden but data is preserved
    pub is_deleted: bool,
}

/// Defines relationships between Resource and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One resource has many weekly effort rows across many projects
    #[sea_orm(has_many = "super::weekly_effort::Entity")]
    WeeklyEfforts,
}

impl Related<super::weekly_effort::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WeeklyEfforts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
