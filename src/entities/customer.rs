//! Customer entity - Represents the client a project is delivered for.
//!
//! Customers are referenced by projects and drive the per-customer breakdown
//! on the portfolio dashboards. Like every entity in the system they are
//! soft-deleted, so historical projects keep their reference.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    /// Unique identifier for the customer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Customer (client) name shown in dashboard breakdowns
    pub name: String,
    /// Soft delete flag - if true, customer is hidden but data is preserved
    pub is_deleted: bool,
}

/// Defines relationships between Customer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One customer has many projects
    #[sea_orm(has_many = "super::project::Entity")]
    Projects,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
