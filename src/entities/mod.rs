//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod customer;
pub mod milestone;
pub mod project;
pub mod resource;
pub mod weekly_effort;
pub mod weekly_metrics;

// Re-export specific types to avoid conflicts
pub use customer::{Column as CustomerColumn, Entity as Customer, Model as CustomerModel};
pub use milestone::{Column as MilestoneColumn, Entity as Milestone, Model as MilestoneModel};
pub use project::{
    Column as ProjectColumn, Entity as Project, Model as ProjectModel, ProjectStatus, RagStatus,
    RateSource, TrackingBy,
};
pub use resource::{Column as ResourceColumn, Entity as Resource, Model as ResourceModel};
pub use weekly_effort::{
    Column as WeeklyEffortColumn, Entity as WeeklyEffort, Model as WeeklyEffortModel,
};
pub use weekly_metrics::{
    Column as WeeklyMetricsColumn, Entity as WeeklyMetrics, Model as WeeklyMetricsModel,
};
