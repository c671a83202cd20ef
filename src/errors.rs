//! Unified error types and result handling for `portfolio-pulse`.

use thiserror::Error;

/// All failure modes surfaced by the crate.
///
/// Not-Found variants are raised only for directly requested entities;
/// malformed or orphaned underlying records are excluded from aggregations
/// and logged, never raised (see the dashboard modules in [`crate::core`]).
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Project not found: {id}")]
    ProjectNotFound { id: i64 },

    #[error("Resource not found: {id}")]
    ResourceNotFound { id: i64 },

    #[error("Customer not found: {id}")]
    CustomerNotFound { id: i64 },

    #[error("Milestone not found: {id}")]
    MilestoneNotFound { id: i64 },

    #[error("Invalid hours value: {hours}")]
    InvalidHours { hours: f64 },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
