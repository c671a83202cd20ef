//! Database configuration module for `portfolio-pulse`.
//!
//! This module handles `SQLite` database connection and table creation using
//! `SeaORM`. It provides functions for establishing database connections and
//! creating all necessary tables based on the entity definitions. The module
//! uses `SeaORM`'s `Schema::create_table_from_entity` method to automatically
//! generate SQL statements from the entity models, ensuring that the database
//! schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{Customer, Milestone, Project, Resource, WeeklyEffort, WeeklyMetrics};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/portfolio_pulse.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL`
/// environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is
/// set. This function handles connection errors and provides a clean interface
/// for database access throughout the application.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url())
        .await
        .map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation
/// from entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate
/// proper SQL statements for table creation, ensuring the database schema
/// matches the Rust struct definitions. It creates tables for customers,
/// resources, projects, milestones, weekly efforts and weekly metrics. The
/// statements carry `IF NOT EXISTS`, so running this at every startup
/// against an existing database is safe.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut customer_table = schema.create_table_from_entity(Customer);
    let mut resource_table = schema.create_table_from_entity(Resource);
    let mut project_table = schema.create_table_from_entity(Project);
    let mut milestone_table = schema.create_table_from_entity(Milestone);
    let mut effort_table = schema.create_table_from_entity(WeeklyEffort);
    let mut metrics_table = schema.create_table_from_entity(WeeklyMetrics);

    db.execute(builder.build(customer_table.if_not_exists())).await?;
    db.execute(builder.build(resource_table.if_not_exists())).await?;
    db.execute(builder.build(project_table.if_not_exists())).await?;
    db.execute(builder.build(milestone_table.if_not_exists())).await?;
    db.execute(builder.build(effort_table.if_not_exists())).await?;
    db.execute(builder.build(metrics_table.if_not_exists())).await?;

    Ok(())
}
