//! Shared test utilities for `PortfolioPulse`.
//!
//! This module provides common helper functions for setting up test
//! databases, building project-creation arguments with sensible defaults,
//! and constructing synthetic models for the pure analytics functions.

#![allow(clippy::unwrap_used)]

use crate::{
    config::settings::OrganizationSettings,
    db::{CreateProjectArgs, EffortRecord, ResourceRef, week_bounds},
    entities::{ProjectStatus, RagStatus, RateSource, TrackingBy, project, resource, weekly_effort},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Organization settings used across analytics tests.
pub fn test_settings() -> OrganizationSettings {
    OrganizationSettings {
        default_hourly_rate: 65.0,
        currency: "USD".to_string(),
    }
}

/// Builds project-creation arguments with sensible defaults.
///
/// # Defaults
/// * no customer, no manager
/// * schedule: 2025-01-06 to 2025-06-29
/// * `estimated_effort`: 200.0 hours
/// * `estimated_budget`: 10000.0
/// * `hourly_rate`: None, with the `Project` rate source, so tests that
///   set a rate get it applied and tests that don't fall back to the
///   organization default
/// * tracked by end date
pub fn sample_project_args(name: &str) -> CreateProjectArgs {
    CreateProjectArgs {
        name: name.to_string(),
        customer_id: None,
        manager_id: None,
        start_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 6, 29).unwrap(),
        estimated_effort: 200.0,
        estimated_budget: 10_000.0,
        hourly_rate: None,
        hourly_rate_source: RateSource::Project,
        tracking_by: TrackingBy::EndDate,
    }
}

/// Builds a synthetic project model without touching a database, for
/// testing the pure computation functions. Mirrors the defaults of
/// [`sample_project_args`]; tests override the fields they care about.
pub fn make_project(id: i64, name: &str) -> project::Model {
    project::Model {
        id,
        name: name.to_string(),
        customer_id: None,
        manager_id: None,
        start_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 6, 29).unwrap(),
        estimated_effort: 200.0,
        estimated_budget: 10_000.0,
        hourly_rate: None,
        hourly_rate_source: RateSource::Project,
        project_status: ProjectStatus::Active,
        overall_status: RagStatus::Green,
        scope_status: RagStatus::Green,
        quality_status: RagStatus::Green,
        budget_status: RagStatus::Green,
        tracking_by: TrackingBy::EndDate,
        is_deleted: false,
    }
}

/// Builds a synthetic active resource model.
pub fn make_resource(id: i64, name: &str, per_hour_rate: f64) -> resource::Model {
    resource::Model {
        id,
        name: name.to_string(),
        per_hour_rate,
        currency: "USD".to_string(),
        is_active: true,
        is_deleted: false,
    }
}

/// Builds an effort record whose resource reference resolved. The week is
/// normalized to its Monday..Sunday bounds like the write path does.
pub fn make_effort_record(
    project_id: i64,
    resource: &resource::Model,
    week: NaiveDate,
    hours: f64,
) -> EffortRecord {
    let (week_start, week_end) = week_bounds(week);
    EffortRecord {
        effort: weekly_effort::Model {
            id: 0,
            project_id,
            resource_id: resource.id,
            hours,
            week_start_date: week_start,
            week_end_date: week_end,
        },
        resource: ResourceRef::Resolved(resource.clone()),
    }
}

/// Builds an effort record whose resource reference dangles, as happens
/// after a resource is soft-deleted.
pub fn make_orphaned_record(
    project_id: i64,
    resource_id: i64,
    week: NaiveDate,
    hours: f64,
) -> EffortRecord {
    let (week_start, week_end) = week_bounds(week);
    EffortRecord {
        effort: weekly_effort::Model {
            id: 0,
            project_id,
            resource_id,
            hours,
            week_start_date: week_start,
            week_end_date: week_end,
        },
        resource: ResourceRef::Orphaned(resource_id),
    }
}
