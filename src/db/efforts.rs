//! Weekly effort persistence and aggregation.
//!
//! Effort is logged per project, resource, and calendar week. Any date
//! inside a week is normalized to the Monday..Sunday bounds before writing,
//! and logging the same project/resource/week again replaces the stored
//! hours rather than adding a second row.
//!
//! Reads resolve each row's resource reference exactly once, producing a
//! [`ResourceRef`] so downstream consumers never re-query or guess whether
//! a reference is dangling.

use crate::{
    db::{
        projects::get_project,
        resources::{get_resource_by_id, resource_map},
    },
    entities::{WeeklyEffort, resource, weekly_effort},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Weekday};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Hard ceiling for hours logged against a single week. There are only 168
/// hours in a week.
pub const MAX_WEEKLY_HOURS: f64 = 168.0;

/// Normalizes any date to its Monday-start, Sunday-end week bounds.
#[must_use]
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let week = date.week(Weekday::Mon);
    (week.first_day(), week.last_day())
}

/// The outcome of resolving an effort row's resource reference.
///
/// Soft-deleting a resource leaves its logged history in place, so a row
/// can point at a resource that no longer exists for reporting purposes.
/// That judgement is made once, here, and carried alongside the row.
#[derive(Debug, Clone)]
pub enum ResourceRef {
    /// The referenced resource exists and is not soft-deleted.
    Resolved(resource::Model),
    /// The referenced resource is missing or soft-deleted; the ID is kept
    /// for logging.
    Orphaned(i64),
}

impl ResourceRef {
    /// The referenced resource ID, whether or not it resolved.
    #[must_use]
    pub const fn id(&self) -> i64 {
        match self {
            Self::Resolved(resource) => resource.id,
            Self::Orphaned(id) => *id,
        }
    }

    /// The resolved model, if the reference was not dangling.
    #[must_use]
    pub const fn resolved(&self) -> Option<&resource::Model> {
        match self {
            Self::Resolved(resource) => Some(resource),
            Self::Orphaned(_) => None,
        }
    }
}

/// An effort row paired with its resolved resource reference.
#[derive(Debug, Clone)]
pub struct EffortRecord {
    pub effort: weekly_effort::Model,
    pub resource: ResourceRef,
}

/// Logs hours for a project, resource, and the week containing `date`.
///
/// Hours must be finite and between 0 and [`MAX_WEEKLY_HOURS`] inclusive.
/// The project and resource must both exist and not be soft-deleted. If a
/// row already exists for the normalized week, its hours are replaced.
#[instrument(skip(db))]
pub async fn log_weekly_effort(
    db: &DatabaseConnection,
    project_id: i64,
    resource_id: i64,
    date: NaiveDate,
    hours: f64,
) -> Result<weekly_effort::Model> {
    if !hours.is_finite() || !(0.0..=MAX_WEEKLY_HOURS).contains(&hours) {
        return Err(Error::InvalidHours { hours });
    }

    get_project(db, project_id).await?;

    let resource = get_resource_by_id(db, resource_id).await?;
    if !resource.is_some_and(|r| !r.is_deleted) {
        return Err(Error::ResourceNotFound { id: resource_id });
    }

    let (week_start, week_end) = week_bounds(date);

    let txn = db.begin().await?;

    let existing = WeeklyEffort::find()
        .filter(weekly_effort::Column::ProjectId.eq(project_id))
        .filter(weekly_effort::Column::ResourceId.eq(resource_id))
        .filter(weekly_effort::Column::WeekStartDate.eq(week_start))
        .one(&txn)
        .await?;

    let model = match existing {
        Some(row) => {
            debug!(
                "Replacing {} logged hours for week of {week_start}",
                row.hours
            );
            let mut active: weekly_effort::ActiveModel = row.into();
            active.hours = Set(hours);
            active.update(&txn).await?
        }
        None => {
            let active = weekly_effort::ActiveModel {
                project_id: Set(project_id),
                resource_id: Set(resource_id),
                hours: Set(hours),
                week_start_date: Set(week_start),
                week_end_date: Set(week_end),
                ..Default::default()
            };
            active.insert(&txn).await?
        }
    };

    txn.commit().await?;
    info!("Logged {hours}h for resource {resource_id} on project {project_id}, week of {week_start}");
    Ok(model)
}

/// Retrieves one project's full effort history with resolved resource
/// references, ordered by week.
pub async fn list_efforts_for_project(
    db: &DatabaseConnection,
    project_id: i64,
) -> Result<Vec<EffortRecord>> {
    list_efforts_for_projects(db, &[project_id], None).await
}

/// Retrieves effort rows for a set of projects with resolved resource
/// references, ordered by week, optionally limited to weeks starting on
/// or after `since`.
pub async fn list_efforts_for_projects(
    db: &DatabaseConnection,
    project_ids: &[i64],
    since: Option<NaiveDate>,
) -> Result<Vec<EffortRecord>> {
    if project_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = WeeklyEffort::find()
        .filter(weekly_effort::Column::ProjectId.is_in(project_ids.iter().copied()))
        .order_by_asc(weekly_effort::Column::WeekStartDate);

    if let Some(cutoff) = since {
        query = query.filter(weekly_effort::Column::WeekStartDate.gte(cutoff));
    }

    let efforts = query.all(db).await?;

    let resources = resource_map(db).await?;

    Ok(efforts
        .into_iter()
        .map(|effort| {
            let resource = match resources.get(&effort.resource_id) {
                Some(model) => ResourceRef::Resolved(model.clone()),
                None => ResourceRef::Orphaned(effort.resource_id),
            };
            EffortRecord { effort, resource }
        })
        .collect())
}

/// Sums logged hours per week across the given projects, SQL-side,
/// optionally limited to weeks starting on or after `since`.
///
/// Weeks with no rows are absent from the result. Rows with negative hours
/// (possible in imported data) or a dangling resource reference are
/// excluded, matching the row-level checks the in-memory paths apply.
pub async fn sum_hours_by_week(
    db: &DatabaseConnection,
    project_ids: &[i64],
    since: Option<NaiveDate>,
) -> Result<Vec<(NaiveDate, f64)>> {
    if project_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = WeeklyEffort::find()
        .select_only()
        .column(weekly_effort::Column::WeekStartDate)
        .column_as(weekly_effort::Column::Hours.sum(), "total_hours")
        .join(JoinType::InnerJoin, weekly_effort::Relation::Resource.def())
        .filter(resource::Column::IsDeleted.eq(false))
        .filter(weekly_effort::Column::ProjectId.is_in(project_ids.iter().copied()))
        .filter(weekly_effort::Column::Hours.gte(0.0))
        .group_by(weekly_effort::Column::WeekStartDate)
        .order_by_asc(weekly_effort::Column::WeekStartDate);

    if let Some(cutoff) = since {
        query = query.filter(weekly_effort::Column::WeekStartDate.gte(cutoff));
    }

    query.into_tuple().all(db).await.map_err(Into::into)
}

/// Sums logged hours for a single project and week, SQL-side, with the
/// same exclusions as [`sum_hours_by_week`]. Returns 0.0 when nothing was
/// logged.
pub async fn sum_hours_for_week(
    db: &DatabaseConnection,
    project_id: i64,
    week_start: NaiveDate,
) -> Result<f64> {
    let total: Option<Option<f64>> = WeeklyEffort::find()
        .select_only()
        .column_as(weekly_effort::Column::Hours.sum(), "total_hours")
        .join(JoinType::InnerJoin, weekly_effort::Relation::Resource.def())
        .filter(resource::Column::IsDeleted.eq(false))
        .filter(weekly_effort::Column::ProjectId.eq(project_id))
        .filter(weekly_effort::Column::WeekStartDate.eq(week_start))
        .filter(weekly_effort::Column::Hours.gte(0.0))
        .into_tuple()
        .one(db)
        .await?;

    Ok(total.flatten().unwrap_or(0.0))
}

/// Finds each project's most recent effort week end, for deriving when
/// work on a project actually stopped. Negative-hours rows do not count
/// as activity, the same exclusion the hour sums apply.
pub async fn last_effort_week_end_by_project(
    db: &DatabaseConnection,
    project_ids: &[i64],
) -> Result<HashMap<i64, NaiveDate>> {
    if project_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i64, NaiveDate)> = WeeklyEffort::find()
        .select_only()
        .column(weekly_effort::Column::ProjectId)
        .column_as(weekly_effort::Column::WeekEndDate.max(), "last_week_end")
        .filter(weekly_effort::Column::ProjectId.is_in(project_ids.iter().copied()))
        .filter(weekly_effort::Column::Hours.gte(0.0))
        .group_by(weekly_effort::Column::ProjectId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows.into_iter().collect())
}

/// Sums logged hours per project per week across the given projects,
/// SQL-side, with the same exclusions and optional window as
/// [`sum_hours_by_week`].
pub async fn sum_hours_by_project_and_week(
    db: &DatabaseConnection,
    project_ids: &[i64],
    since: Option<NaiveDate>,
) -> Result<Vec<(i64, NaiveDate, f64)>> {
    if project_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = WeeklyEffort::find()
        .select_only()
        .column(weekly_effort::Column::ProjectId)
        .column(weekly_effort::Column::WeekStartDate)
        .column_as(weekly_effort::Column::Hours.sum(), "total_hours")
        .join(JoinType::InnerJoin, weekly_effort::Relation::Resource.def())
        .filter(resource::Column::IsDeleted.eq(false))
        .filter(weekly_effort::Column::ProjectId.is_in(project_ids.iter().copied()))
        .filter(weekly_effort::Column::Hours.gte(0.0))
        .group_by(weekly_effort::Column::ProjectId)
        .group_by(weekly_effort::Column::WeekStartDate)
        .order_by_asc(weekly_effort::Column::WeekStartDate);

    if let Some(cutoff) = since {
        query = query.filter(weekly_effort::Column::WeekStartDate.gte(cutoff));
    }

    query.into_tuple().all(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        db::{create_project, create_resource, soft_delete_resource},
        test_utils::{sample_project_args, setup_test_db},
    };

    #[test]
    fn test_week_bounds_normalizes_to_monday() {
        // 2025-01-15 is a Wednesday.
        let wednesday = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let (start, end) = week_bounds(wednesday);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 1, 13).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 19).unwrap());

        // A Monday maps to itself.
        let (start, _) = week_bounds(start);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 1, 13).unwrap());
    }

    #[tokio::test]
    async fn test_log_weekly_effort_rejects_invalid_hours() -> Result<()> {
        let db = setup_test_db().await?;
        let project = create_project(&db, sample_project_args("Logged")).await?;
        let resource = create_resource(&db, "Dev".to_string(), 90.0, "USD".to_string()).await?;
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        for bad in [-1.0, 168.5, f64::NAN, f64::INFINITY] {
            let result = log_weekly_effort(&db, project.id, resource.id, date, bad).await;
            assert!(matches!(result, Err(Error::InvalidHours { hours: _ })));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_log_weekly_effort_upserts_within_week() -> Result<()> {
        let db = setup_test_db().await?;
        let project = create_project(&db, sample_project_args("Upserted")).await?;
        let resource = create_resource(&db, "Dev".to_string(), 90.0, "USD".to_string()).await?;

        let wednesday = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let friday = NaiveDate::from_ymd_opt(2025, 1, 17).unwrap();

        let first = log_weekly_effort(&db, project.id, resource.id, wednesday, 20.0).await?;
        // Same week, different day: replaces rather than appending.
        let second = log_weekly_effort(&db, project.id, resource.id, friday, 32.0).await?;
        assert_eq!(first.id, second.id);
        assert_eq!(second.hours, 32.0);
        assert_eq!(
            second.week_start_date,
            NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()
        );

        let records = list_efforts_for_project(&db, project.id).await?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].effort.hours, 32.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_log_weekly_effort_requires_live_references() -> Result<()> {
        let db = setup_test_db().await?;
        let project = create_project(&db, sample_project_args("Referenced")).await?;
        let resource = create_resource(&db, "Gone".to_string(), 90.0, "USD".to_string()).await?;
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        let result = log_weekly_effort(&db, 9999, resource.id, date, 10.0).await;
        assert!(matches!(result, Err(Error::ProjectNotFound { id: 9999 })));

        soft_delete_resource(&db, resource.id).await?;
        let result = log_weekly_effort(&db, project.id, resource.id, date, 10.0).await;
        assert!(matches!(result, Err(Error::ResourceNotFound { id: _ })));

        Ok(())
    }

    #[tokio::test]
    async fn test_soft_deleted_resource_resolves_as_orphaned() -> Result<()> {
        let db = setup_test_db().await?;
        let project = create_project(&db, sample_project_args("Orphans")).await?;
        let kept = create_resource(&db, "Kept".to_string(), 90.0, "USD".to_string()).await?;
        let doomed = create_resource(&db, "Doomed".to_string(), 80.0, "USD".to_string()).await?;
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        log_weekly_effort(&db, project.id, kept.id, date, 10.0).await?;
        log_weekly_effort(&db, project.id, doomed.id, date, 12.0).await?;
        soft_delete_resource(&db, doomed.id).await?;

        let records = list_efforts_for_project(&db, project.id).await?;
        assert_eq!(records.len(), 2);

        let kept_record = records.iter().find(|r| r.resource.id() == kept.id).unwrap();
        assert!(kept_record.resource.resolved().is_some());

        let orphaned = records
            .iter()
            .find(|r| r.resource.id() == doomed.id)
            .unwrap();
        assert!(orphaned.resource.resolved().is_none());
        assert!(matches!(orphaned.resource, ResourceRef::Orphaned(_)));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_efforts_since_window() -> Result<()> {
        let db = setup_test_db().await?;
        let project = create_project(&db, sample_project_args("Windowed")).await?;
        let dev = create_resource(&db, "Dev".to_string(), 90.0, "USD".to_string()).await?;

        let january = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let march = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        log_weekly_effort(&db, project.id, dev.id, january, 10.0).await?;
        log_weekly_effort(&db, project.id, dev.id, march, 25.0).await?;

        let cutoff = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let windowed = list_efforts_for_projects(&db, &[project.id], Some(cutoff)).await?;
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].effort.hours, 25.0);

        let all = list_efforts_for_projects(&db, &[project.id], None).await?;
        assert_eq!(all.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_sum_hours_by_week_groups_resources() -> Result<()> {
        let db = setup_test_db().await?;
        let project = create_project(&db, sample_project_args("Summed")).await?;
        let alice = create_resource(&db, "Alice".to_string(), 90.0, "USD".to_string()).await?;
        let bob = create_resource(&db, "Bob".to_string(), 80.0, "USD".to_string()).await?;

        let week_one = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        let week_three = NaiveDate::from_ymd_opt(2025, 1, 27).unwrap();

        log_weekly_effort(&db, project.id, alice.id, week_one, 20.0).await?;
        log_weekly_effort(&db, project.id, bob.id, week_one, 15.0).await?;
        // Week two has no rows at all; it must be absent, not zero.
        log_weekly_effort(&db, project.id, alice.id, week_three, 8.0).await?;

        let sums = sum_hours_by_week(&db, &[project.id], None).await?;
        assert_eq!(sums, vec![(week_one, 35.0), (week_three, 8.0)]);

        let windowed = sum_hours_by_week(&db, &[project.id], Some(week_three)).await?;
        assert_eq!(windowed, vec![(week_three, 8.0)]);

        let empty = sum_hours_by_week(&db, &[], None).await?;
        assert!(empty.is_empty());

        // Deleting Bob orphans his rows and drops them from the sums.
        soft_delete_resource(&db, bob.id).await?;
        let sums = sum_hours_by_week(&db, &[project.id], None).await?;
        assert_eq!(sums, vec![(week_one, 20.0), (week_three, 8.0)]);

        Ok(())
    }

    #[tokio::test]
    async fn test_last_effort_week_ignores_negative_hours() -> Result<()> {
        let db = setup_test_db().await?;
        let project = create_project(&db, sample_project_args("Wound Down")).await?;
        let dev = create_resource(&db, "Dev".to_string(), 90.0, "USD".to_string()).await?;

        let january = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        log_weekly_effort(&db, project.id, dev.id, january, 30.0).await?;
        let (_, january_end) = week_bounds(january);

        // Imported data can carry negative hours the write path would
        // reject. A later week of them must not move the last-activity
        // marker.
        let (march_start, march_end) =
            week_bounds(NaiveDate::from_ymd_opt(2025, 3, 12).unwrap());
        let bad = weekly_effort::ActiveModel {
            project_id: Set(project.id),
            resource_id: Set(dev.id),
            hours: Set(-8.0),
            week_start_date: Set(march_start),
            week_end_date: Set(march_end),
            ..Default::default()
        };
        bad.insert(&db).await?;

        let last = last_effort_week_end_by_project(&db, &[project.id]).await?;
        assert_eq!(last.get(&project.id), Some(&january_end));

        Ok(())
    }
}
