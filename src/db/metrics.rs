//! Weekly metrics persistence.
//!
//! A metrics row is a manager's weekly snapshot of a project: cumulative
//! scope completed, free-form comments, and a denormalized copy of that
//! week's total logged hours (`rollup_hours`). The copy can go stale when
//! effort is logged after the snapshot, so [`refresh_rollup_hours`] brings
//! rows back in line with the effort table.

use crate::{
    db::{
        efforts::{sum_hours_by_week, sum_hours_for_week, week_bounds},
        projects::get_project,
    },
    entities::{WeeklyMetrics, weekly_metrics},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Records a weekly metrics snapshot for the week containing `date`.
///
/// `scope_completed` is the cumulative percentage of project scope
/// delivered, 0 to 100. The rollup hours are computed from the effort
/// table at write time. Recording the same project and week again replaces
/// the stored snapshot.
#[instrument(skip(db, comments))]
pub async fn record_weekly_metrics(
    db: &DatabaseConnection,
    project_id: i64,
    date: NaiveDate,
    scope_completed: f64,
    comments: Option<String>,
) -> Result<weekly_metrics::Model> {
    if !scope_completed.is_finite() || !(0.0..=100.0).contains(&scope_completed) {
        return Err(Error::InvalidAmount {
            amount: scope_completed,
        });
    }

    get_project(db, project_id).await?;

    let (week_start, week_end) = week_bounds(date);
    let rollup_hours = sum_hours_for_week(db, project_id, week_start).await?;

    let txn = db.begin().await?;

    let existing = WeeklyMetrics::find()
        .filter(weekly_metrics::Column::ProjectId.eq(project_id))
        .filter(weekly_metrics::Column::WeekStartDate.eq(week_start))
        .one(&txn)
        .await?;

    let model = match existing {
        Some(row) => {
            let mut active: weekly_metrics::ActiveModel = row.into();
            active.rollup_hours = Set(rollup_hours);
            active.scope_completed = Set(scope_completed);
            active.comments = Set(comments);
            active.update(&txn).await?
        }
        None => {
            let active = weekly_metrics::ActiveModel {
                project_id: Set(project_id),
                week_start_date: Set(week_start),
                week_end_date: Set(week_end),
                rollup_hours: Set(rollup_hours),
                scope_completed: Set(scope_completed),
                comments: Set(comments),
                ..Default::default()
            };
            active.insert(&txn).await?
        }
    };

    txn.commit().await?;
    info!(
        "Recorded metrics for project {project_id}, week of {week_start}: {scope_completed}% scope, {rollup_hours}h rollup"
    );
    Ok(model)
}

/// Recomputes every stored metrics row's rollup hours for a project from
/// the effort table, updating only rows whose value drifted. Returns the
/// number of rows corrected.
#[instrument(skip(db))]
pub async fn refresh_rollup_hours(db: &DatabaseConnection, project_id: i64) -> Result<usize> {
    let rows = list_metrics_for_project(db, project_id, None).await?;
    if rows.is_empty() {
        return Ok(0);
    }

    let weekly_sums: HashMap<NaiveDate, f64> = sum_hours_by_week(db, &[project_id], None)
        .await?
        .into_iter()
        .collect();

    let txn = db.begin().await?;
    let mut refreshed = 0;

    for row in rows {
        let expected = weekly_sums.get(&row.week_start_date).copied().unwrap_or(0.0);
        if (row.rollup_hours - expected).abs() > f64::EPSILON {
            let mut active: weekly_metrics::ActiveModel = row.into();
            active.rollup_hours = Set(expected);
            active.update(&txn).await?;
            refreshed += 1;
        }
    }

    txn.commit().await?;
    if refreshed > 0 {
        info!("Refreshed rollup hours on {refreshed} metrics rows for project {project_id}");
    }
    Ok(refreshed)
}

/// Retrieves a project's metrics rows ordered by week, optionally limited
/// to weeks starting on or after `since`.
pub async fn list_metrics_for_project(
    db: &DatabaseConnection,
    project_id: i64,
    since: Option<NaiveDate>,
) -> Result<Vec<weekly_metrics::Model>> {
    let mut query = WeeklyMetrics::find()
        .filter(weekly_metrics::Column::ProjectId.eq(project_id))
        .order_by_asc(weekly_metrics::Column::WeekStartDate);

    if let Some(cutoff) = since {
        query = query.filter(weekly_metrics::Column::WeekStartDate.gte(cutoff));
    }

    query.all(db).await.map_err(Into::into)
}

/// Retrieves metrics rows across a set of projects for weeks starting on
/// or after `since`, ordered by week.
pub async fn list_metrics_for_projects_since(
    db: &DatabaseConnection,
    project_ids: &[i64],
    since: NaiveDate,
) -> Result<Vec<weekly_metrics::Model>> {
    if project_ids.is_empty() {
        return Ok(Vec::new());
    }

    WeeklyMetrics::find()
        .filter(weekly_metrics::Column::ProjectId.is_in(project_ids.iter().copied()))
        .filter(weekly_metrics::Column::WeekStartDate.gte(since))
        .order_by_asc(weekly_metrics::Column::WeekStartDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds each project's most recently reported cumulative scope
/// percentage. Projects with no metrics rows are absent from the map.
pub async fn latest_scope_by_project(
    db: &DatabaseConnection,
    project_ids: &[i64],
) -> Result<HashMap<i64, f64>> {
    if project_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = WeeklyMetrics::find()
        .filter(weekly_metrics::Column::ProjectId.is_in(project_ids.iter().copied()))
        .order_by_asc(weekly_metrics::Column::WeekStartDate)
        .all(db)
        .await?;

    // Rows arrive oldest first, so later weeks overwrite earlier ones.
    Ok(rows
        .into_iter()
        .map(|row| (row.project_id, row.scope_completed))
        .collect())
}

/// Finds each project's most recent metrics week end, for deriving when
/// activity on a completed project actually stopped.
pub async fn last_metrics_week_end_by_project(
    db: &DatabaseConnection,
    project_ids: &[i64],
) -> Result<HashMap<i64, NaiveDate>> {
    if project_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i64, NaiveDate)> = WeeklyMetrics::find()
        .select_only()
        .column(weekly_metrics::Column::ProjectId)
        .column_as(weekly_metrics::Column::WeekEndDate.max(), "last_week_end")
        .filter(weekly_metrics::Column::ProjectId.is_in(project_ids.iter().copied()))
        .group_by(weekly_metrics::Column::ProjectId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows.into_iter().collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        db::{create_project, create_resource, log_weekly_effort},
        test_utils::{sample_project_args, setup_test_db},
    };

    #[tokio::test]
    async fn test_record_weekly_metrics_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let project = create_project(&db, sample_project_args("Measured")).await?;
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        for bad in [-5.0, 112.0, f64::NAN] {
            let result = record_weekly_metrics(&db, project.id, date, bad, None).await;
            assert!(matches!(result, Err(Error::InvalidAmount { amount: _ })));
        }

        let result = record_weekly_metrics(&db, 9999, date, 50.0, None).await;
        assert!(matches!(result, Err(Error::ProjectNotFound { id: 9999 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_computes_rollup_and_upserts() -> Result<()> {
        let db = setup_test_db().await?;
        let project = create_project(&db, sample_project_args("Rolled")).await?;
        let dev = create_resource(&db, "Dev".to_string(), 90.0, "USD".to_string()).await?;
        let qa = create_resource(&db, "QA".to_string(), 75.0, "USD".to_string()).await?;
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        log_weekly_effort(&db, project.id, dev.id, date, 30.0).await?;
        log_weekly_effort(&db, project.id, qa.id, date, 10.0).await?;

        let first = record_weekly_metrics(&db, project.id, date, 25.0, None).await?;
        assert_eq!(first.rollup_hours, 40.0);
        assert_eq!(first.scope_completed, 25.0);

        // Same week again: replaces the snapshot in place.
        let note = Some("Scope re-assessed after demo".to_string());
        let second = record_weekly_metrics(&db, project.id, date, 30.0, note.clone()).await?;
        assert_eq!(second.id, first.id);
        assert_eq!(second.scope_completed, 30.0);
        assert_eq!(second.comments, note);

        let all = list_metrics_for_project(&db, project.id, None).await?;
        assert_eq!(all.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_rollup_hours_corrects_stale_rows() -> Result<()> {
        let db = setup_test_db().await?;
        let project = create_project(&db, sample_project_args("Stale")).await?;
        let dev = create_resource(&db, "Dev".to_string(), 90.0, "USD".to_string()).await?;
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        log_weekly_effort(&db, project.id, dev.id, date, 20.0).await?;
        record_weekly_metrics(&db, project.id, date, 40.0, None).await?;

        // Effort logged after the snapshot leaves the rollup stale.
        log_weekly_effort(&db, project.id, dev.id, date, 35.0).await?;

        let refreshed = refresh_rollup_hours(&db, project.id).await?;
        assert_eq!(refreshed, 1);

        let rows = list_metrics_for_project(&db, project.id, None).await?;
        assert_eq!(rows[0].rollup_hours, 35.0);

        // Already in line: nothing to correct.
        assert_eq!(refresh_rollup_hours(&db, project.id).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_metrics_since_window() -> Result<()> {
        let db = setup_test_db().await?;
        let project = create_project(&db, sample_project_args("Windowed")).await?;

        let january = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let march = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        record_weekly_metrics(&db, project.id, january, 20.0, None).await?;
        record_weekly_metrics(&db, project.id, march, 60.0, None).await?;

        let cutoff = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let windowed = list_metrics_for_project(&db, project.id, Some(cutoff)).await?;
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].scope_completed, 60.0);

        let both = list_metrics_for_projects_since(
            &db,
            &[project.id],
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
        .await?;
        assert_eq!(both.len(), 2);

        let last = last_metrics_week_end_by_project(&db, &[project.id]).await?;
        assert_eq!(
            last.get(&project.id),
            Some(&NaiveDate::from_ymd_opt(2025, 3, 16).unwrap())
        );

        Ok(())
    }
}
