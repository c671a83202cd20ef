//! Resource persistence - the people who log hours.
//!
//! Provides validated creation, activity toggling, soft deletion, and the
//! [`resource_map`] read the effort layer uses to resolve references once at
//! the data-access boundary. Also seeds the initial roster from
//! portfolio.toml on startup, re-enabling soft-deleted entries instead of
//! duplicating them.

use crate::{
    config::settings::ResourceSeed,
    entities::{Resource, resource},
    errors::{Error, Result},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Creates a new resource with the given billing rate.
///
/// Validates that the name is not empty and that the rate is a finite,
/// non-negative number. New resources start active.
#[instrument(skip(db))]
pub async fn create_resource(
    db: &DatabaseConnection,
    name: String,
    per_hour_rate: f64,
    currency: String,
) -> Result<resource::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Resource name cannot be empty".to_string(),
        });
    }

    if !per_hour_rate.is_finite() || per_hour_rate < 0.0 {
        return Err(Error::InvalidAmount {
            amount: per_hour_rate,
        });
    }

    let model = resource::ActiveModel {
        name: Set(name.trim().to_string()),
        per_hour_rate: Set(per_hour_rate),
        currency: Set(currency),
        is_active: Set(true),
        is_deleted: Set(false),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    info!("Created resource '{}' (id {})", result.name, result.id);
    Ok(result)
}

/// Finds a resource by its unique ID, including soft-deleted rows.
///
/// Callers that care about deletion state check `is_deleted` themselves;
/// reference resolution goes through [`resource_map`] instead, which filters.
pub async fn get_resource_by_id(
    db: &DatabaseConnection,
    resource_id: i64,
) -> Result<Option<resource::Model>> {
    Resource::find_by_id(resource_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all non-deleted resources ordered alphabetically by name.
pub async fn list_resources(db: &DatabaseConnection) -> Result<Vec<resource::Model>> {
    Resource::find()
        .filter(resource::Column::IsDeleted.eq(false))
        .order_by_asc(resource::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns an id → model map of non-deleted resources.
///
/// This is the single place a weekly-effort reference is judged resolvable:
/// a resource absent from this map (missing row or soft-deleted) makes the
/// referencing effort row orphaned.
pub async fn resource_map(db: &DatabaseConnection) -> Result<HashMap<i64, resource::Model>> {
    let resources = Resource::find()
        .filter(resource::Column::IsDeleted.eq(false))
        .all(db)
        .await?;

    Ok(resources.into_iter().map(|r| (r.id, r)).collect())
}

/// Marks a resource active or inactive (on leave, left the organization).
#[instrument(skip(db))]
pub async fn set_resource_active(
    db: &DatabaseConnection,
    resource_id: i64,
    is_active: bool,
) -> Result<resource::Model> {
    let existing = Resource::find_by_id(resource_id)
        .one(db)
        .await?
        .ok_or(Error::ResourceNotFound { id: resource_id })?;

    let mut active: resource::ActiveModel = existing.into();
    active.is_active = Set(is_active);
    active.update(db).await.map_err(Into::into)
}

/// Soft-deletes a resource. Weekly effort rows referencing it persist and
/// become orphaned for the analytics engine.
#[instrument(skip(db))]
pub async fn soft_delete_resource(db: &DatabaseConnection, resource_id: i64) -> Result<()> {
    let existing = Resource::find_by_id(resource_id)
        .one(db)
        .await?
        .ok_or(Error::ResourceNotFound { id: resource_id })?;

    let mut active: resource::ActiveModel = existing.into();
    active.is_deleted = Set(true);
    active.update(db).await?;

    info!("Soft-deleted resource {resource_id}");
    Ok(())
}

/// Seeds the initial resource roster from the settings file.
///
/// For each configured entry: an active resource with the same name is left
/// untouched, a soft-deleted one is re-enabled with the configured rate, and
/// a missing one is inserted. Returns the number of rows inserted or
/// re-enabled, so repeated startups are visible as zero.
#[instrument(skip(db, seeds))]
pub async fn seed_initial_resources(
    db: &DatabaseConnection,
    seeds: &[ResourceSeed],
    currency: &str,
) -> Result<usize> {
    info!("Seeding resource roster: {} configured entries", seeds.len());
    let mut seeded = 0;

    for seed in seeds {
        let existing = Resource::find()
            .filter(resource::Column::Name.eq(seed.name.as_str()))
            .one(db)
            .await?;

        match existing {
            Some(resource) if !resource.is_deleted => {
                debug!("Resource '{}' already active, skipping", seed.name);
            }
            Some(resource) => {
                info!("Re-enabling soft-deleted resource '{}'", seed.name);
                let mut active: resource::ActiveModel = resource.into();
                active.per_hour_rate = Set(seed.per_hour_rate);
                active.currency = Set(currency.to_string());
                active.is_active = Set(true);
                active.is_deleted = Set(false);
                active.update(db).await?;
                seeded += 1;
            }
            None => {
                info!("Inserting new resource '{}'", seed.name);
                create_resource(
                    db,
                    seed.name.clone(),
                    seed.per_hour_rate,
                    currency.to_string(),
                )
                .await?;
                seeded += 1;
            }
        }
    }

    Ok(seeded)
}
