//! Customer persistence - create, list and soft-delete customers.
//!
//! Customers are plain lookup rows; the interesting read here is
//! [`customer_names`], which the dashboard aggregators use to resolve the
//! per-customer breakdown without joining inside the analytics engine.

use crate::{
    entities::{Customer, customer},
    errors::{Error, Result},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Creates a new customer, trimming whitespace and rejecting empty names.
#[instrument(skip(db))]
pub async fn create_customer(db: &DatabaseConnection, name: String) -> Result<customer::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Customer name cannot be empty".to_string(),
        });
    }

    let model = customer::ActiveModel {
        name: Set(name.trim().to_string()),
        is_deleted: Set(false),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    info!("Created customer '{}' (id {})", result.name, result.id);
    Ok(result)
}

/// Retrieves all active (non-deleted) customers ordered alphabetically by name.
pub async fn list_customers(db: &DatabaseConnection) -> Result<Vec<customer::Model>> {
    Customer::find()
        .filter(customer::Column::IsDeleted.eq(false))
        .order_by_asc(customer::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns an id → name map of active customers.
///
/// Used by the dashboard aggregators to label customer breakdowns; a project
/// whose customer id is missing from this map is shown as unassigned rather
/// than failing the view.
pub async fn customer_names(db: &DatabaseConnection) -> Result<HashMap<i64, String>> {
    let customers = list_customers(db).await?;
    Ok(customers.into_iter().map(|c| (c.id, c.name)).collect())
}

/// Soft-deletes a customer. Projects referencing it keep their (now dangling)
/// reference.
#[instrument(skip(db))]
pub async fn soft_delete_customer(db: &DatabaseConnection, customer_id: i64) -> Result<()> {
    let existing = Customer::find_by_id(customer_id)
        .one(db)
        .await?
        .ok_or(Error::CustomerNotFound { id: customer_id })?;

    let mut active: customer::ActiveModel = existing.into();
    active.is_deleted = Set(true);
    active.update(db).await?;

    info!("Soft-deleted customer {customer_id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_create_customer_trims_name() -> Result<()> {
        let db = setup_test_db().await?;

        let customer = create_customer(&db, "  Acme Corp  ".to_string()).await?;
        assert_eq!(customer.name, "Acme Corp");
        assert!(!customer.is_deleted);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_customer_rejects_empty_name() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_customer(&db, "   ".to_string()).await;
        assert!(matches!(result, Err(Error::Config { message: _ })));

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_names_excludes_deleted() -> Result<()> {
        let db = setup_test_db().await?;

        let kept = create_customer(&db, "Kept".to_string()).await?;
        let dropped = create_customer(&db, "Dropped".to_string()).await?;
        soft_delete_customer(&db, dropped.id).await?;

        let names = customer_names(&db).await?;
        assert_eq!(names.len(), 1);
        assert_eq!(names.get(&kept.id), Some(&"Kept".to_string()));
        assert!(!names.contains_key(&dropped.id));

        Ok(())
    }

    #[tokio::test]
    async fn test_soft_delete_missing_customer() -> Result<()> {
        let db = setup_test_db().await?;

        let result = soft_delete_customer(&db, 999).await;
        assert!(matches!(result, Err(Error::CustomerNotFound { id: 999 })));

        Ok(())
    }
}
