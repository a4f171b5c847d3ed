//! # Inventory Repository
//!
//! Products and services a store sells.
//!
//! Stock changes in exactly two ways: a sale (see [`SaleRepository`]) and
//! an explicit adjustment here. Both hold the `stock:{store}:{item}` key
//! lock and both keep the profit/loss mirror of remaining stock in step.
//!
//! [`SaleRepository`]: super::sale::SaleRepository

use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info};

use super::profit_loss::ProfitLossRepository;
use super::{count_dependents, ensure_store, missing_parent, new_id, restricted};
use crate::error::{DbError, DbResult};
use crate::locks::KeyedLocks;
use storekeep_core::{Inventory, InventoryKind, InventoryUpdate, NewInventory, ValidationError};

/// Repository for inventory database operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
    locks: Arc<KeyedLocks>,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool, locks: Arc<KeyedLocks>) -> Self {
        InventoryRepository { pool, locks }
    }

    /// Creates an inventory item.
    ///
    /// ## Errors
    /// - `Validation` for a blank name, negative price or stock, or a type
    ///   other than `product` / `service`
    /// - `NotFound` if the store doesn't exist
    /// - `UniqueViolation` if the name is taken in the store
    pub async fn create(&self, store_id: &str, payload: NewInventory) -> DbResult<Inventory> {
        let draft = payload.validate()?;
        let now = Utc::now();

        let item = Inventory {
            id: new_id(),
            store_id: store_id.to_string(),
            name: draft.name,
            kind: draft.kind,
            cost_price_cents: draft.cost_price_cents,
            selling_price_cents: draft.selling_price_cents,
            quantity: draft.quantity,
            created_at: now,
            updated_at: now,
        };

        debug!(store_id = %store_id, name = %item.name, kind = %item.kind, "Creating inventory item");

        sqlx::query(
            r#"
            INSERT INTO inventory (
                id, store_id, name, kind, cost_price_cents, selling_price_cents,
                quantity, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&item.id)
        .bind(&item.store_id)
        .bind(&item.name)
        .bind(item.kind)
        .bind(item.cost_price_cents)
        .bind(item.selling_price_cents)
        .bind(item.quantity)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| missing_parent(e.into(), "Store", store_id).with_duplicate_value(item.name.clone()))?;

        info!(id = %item.id, name = %item.name, "Inventory item created");
        Ok(item)
    }

    /// Gets an item of a store.
    pub async fn get(&self, store_id: &str, id: &str) -> DbResult<Inventory> {
        sqlx::query_as::<_, Inventory>("SELECT * FROM inventory WHERE id = ?1 AND store_id = ?2")
            .bind(id)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Inventory", id))
    }

    /// Lists a store's items by name.
    pub async fn list(&self, store_id: &str) -> DbResult<Vec<Inventory>> {
        ensure_store(&self.pool, store_id).await?;
        let items = sqlx::query_as::<_, Inventory>(
            "SELECT * FROM inventory WHERE store_id = ?1 ORDER BY name",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Changes name, type or prices. Stock is not touched here; turning a
    /// product into a service drops its stock to zero, and the profit/loss
    /// row follows in the same transaction.
    ///
    /// Price changes apply to future sales only; past orders keep their
    /// snapshot.
    pub async fn update(&self, store_id: &str, id: &str, update: InventoryUpdate) -> DbResult<Inventory> {
        let _guard = self.locks.acquire(KeyedLocks::stock_key(store_id, id)).await?;

        let mut item = self.get(store_id, id).await?;
        update.apply(&mut item)?;
        if !item.kind.tracks_stock() {
            item.quantity = 0;
        }
        item.updated_at = Utc::now();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE inventory SET
                name = ?3, kind = ?4, cost_price_cents = ?5, selling_price_cents = ?6,
                quantity = ?7, updated_at = ?8
            WHERE id = ?1 AND store_id = ?2
            "#,
        )
        .bind(id)
        .bind(store_id)
        .bind(&item.name)
        .bind(item.kind)
        .bind(item.cost_price_cents)
        .bind(item.selling_price_cents)
        .bind(item.quantity)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(item.name.clone()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Inventory", id));
        }

        ProfitLossRepository::sync_remaining_in(&mut tx, store_id, id).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(item)
    }

    /// Adds `delta` units to a product's stock (negative to remove).
    ///
    /// Used for restocking and out-of-band corrections. The profit/loss row
    /// (if the item was ever sold) gets the new remaining quantity in the
    /// same transaction.
    ///
    /// ## Errors
    /// - `NotFound` if the item isn't in the store
    /// - `Validation` for services, which carry no stock
    /// - `InsufficientStock` if the result would be negative
    /// - `Validation` if the result would not fit in an `i64`
    pub async fn adjust_stock(&self, store_id: &str, id: &str, delta: i64) -> DbResult<Inventory> {
        let _guard = self.locks.acquire(KeyedLocks::stock_key(store_id, id)).await?;
        let mut tx = self.pool.begin().await?;

        let adjusted = sqlx::query_as::<_, Inventory>(
            r#"
            UPDATE inventory SET quantity = quantity + ?3, updated_at = ?4
            WHERE id = ?1 AND store_id = ?2 AND kind = 'product'
              AND quantity + ?3 >= 0
              AND (?3 <= 0 OR quantity <= ?5 - ?3)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(store_id)
        .bind(delta)
        .bind(Utc::now())
        .bind(i64::MAX)
        .fetch_optional(&mut *tx)
        .await?;

        let item = match adjusted {
            Some(item) => item,
            None => {
                let current = sqlx::query_as::<_, Inventory>(
                    "SELECT * FROM inventory WHERE id = ?1 AND store_id = ?2",
                )
                .bind(id)
                .bind(store_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("Inventory", id))?;

                return Err(match current.kind {
                    InventoryKind::Product if current.quantity.checked_add(delta).is_none() => {
                        DbError::Validation(ValidationError::OutOfRange {
                            field: "delta".to_string(),
                            min: -current.quantity,
                            max: i64::MAX - current.quantity,
                        })
                    }
                    InventoryKind::Service => DbError::Validation(ValidationError::InvalidFormat {
                        field: "quantity".to_string(),
                        reason: "services do not track stock".to_string(),
                    }),
                    InventoryKind::Product => DbError::InsufficientStock {
                        item: current.name,
                        available: current.quantity,
                        requested: delta.saturating_neg(),
                    },
                });
            }
        };

        ProfitLossRepository::sync_remaining_in(&mut tx, store_id, id).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %id, delta, quantity = item.quantity, "Stock adjusted");
        Ok(item)
    }

    /// Deletes an item that has never been sold.
    ///
    /// ## Errors
    /// - `NotFound` if the item isn't in the store
    /// - `ForeignKeyViolation` (Conflict) once sales reference it
    pub async fn delete(&self, store_id: &str, id: &str) -> DbResult<()> {
        let _guard = self.locks.acquire(KeyedLocks::stock_key(store_id, id)).await?;

        self.get(store_id, id).await?;

        if count_dependents(&self.pool, "orders", "inventory_id", id).await? > 0 {
            return Err(restricted("Inventory", id, "sales"));
        }

        let result = sqlx::query("DELETE FROM inventory WHERE id = ?1 AND store_id = ?2")
            .bind(id)
            .bind(store_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Inventory", id));
        }

        info!(id = %id, "Inventory item deleted");
        Ok(())
    }
}
