//! # Store Repository
//!
//! Stores belong to a business. Every read and write is keyed by
//! `(business_id, id)`, so a store of another business is reported as
//! missing.
//!
//! ## Creation
//! ```text
//! BEGIN
//!   INSERT stores        ← FK on business_id: unknown business → NotFound
//!   INSERT store_counters (next_customer_number = 1)
//! COMMIT
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::counter::CounterRepository;
use super::{count_dependents, missing_parent, new_id, restricted};
use crate::error::{DbError, DbResult};
use storekeep_core::{NewStore, Store, StoreUpdate};

/// Tables whose rows keep a store from being deleted.
const STORE_DEPENDENTS: [(&str, &str); 4] = [
    ("customers", "customers"),
    ("staff", "staff"),
    ("inventory", "inventory items"),
    ("orders", "sales"),
];

/// Repository for store database operations.
#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StoreRepository { pool }
    }

    /// Creates a store together with its customer counter.
    ///
    /// ## Errors
    /// - `Validation` for a blank name or malformed code
    /// - `NotFound` if the business doesn't exist
    /// - `UniqueViolation` if the name or code is taken within the business
    pub async fn create(&self, business_id: &str, payload: NewStore) -> DbResult<Store> {
        let payload = payload.validate()?;
        let now = Utc::now();

        let store = Store {
            id: new_id(),
            business_id: business_id.to_string(),
            name: payload.name,
            code: payload.code,
            is_active: payload.is_active,
            created_at: now,
            updated_at: now,
        };

        debug!(business_id = %business_id, code = %store.code, "Creating store");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO stores (id, business_id, name, code, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&store.id)
        .bind(&store.business_id)
        .bind(&store.name)
        .bind(&store.code)
        .bind(store.is_active)
        .bind(store.created_at)
        .bind(store.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| duplicate_store_field(missing_parent(e.into(), "Business", business_id), &store))?;

        CounterRepository::init_in(&mut tx, &store.id).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %store.id, code = %store.code, "Store created");
        Ok(store)
    }

    /// Gets a store of a business.
    pub async fn get(&self, business_id: &str, id: &str) -> DbResult<Store> {
        sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = ?1 AND business_id = ?2")
            .bind(id)
            .bind(business_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Store", id))
    }

    /// Gets a store by ID alone, for store-scoped routes.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Store> {
        sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Store", id))
    }

    /// Lists the stores of a business by name.
    pub async fn list(&self, business_id: &str) -> DbResult<Vec<Store>> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM businesses WHERE id = ?1")
            .bind(business_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Business", business_id));
        }

        let stores = sqlx::query_as::<_, Store>(
            "SELECT * FROM stores WHERE business_id = ?1 ORDER BY name, id",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(stores)
    }

    /// Renames a store or changes its code.
    pub async fn update(&self, business_id: &str, id: &str, update: StoreUpdate) -> DbResult<Store> {
        let mut store = self.get(business_id, id).await?;
        update.apply(&mut store)?;
        store.updated_at = Utc::now();

        debug!(id = %id, "Updating store");

        let result = sqlx::query(
            r#"
            UPDATE stores SET name = ?3, code = ?4, updated_at = ?5
            WHERE id = ?1 AND business_id = ?2
            "#,
        )
        .bind(id)
        .bind(business_id)
        .bind(&store.name)
        .bind(&store.code)
        .bind(store.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_store_field(e.into(), &store))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Store", id));
        }

        Ok(store)
    }

    /// Opens or closes a store. Inactive stores keep all their data.
    pub async fn set_active(&self, business_id: &str, id: &str, active: bool) -> DbResult<Store> {
        let store = sqlx::query_as::<_, Store>(
            r#"
            UPDATE stores SET is_active = ?3, updated_at = ?4
            WHERE id = ?1 AND business_id = ?2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(business_id)
        .bind(active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Store", id))?;

        info!(id = %id, active, "Store activity changed");
        Ok(store)
    }

    /// Deletes a store that owns nothing but its counter.
    ///
    /// ## Errors
    /// - `NotFound` if the store isn't part of the business
    /// - `ForeignKeyViolation` (Conflict) while customers, staff, inventory
    ///   or sales remain
    pub async fn delete(&self, business_id: &str, id: &str) -> DbResult<()> {
        self.get(business_id, id).await?;

        for (table, label) in STORE_DEPENDENTS {
            if count_dependents(&self.pool, table, "store_id", id).await? > 0 {
                return Err(restricted("Store", id, label));
            }
        }

        let result = sqlx::query("DELETE FROM stores WHERE id = ?1 AND business_id = ?2")
            .bind(id)
            .bind(business_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Store", id));
        }

        info!(id = %id, "Store deleted");
        Ok(())
    }
}

/// Names the duplicated value for `(business_id, code)` or `(business_id, name)`.
fn duplicate_store_field(err: DbError, store: &Store) -> DbError {
    let value = match &err {
        DbError::UniqueViolation { field, .. } if field.contains("code") => store.code.clone(),
        DbError::UniqueViolation { .. } => store.name.clone(),
        _ => return err,
    };
    err.with_duplicate_value(value)
}
