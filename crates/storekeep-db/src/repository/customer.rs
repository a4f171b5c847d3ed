//! # Customer Repository
//!
//! Customers of one store. Creation allocates the customer number from the
//! store counter inside the same transaction as the insert, so a failed
//! insert never consumes a number.
//!
//! ## Archive Policy
//! ```text
//! archive()  → is_archived = 1   hidden from list_active, kept in list_all,
//!                                readable by id, rejected by new sales
//! restore()  → is_archived = 0
//!
//! The customer keeps its number while archived. The unique index on
//! (store_id, customer_number) covers archived rows, so the number is
//! never given to anyone else.
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info};

use super::counter::CounterRepository;
use super::{ensure_store, new_id};
use crate::error::{DbError, DbResult};
use crate::locks::KeyedLocks;
use storekeep_core::{Customer, CustomerUpdate, NewCustomer};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
    locks: Arc<KeyedLocks>,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool, locks: Arc<KeyedLocks>) -> Self {
        CustomerRepository { pool, locks }
    }

    /// Creates a customer.
    ///
    /// ## Numbering
    /// Without `customer_number` the next counter value is used. An explicit
    /// number (migrating old records) is kept as-is and the counter is moved
    /// past it.
    ///
    /// ## Errors
    /// - `Validation` for missing name, phone or country code
    /// - `NotFound` if the store doesn't exist
    /// - `UniqueViolation` if an explicit number is already held
    pub async fn create(&self, store_id: &str, payload: NewCustomer) -> DbResult<Customer> {
        let payload = payload.validate()?;

        let _guard = self.locks.acquire(KeyedLocks::store_key(store_id)).await?;
        let mut tx = self.pool.begin().await?;

        let customer_number = match payload.customer_number {
            Some(number) => {
                CounterRepository::reserve_in(&mut tx, store_id, number).await?;
                number
            }
            None => CounterRepository::allocate_in(&mut tx, store_id).await?,
        };

        let now = Utc::now();
        let customer = Customer {
            id: new_id(),
            store_id: store_id.to_string(),
            name: payload.name,
            customer_number,
            mobile_number: payload.mobile_number,
            country_code: payload.country_code,
            address: payload.address,
            is_archived: false,
            created_at: now,
            updated_at: now,
        };

        debug!(store_id = %store_id, customer_number, "Creating customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, store_id, name, customer_number, mobile_number,
                country_code, address, is_archived, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.store_id)
        .bind(&customer.name)
        .bind(customer.customer_number)
        .bind(&customer.mobile_number)
        .bind(&customer.country_code)
        .bind(&customer.address)
        .bind(customer.is_archived)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(customer_number.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %customer.id, customer_number, "Customer created");
        Ok(customer)
    }

    /// Gets a customer of a store, archived or not.
    pub async fn get(&self, store_id: &str, id: &str) -> DbResult<Customer> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?1 AND store_id = ?2")
            .bind(id)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Lists customers that are not archived, by customer number.
    pub async fn list_active(&self, store_id: &str) -> DbResult<Vec<Customer>> {
        ensure_store(&self.pool, store_id).await?;
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
            WHERE store_id = ?1 AND is_archived = 0
            ORDER BY customer_number
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    /// Lists every customer including archived ones, by customer number.
    pub async fn list_all(&self, store_id: &str) -> DbResult<Vec<Customer>> {
        ensure_store(&self.pool, store_id).await?;
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE store_id = ?1 ORDER BY customer_number",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    /// Applies a partial update. The customer number never changes.
    pub async fn update(&self, store_id: &str, id: &str, update: CustomerUpdate) -> DbResult<Customer> {
        let mut customer = self.get(store_id, id).await?;
        update.apply(&mut customer)?;
        customer.updated_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?3, mobile_number = ?4, country_code = ?5, address = ?6, updated_at = ?7
            WHERE id = ?1 AND store_id = ?2
            "#,
        )
        .bind(id)
        .bind(store_id)
        .bind(&customer.name)
        .bind(&customer.mobile_number)
        .bind(&customer.country_code)
        .bind(&customer.address)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(customer)
    }

    /// Hides a customer from active lists and new sales.
    pub async fn archive(&self, store_id: &str, id: &str) -> DbResult<Customer> {
        self.set_archived(store_id, id, true).await
    }

    /// Brings an archived customer back.
    pub async fn restore(&self, store_id: &str, id: &str) -> DbResult<Customer> {
        self.set_archived(store_id, id, false).await
    }

    async fn set_archived(&self, store_id: &str, id: &str, archived: bool) -> DbResult<Customer> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET is_archived = ?3, updated_at = ?4
            WHERE id = ?1 AND store_id = ?2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(store_id)
        .bind(archived)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Customer", id))?;

        info!(id = %id, archived, "Customer archive state changed");
        Ok(customer)
    }
}
