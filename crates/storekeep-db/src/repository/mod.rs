//! # Repository Module
//!
//! Database repository implementations for Storekeep.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler / importer / seed                                        │
//! │       │                                                                 │
//! │       │  db.customers().create(store_id, payload)                      │
//! │       ▼                                                                 │
//! │  CustomerRepository                                                    │
//! │  ├── validate payload (storekeep-core)                                 │
//! │  ├── take key lock if the write allocates or reserves                  │
//! │  ├── run SQL in one transaction                                        │
//! │  └── map sqlx errors to DbError                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Every query on a store-owned table filters on store_id, and every     │
//! │  query on stores filters on business_id. Rows of another tenant are    │
//! │  indistinguishable from missing rows.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write-First Transactions
//! Writing transactions start with a write statement (an upsert or a
//! conditional UPDATE) so SQLite takes the write lock up front and waits on
//! `busy_timeout`, instead of failing when a read snapshot has to be
//! upgraded.
//!
//! ## Available Repositories
//!
//! - [`BusinessRepository`](business::BusinessRepository) - Tenant roots
//! - [`StoreRepository`](store::StoreRepository) - Stores and their counter rows
//! - [`CounterRepository`](counter::CounterRepository) - Customer number allocation
//! - [`CustomerRepository`](customer::CustomerRepository) - Customers, archive/restore
//! - [`StaffRepository`](staff::StaffRepository) - Staff, archive/restore
//! - [`InventoryRepository`](inventory::InventoryRepository) - Items and stock
//! - [`SaleRepository`](sale::SaleRepository) - The sale pipeline
//! - [`ProfitLossRepository`](profit_loss::ProfitLossRepository) - Per-item aggregates

pub mod business;
pub mod counter;
pub mod customer;
pub mod inventory;
pub mod profit_loss;
pub mod sale;
pub mod staff;
pub mod store;

use sqlx::{Executor, Sqlite};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// A SQLite transaction. Named to stay clear of the `Transaction` entity.
pub type Tx<'c> = sqlx::Transaction<'c, Sqlite>;

/// Generates a new entity id.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Fails with NotFound(Store) unless the store exists.
pub(crate) async fn ensure_store<'e, E>(executor: E, store_id: &str) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM stores WHERE id = ?1")
        .bind(store_id)
        .fetch_optional(executor)
        .await?;

    match exists {
        Some(_) => Ok(()),
        None => Err(DbError::not_found("Store", store_id)),
    }
}

/// Counts rows of `table` owned through `column = id`.
///
/// `table` and `column` are compile-time constants from this crate, never
/// user input.
pub(crate) async fn count_dependents<'e, E>(
    executor: E,
    table: &'static str,
    column: &'static str,
    id: &str,
) -> DbResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1");
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_one(executor)
        .await?;
    Ok(count)
}

/// The error returned when a delete is blocked by dependent rows.
pub(crate) fn restricted(entity: &str, id: &str, dependents: &str) -> DbError {
    DbError::ForeignKeyViolation {
        message: format!("{entity} {id} still has {dependents}"),
    }
}

/// Turns a foreign key failure on insert into NotFound for the parent.
///
/// SQLite does not say which key failed, so callers use this only where a
/// single parent reference can be missing.
pub(crate) fn missing_parent(err: DbError, entity: &str, id: &str) -> DbError {
    match err {
        DbError::ForeignKeyViolation { .. } => DbError::not_found(entity, id),
        other => other,
    }
}
