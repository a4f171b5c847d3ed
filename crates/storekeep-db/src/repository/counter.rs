//! # Counter Repository
//!
//! Allocates customer numbers: sequential, gap-free under normal operation,
//! and never handed out twice within a store.
//!
//! ## Allocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One statement per allocation                         │
//! │                                                                         │
//! │  INSERT INTO store_counters (store_id, next_customer_number, ...)      │
//! │  VALUES (?store, 2, ...)                 ← first use: hand out 1       │
//! │  ON CONFLICT (store_id) DO UPDATE                                      │
//! │      SET next_customer_number = next_customer_number + 1               │
//! │  RETURNING next_customer_number - 1      ← the number allocated        │
//! │                                                                         │
//! │  read + increment happen inside one write, so two callers can          │
//! │  never observe the same value. Unknown store → FK failure → NotFound,  │
//! │  and the failed INSERT leaves no row behind.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The counter state lives only in the database. Allocations for one store
//! are additionally serialized through the `store:{id}` key lock.
//!
//! Numbers stop at `MAX_CUSTOMER_NUMBER`: the upsert only increments while
//! the next value is in range, so the stored counter never overflows.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use tracing::debug;

use super::{ensure_store, missing_parent};
use crate::error::{DbError, DbResult};
use crate::locks::KeyedLocks;
use storekeep_core::{ValidationError, MAX_CUSTOMER_NUMBER};

/// Repository for per-store customer number counters.
#[derive(Debug, Clone)]
pub struct CounterRepository {
    pool: SqlitePool,
    locks: Arc<KeyedLocks>,
}

impl CounterRepository {
    pub fn new(pool: SqlitePool, locks: Arc<KeyedLocks>) -> Self {
        CounterRepository { pool, locks }
    }

    /// Allocates the next customer number of a store.
    ///
    /// ## Returns
    /// `1` on first use, then `2, 3, …`.
    ///
    /// ## Errors
    /// - `NotFound` if the store doesn't exist
    /// - `Validation` once the store has handed out `MAX_CUSTOMER_NUMBER`
    pub async fn next_customer_number(&self, store_id: &str) -> DbResult<i64> {
        let _guard = self.locks.acquire(KeyedLocks::store_key(store_id)).await?;
        let mut conn = self.pool.acquire().await?;
        Self::allocate_in(&mut conn, store_id).await
    }

    /// Reads the number the next allocation will return, without allocating.
    pub async fn peek(&self, store_id: &str) -> DbResult<i64> {
        let next: Option<i64> = sqlx::query_scalar(
            "SELECT next_customer_number FROM store_counters WHERE store_id = ?1",
        )
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        match next {
            Some(next) => Ok(next),
            None => {
                ensure_store(&self.pool, store_id).await?;
                Ok(1)
            }
        }
    }

    /// Allocation on a caller's connection, so customer creation can
    /// allocate and insert in one transaction.
    pub(crate) async fn allocate_in(conn: &mut SqliteConnection, store_id: &str) -> DbResult<i64> {
        let number: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO store_counters (store_id, next_customer_number, updated_at)
            VALUES (?1, 2, ?2)
            ON CONFLICT (store_id) DO UPDATE SET
                next_customer_number = next_customer_number + 1,
                updated_at = excluded.updated_at
            WHERE next_customer_number <= ?3
            RETURNING next_customer_number - 1
            "#,
        )
        .bind(store_id)
        .bind(Utc::now())
        .bind(MAX_CUSTOMER_NUMBER)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| missing_parent(e.into(), "Store", store_id))?;

        let number = number.ok_or_else(|| {
            DbError::Validation(ValidationError::OutOfRange {
                field: "customerNumber".to_string(),
                min: 1,
                max: MAX_CUSTOMER_NUMBER,
            })
        })?;

        debug!(store_id = %store_id, customer_number = number, "Allocated customer number");
        Ok(number)
    }

    /// Moves the counter past an explicitly chosen number, so the
    /// allocator never issues it later. Never moves the counter backwards.
    /// `number` is already validated to be at most `MAX_CUSTOMER_NUMBER`.
    pub(crate) async fn reserve_in(
        conn: &mut SqliteConnection,
        store_id: &str,
        number: i64,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO store_counters (store_id, next_customer_number, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (store_id) DO UPDATE SET
                next_customer_number = MAX(next_customer_number, excluded.next_customer_number),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(store_id)
        .bind(number.saturating_add(1))
        .bind(Utc::now())
        .execute(&mut *conn)
        .await
        .map_err(|e| missing_parent(e.into(), "Store", store_id))?;

        debug!(store_id = %store_id, customer_number = number, "Reserved explicit customer number");
        Ok(())
    }

    /// Creates the counter row of a new store.
    pub(crate) async fn init_in(conn: &mut SqliteConnection, store_id: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO store_counters (store_id, next_customer_number, updated_at)
            VALUES (?1, 1, ?2)
            "#,
        )
        .bind(store_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::{Database, DbConfig};
    use std::collections::HashSet;
    use storekeep_core::{NewBusiness, NewCustomer, NewStore, MAX_CUSTOMER_NUMBER};

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let business = db
            .businesses()
            .create(NewBusiness {
                name: "Acme".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let store = db
            .stores()
            .create(
                &business.id,
                NewStore {
                    name: "New York".to_string(),
                    code: "NYC".to_string(),
                    is_active: true,
                },
            )
            .await
            .unwrap();
        (db, store.id)
    }

    #[tokio::test]
    async fn test_first_allocation_is_one() {
        let (db, store_id) = setup().await;
        assert_eq!(db.counters().peek(&store_id).await.unwrap(), 1);
        assert_eq!(db.counters().next_customer_number(&store_id).await.unwrap(), 1);
        assert_eq!(db.counters().next_customer_number(&store_id).await.unwrap(), 2);
        assert_eq!(db.counters().peek(&store_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_unknown_store_is_not_found_and_creates_nothing() {
        let (db, _) = setup().await;
        let err = db
            .counters()
            .next_customer_number("no-such-store")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let rows: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM store_counters WHERE store_id = 'no-such-store'")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(rows, 0);
        assert_eq!(
            db.counters().peek("no-such-store").await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_concurrent_allocations_are_distinct_and_gap_free() {
        let (db, store_id) = setup().await;

        let mut handles = Vec::new();
        for _ in 0..50 {
            let db = db.clone();
            let store_id = store_id.clone();
            handles.push(tokio::spawn(async move {
                db.counters().next_customer_number(&store_id).await.unwrap()
            }));
        }

        let mut numbers = HashSet::new();
        for handle in handles {
            assert!(numbers.insert(handle.await.unwrap()));
        }

        let expected: HashSet<i64> = (1..=50).collect();
        assert_eq!(numbers, expected);
    }

    #[tokio::test]
    async fn test_stores_count_independently() {
        let (db, first) = setup().await;
        let business = db.businesses().list().await.unwrap().remove(0);
        let second = db
            .stores()
            .create(
                &business.id,
                NewStore {
                    name: "Los Angeles".to_string(),
                    code: "LA".to_string(),
                    is_active: true,
                },
            )
            .await
            .unwrap();

        db.counters().next_customer_number(&first).await.unwrap();
        db.counters().next_customer_number(&first).await.unwrap();
        assert_eq!(db.counters().next_customer_number(&second.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_counter_stops_at_max_customer_number() {
        let (db, store_id) = setup().await;
        let customer = |number: Option<i64>| NewCustomer {
            name: "Ada".to_string(),
            mobile_number: "555-0100".to_string(),
            country_code: "+1".to_string(),
            address: None,
            customer_number: number,
        };

        let err = db
            .customers()
            .create(&store_id, customer(Some(i64::MAX)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let last = db
            .customers()
            .create(&store_id, customer(Some(MAX_CUSTOMER_NUMBER)))
            .await
            .unwrap();
        assert_eq!(last.customer_number, MAX_CUSTOMER_NUMBER);
        assert_eq!(db.counters().peek(&store_id).await.unwrap(), MAX_CUSTOMER_NUMBER + 1);

        for _ in 0..2 {
            let err = db.counters().next_customer_number(&store_id).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            let err = db.customers().create(&store_id, customer(None)).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }

        // The counter is untouched and still reads back as an integer.
        assert_eq!(db.counters().peek(&store_id).await.unwrap(), MAX_CUSTOMER_NUMBER + 1);
    }

    #[tokio::test]
    async fn test_last_number_is_allocated_once() {
        let (db, store_id) = setup().await;
        sqlx::query("UPDATE store_counters SET next_customer_number = ?1 WHERE store_id = ?2")
            .bind(MAX_CUSTOMER_NUMBER)
            .bind(&store_id)
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(
            db.counters().next_customer_number(&store_id).await.unwrap(),
            MAX_CUSTOMER_NUMBER
        );
        assert!(db.counters().next_customer_number(&store_id).await.is_err());
    }
}
