//! # Profit/Loss Repository
//!
//! Lifetime sales aggregates per (store, inventory item).
//!
//! ## Update Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale of q units at price p, cost c, stock left r:                     │
//! │                                                                         │
//! │  no row yet    → INSERT sold = q, revenue = q·p, net = q·(p - c),      │
//! │                         remaining = r                                   │
//! │  row exists    → sold += q, revenue += q·p, net += q·(p - c),          │
//! │                  remaining = r                                          │
//! │                                                                         │
//! │  One INSERT … ON CONFLICT DO UPDATE on the sale's own transaction:     │
//! │  concurrent sales can never both insert, and increments never lose     │
//! │  each other. Totals only ever grow.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::{ensure_store, new_id};
use crate::error::{DbError, DbResult};
use storekeep_core::{ProfitLoss, ProfitLossReport, ProfitLossSummary, SaleAmounts};

/// Repository for profit/loss aggregates.
#[derive(Debug, Clone)]
pub struct ProfitLossRepository {
    pool: SqlitePool,
}

impl ProfitLossRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProfitLossRepository { pool }
    }

    /// Folds one sale into the item's aggregate, on the sale's transaction.
    pub(crate) async fn record_sale_in(
        conn: &mut SqliteConnection,
        store_id: &str,
        inventory_id: &str,
        amounts: &SaleAmounts,
        quantity_remaining: i64,
    ) -> DbResult<ProfitLoss> {
        let row = sqlx::query_as::<_, ProfitLoss>(
            r#"
            INSERT INTO profit_loss (
                id, store_id, inventory_id, total_quantity_sold, quantity_remaining,
                total_revenue_cents, total_net_profit_cents, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (store_id, inventory_id) DO UPDATE SET
                total_quantity_sold = total_quantity_sold + excluded.total_quantity_sold,
                quantity_remaining = excluded.quantity_remaining,
                total_revenue_cents = total_revenue_cents + excluded.total_revenue_cents,
                total_net_profit_cents = total_net_profit_cents + excluded.total_net_profit_cents,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(store_id)
        .bind(inventory_id)
        .bind(amounts.quantity_sold)
        .bind(quantity_remaining)
        .bind(amounts.revenue.cents())
        .bind(amounts.net_profit().cents())
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        debug!(
            store_id = %store_id,
            inventory_id = %inventory_id,
            total_quantity_sold = row.total_quantity_sold,
            total_net_profit = %row.total_net_profit(),
            "Profit/loss updated"
        );
        Ok(row)
    }

    /// Copies the item's current stock into `quantity_remaining`.
    ///
    /// Returns `None` when the item has never been sold (no row to refresh).
    pub async fn sync_remaining(&self, store_id: &str, inventory_id: &str) -> DbResult<Option<ProfitLoss>> {
        let mut conn = self.pool.acquire().await?;
        Self::sync_remaining_in(&mut conn, store_id, inventory_id).await
    }

    pub(crate) async fn sync_remaining_in(
        conn: &mut SqliteConnection,
        store_id: &str,
        inventory_id: &str,
    ) -> DbResult<Option<ProfitLoss>> {
        let row = sqlx::query_as::<_, ProfitLoss>(
            r#"
            UPDATE profit_loss SET
                quantity_remaining = (
                    SELECT quantity FROM inventory WHERE id = ?2 AND store_id = ?1
                ),
                updated_at = ?3
            WHERE store_id = ?1 AND inventory_id = ?2
            RETURNING *
            "#,
        )
        .bind(store_id)
        .bind(inventory_id)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Gets the aggregate of one item.
    ///
    /// ## Errors
    /// - `NotFound` if the item has no sales yet
    pub async fn get(&self, store_id: &str, inventory_id: &str) -> DbResult<ProfitLoss> {
        sqlx::query_as::<_, ProfitLoss>(
            "SELECT * FROM profit_loss WHERE store_id = ?1 AND inventory_id = ?2",
        )
        .bind(store_id)
        .bind(inventory_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("ProfitLoss", inventory_id))
    }

    /// Lists every aggregate of a store with its item, best earners first.
    pub async fn list(&self, store_id: &str) -> DbResult<Vec<ProfitLossReport>> {
        ensure_store(&self.pool, store_id).await?;

        let rows = sqlx::query_as::<_, ProfitLossReport>(
            r#"
            SELECT
                pl.id,
                pl.store_id,
                pl.inventory_id,
                i.name AS inventory_name,
                i.kind AS inventory_kind,
                i.selling_price_cents,
                i.cost_price_cents,
                pl.total_quantity_sold,
                pl.quantity_remaining,
                pl.total_revenue_cents,
                pl.total_net_profit_cents,
                pl.updated_at
            FROM profit_loss pl
            JOIN inventory i ON i.id = pl.inventory_id AND i.store_id = pl.store_id
            WHERE pl.store_id = ?1
            ORDER BY pl.total_net_profit_cents DESC, i.name
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Store-wide totals. A store without sales reports zeros.
    pub async fn summary(&self, store_id: &str) -> DbResult<ProfitLossSummary> {
        ensure_store(&self.pool, store_id).await?;

        let summary = sqlx::query_as::<_, ProfitLossSummary>(
            r#"
            SELECT
                ?1 AS store_id,
                COUNT(*) AS item_count,
                COALESCE(SUM(total_quantity_sold), 0) AS total_quantity_sold,
                COALESCE(SUM(total_revenue_cents), 0) AS total_revenue_cents,
                COALESCE(SUM(total_net_profit_cents), 0) AS total_net_profit_cents
            FROM profit_loss
            WHERE store_id = ?1
            "#,
        )
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use storekeep_core::{Money, NewBusiness, NewInventory, NewStore};

    async fn setup() -> (Database, String, String) {
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
        let item = db
            .inventory()
            .create(
                &store.id,
                NewInventory {
                    name: "Widget".to_string(),
                    kind: "product".to_string(),
                    cost_price_cents: 1000,
                    selling_price_cents: 2500,
                    quantity: 100,
                },
            )
            .await
            .unwrap();
        (db, store.id, item.id)
    }

    fn amounts(quantity: i64) -> SaleAmounts {
        SaleAmounts {
            quantity_sold: quantity,
            revenue: Money::from_cents(2500).multiply_quantity(quantity),
            cost_basis: Money::from_cents(1000).multiply_quantity(quantity),
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_then_accumulates() {
        let (db, store_id, item_id) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let first = ProfitLossRepository::record_sale_in(&mut conn, &store_id, &item_id, &amounts(3), 97)
            .await
            .unwrap();
        assert_eq!(first.total_quantity_sold, 3);
        assert_eq!(first.total_revenue_cents, 7500);
        assert_eq!(first.total_net_profit_cents, 4500);

        let second = ProfitLossRepository::record_sale_in(&mut conn, &store_id, &item_id, &amounts(2), 95)
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.total_quantity_sold, 5);
        assert_eq!(second.quantity_remaining, 95);
        assert_eq!(second.total_revenue_cents, 12_500);
        assert_eq!(second.total_net_profit_cents, 7_500);
    }

    #[tokio::test]
    async fn test_get_without_sales_is_not_found() {
        let (db, store_id, item_id) = setup().await;
        let err = db.profit_loss().get(&store_id, &item_id).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
        assert!(db.profit_loss().sync_remaining(&store_id, &item_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_summary_of_store_without_sales_is_zero() {
        let (db, store_id, _) = setup().await;
        let summary = db.profit_loss().summary(&store_id).await.unwrap();
        assert_eq!(summary.item_count, 0);
        assert_eq!(summary.total_revenue_cents, 0);
        assert_eq!(summary.store_id, store_id);
    }

    #[tokio::test]
    async fn test_list_joins_inventory() {
        let (db, store_id, item_id) = setup().await;
        {
            let mut conn = db.pool().acquire().await.unwrap();
            ProfitLossRepository::record_sale_in(&mut conn, &store_id, &item_id, &amounts(1), 99)
                .await
                .unwrap();
        }

        let rows = db.profit_loss().list(&store_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].inventory_name, "Widget");
        assert_eq!(rows[0].inventory_kind, storekeep_core::InventoryKind::Product);
        assert_eq!(rows[0].total_net_profit_cents, 1500);
    }
}
