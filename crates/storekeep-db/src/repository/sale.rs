//! # Sale Repository
//!
//! The sale pipeline: one request sells `quantity` units of one item to one
//! customer, handled by one staff member, and either every record appears
//! or none does.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       record_sale()                                     │
//! │                                                                         │
//! │  validate request (quantity > 0, ids present)                          │
//! │       │                                                                 │
//! │  acquire key lock  stock:{store}:{item}                                │
//! │       │                                                                 │
//! │  BEGIN ──────────────────────────────────────────────────────────┐     │
//! │  1. reserve stock   UPDATE inventory SET quantity = quantity - q │     │
//! │                     WHERE … AND (service OR quantity >= q)       │     │
//! │                     0 rows → NotFound / InsufficientStock        │     │
//! │  2. price           total = q × selling_price (snapshot)         │     │
//! │  3. staff           same store, not archived, else NotFound      │     │
//! │  4. customer        same store, not archived, else NotFound      │     │
//! │  5. INSERT order → checkout(staff) → transaction(customer)       │     │
//! │  6. profit/loss upsert (remaining = post-sale stock)             │     │
//! │  COMMIT ─────────────────────────────────────────────────────────┘     │
//! │                                                                         │
//! │  Any `?` before COMMIT drops the transaction: sqlx rolls it back,      │
//! │  so stock, records and aggregates stay untouched.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Reserve First
//! The check and the decrement are one conditional UPDATE, so two sales of
//! the last unit cannot both pass the check. Starting with a write also
//! makes SQLite take its write lock at the first statement.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::profit_loss::ProfitLossRepository;
use super::{ensure_store, new_id};
use crate::error::{DbError, DbResult};
use crate::locks::KeyedLocks;
use storekeep_core::{
    Checkout, Customer, Inventory, InventoryKind, Order, SaleAmounts, SaleDetails, SaleRequest,
    Staff, Transaction, ValidationError,
};

/// Repository for sales.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    locks: Arc<KeyedLocks>,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool, locks: Arc<KeyedLocks>) -> Self {
        SaleRepository { pool, locks }
    }

    /// Records one sale atomically.
    ///
    /// ## Returns
    /// The new transaction with its checkout, order, item (post-sale
    /// stock), customer and staff.
    ///
    /// ## Errors
    /// - `Validation` for a non-positive quantity or missing ids
    /// - `NotFound` for an item, staff member or customer that is missing,
    ///   archived or owned by another store
    /// - `InsufficientStock` if a product has fewer than `quantity` units
    pub async fn record_sale(&self, request: SaleRequest) -> DbResult<SaleDetails> {
        request.validate()?;
        let SaleRequest {
            store_id,
            inventory_id,
            quantity,
            staff_id,
            customer_id,
        } = request;

        let _guard = self
            .locks
            .acquire(KeyedLocks::stock_key(&store_id, &inventory_id))
            .await?;

        debug!(
            store_id = %store_id,
            inventory_id = %inventory_id,
            quantity,
            "Recording sale"
        );

        let mut tx = self.pool.begin().await?;

        let inventory = match reserve_stock(&mut tx, &store_id, &inventory_id, quantity).await {
            Ok(item) => item,
            Err(err) => {
                warn!(
                    store_id = %store_id,
                    inventory_id = %inventory_id,
                    quantity,
                    error = %err,
                    "Sale rejected"
                );
                return Err(err);
            }
        };

        let amounts = SaleAmounts::for_item(&inventory, quantity).ok_or_else(|| {
            ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: SaleAmounts::max_quantity(&inventory),
            }
        })?;

        let staff = active_staff(&mut tx, &store_id, &staff_id).await?;
        let customer = active_customer(&mut tx, &store_id, &customer_id).await?;

        let now = Utc::now();

        let order = Order {
            id: new_id(),
            store_id: store_id.clone(),
            inventory_id: inventory_id.clone(),
            quantity,
            unit_price_cents: inventory.selling_price_cents,
            total_price_cents: amounts.revenue.cents(),
            created_at: now,
        };
        insert_order(&mut tx, &order).await?;

        let checkout = Checkout {
            id: new_id(),
            store_id: store_id.clone(),
            staff_id: staff.id.clone(),
            order_id: order.id.clone(),
            total_price_cents: order.total_price_cents,
            created_at: now,
        };
        insert_checkout(&mut tx, &checkout).await?;

        let transaction = Transaction {
            id: new_id(),
            store_id: store_id.clone(),
            customer_id: customer.id.clone(),
            inventory_id: inventory_id.clone(),
            checkout_id: checkout.id.clone(),
            transaction_date: now,
        };
        insert_transaction(&mut tx, &transaction).await?;

        ProfitLossRepository::record_sale_in(
            &mut tx,
            &store_id,
            &inventory_id,
            &amounts,
            inventory.quantity,
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            transaction_id = %transaction.id,
            store_id = %store_id,
            item = %inventory.name,
            quantity,
            total = %order.total_price(),
            remaining = inventory.quantity,
            "Sale recorded"
        );

        Ok(SaleDetails {
            transaction,
            checkout,
            order,
            inventory,
            customer,
            staff,
        })
    }

    /// Gets one sale with all its records.
    pub async fn get(&self, store_id: &str, transaction_id: &str) -> DbResult<SaleDetails> {
        let transaction = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE id = ?1 AND store_id = ?2",
        )
        .bind(transaction_id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Transaction", transaction_id))?;

        self.load_details(transaction).await
    }

    /// Lists a store's sales, newest first.
    pub async fn list(&self, store_id: &str) -> DbResult<Vec<SaleDetails>> {
        ensure_store(&self.pool, store_id).await?;

        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE store_id = ?1
            ORDER BY transaction_date DESC, rowid DESC
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        self.load_all(transactions).await
    }

    /// Lists one customer's purchases, newest first.
    pub async fn list_for_customer(&self, store_id: &str, customer_id: &str) -> DbResult<Vec<SaleDetails>> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE store_id = ?1 AND customer_id = ?2
            ORDER BY transaction_date DESC, rowid DESC
            "#,
        )
        .bind(store_id)
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        self.load_all(transactions).await
    }

    async fn load_all(&self, transactions: Vec<Transaction>) -> DbResult<Vec<SaleDetails>> {
        let mut sales = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            sales.push(self.load_details(transaction).await?);
        }
        Ok(sales)
    }

    /// Fetches the records a transaction points at. Archived customers and
    /// staff are included: history stays readable.
    async fn load_details(&self, transaction: Transaction) -> DbResult<SaleDetails> {
        let store_id = transaction.store_id.as_str();

        let checkout = sqlx::query_as::<_, Checkout>(
            "SELECT * FROM checkouts WHERE id = ?1 AND store_id = ?2",
        )
        .bind(&transaction.checkout_id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Checkout", &transaction.checkout_id))?;

        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?1 AND store_id = ?2")
            .bind(&checkout.order_id)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Order", &checkout.order_id))?;

        let inventory = sqlx::query_as::<_, Inventory>(
            "SELECT * FROM inventory WHERE id = ?1 AND store_id = ?2",
        )
        .bind(&transaction.inventory_id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Inventory", &transaction.inventory_id))?;

        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE id = ?1 AND store_id = ?2",
        )
        .bind(&transaction.customer_id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Customer", &transaction.customer_id))?;

        let staff = sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE id = ?1 AND store_id = ?2")
            .bind(&checkout.staff_id)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Staff", &checkout.staff_id))?;

        Ok(SaleDetails {
            transaction,
            checkout,
            order,
            inventory,
            customer,
            staff,
        })
    }
}

// =============================================================================
// Pipeline steps (all on the sale's transaction)
// =============================================================================

/// Decrements stock if enough is on hand; services pass through unchanged.
///
/// Returns the item as it is after the sale.
async fn reserve_stock(
    conn: &mut SqliteConnection,
    store_id: &str,
    inventory_id: &str,
    quantity: i64,
) -> DbResult<Inventory> {
    let reserved = sqlx::query_as::<_, Inventory>(
        r#"
        UPDATE inventory SET
            quantity = CASE kind WHEN 'product' THEN quantity - ?3 ELSE quantity END,
            updated_at = CASE kind WHEN 'product' THEN ?4 ELSE updated_at END
        WHERE id = ?1 AND store_id = ?2 AND (kind = 'service' OR quantity >= ?3)
        RETURNING *
        "#,
    )
    .bind(inventory_id)
    .bind(store_id)
    .bind(quantity)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(item) = reserved {
        return Ok(item);
    }

    let current = sqlx::query_as::<_, Inventory>(
        "SELECT * FROM inventory WHERE id = ?1 AND store_id = ?2",
    )
    .bind(inventory_id)
    .bind(store_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("Inventory", inventory_id))?;

    match current.kind {
        InventoryKind::Product => Err(DbError::InsufficientStock {
            item: current.name,
            available: current.quantity,
            requested: quantity,
        }),
        // Unreachable while the UPDATE lets every service through.
        InventoryKind::Service => Err(DbError::Internal(format!(
            "service {inventory_id} was not reserved"
        ))),
    }
}

async fn active_staff(conn: &mut SqliteConnection, store_id: &str, staff_id: &str) -> DbResult<Staff> {
    sqlx::query_as::<_, Staff>(
        "SELECT * FROM staff WHERE id = ?1 AND store_id = ?2 AND is_archived = 0",
    )
    .bind(staff_id)
    .bind(store_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("Staff", staff_id))
}

async fn active_customer(
    conn: &mut SqliteConnection,
    store_id: &str,
    customer_id: &str,
) -> DbResult<Customer> {
    sqlx::query_as::<_, Customer>(
        "SELECT * FROM customers WHERE id = ?1 AND store_id = ?2 AND is_archived = 0",
    )
    .bind(customer_id)
    .bind(store_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("Customer", customer_id))
}

async fn insert_order(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (
            id, store_id, inventory_id, quantity, unit_price_cents, total_price_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&order.id)
    .bind(&order.store_id)
    .bind(&order.inventory_id)
    .bind(order.quantity)
    .bind(order.unit_price_cents)
    .bind(order.total_price_cents)
    .bind(order.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_checkout(conn: &mut SqliteConnection, checkout: &Checkout) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO checkouts (id, store_id, staff_id, order_id, total_price_cents, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&checkout.id)
    .bind(&checkout.store_id)
    .bind(&checkout.staff_id)
    .bind(&checkout.order_id)
    .bind(checkout.total_price_cents)
    .bind(checkout.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_transaction(conn: &mut SqliteConnection, transaction: &Transaction) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO transactions (
            id, store_id, customer_id, inventory_id, checkout_id, transaction_date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&transaction.id)
    .bind(&transaction.store_id)
    .bind(&transaction.customer_id)
    .bind(&transaction.inventory_id)
    .bind(&transaction.checkout_id)
    .bind(transaction.transaction_date)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::{DbError, ErrorKind};
    use crate::{Database, DbConfig};
    use storekeep_core::{
        Inventory, NewBusiness, NewCustomer, NewInventory, NewStaff, NewStore, SaleRequest,
    };

    struct Fixture {
        db: Database,
        store_id: String,
        staff_id: String,
        customer_id: String,
        widget: Inventory,
    }

    async fn setup() -> Fixture {
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
        let staff = db
            .staff()
            .create(
                &store.id,
                NewStaff {
                    name: "Grace".to_string(),
                    staff_number: "S-001".to_string(),
                    mobile_number: "555-0199".to_string(),
                    country_code: "+1".to_string(),
                    pay_per_month_cents: 0,
                    signed_contract: true,
                },
            )
            .await
            .unwrap();
        let customer = db
            .customers()
            .create(
                &store.id,
                NewCustomer {
                    name: "Ada".to_string(),
                    mobile_number: "555-0100".to_string(),
                    country_code: "+1".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let widget = db
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

        Fixture {
            db,
            store_id: store.id,
            staff_id: staff.id,
            customer_id: customer.id,
            widget,
        }
    }

    impl Fixture {
        fn request(&self, quantity: i64) -> SaleRequest {
            SaleRequest {
                store_id: self.store_id.clone(),
                inventory_id: self.widget.id.clone(),
                quantity,
                staff_id: self.staff_id.clone(),
                customer_id: self.customer_id.clone(),
            }
        }

        async fn counts(&self) -> (i64, i64, i64) {
            let pool = self.db.pool();
            let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
                .fetch_one(pool)
                .await
                .unwrap();
            let checkouts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM checkouts")
                .fetch_one(pool)
                .await
                .unwrap();
            let transactions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
                .fetch_one(pool)
                .await
                .unwrap();
            (orders, checkouts, transactions)
        }
    }

    #[tokio::test]
    async fn test_sale_writes_every_record() {
        let f = setup().await;
        let sale = f.db.sales().record_sale(f.request(3)).await.unwrap();

        assert_eq!(sale.order.quantity, 3);
        assert_eq!(sale.order.unit_price_cents, 2500);
        assert_eq!(sale.order.total_price_cents, 7500);
        assert_eq!(sale.checkout.total_price_cents, 7500);
        assert_eq!(sale.checkout.staff_id, f.staff_id);
        assert_eq!(sale.checkout.order_id, sale.order.id);
        assert_eq!(sale.transaction.customer_id, f.customer_id);
        assert_eq!(sale.transaction.checkout_id, sale.checkout.id);
        assert_eq!(sale.inventory.quantity, 97);

        let pl = f.db.profit_loss().get(&f.store_id, &f.widget.id).await.unwrap();
        assert_eq!(pl.total_quantity_sold, 3);
        assert_eq!(pl.quantity_remaining, 97);
        assert_eq!(pl.total_revenue_cents, 7500);
        assert_eq!(pl.total_net_profit_cents, 4500);

        assert_eq!(f.counts().await, (1, 1, 1));
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let f = setup().await;
        let err = f.db.sales().record_sale(f.request(101)).await.unwrap_err();

        match err {
            DbError::InsufficientStock { available, requested, .. } => {
                assert_eq!(available, 100);
                assert_eq!(requested, 101);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(f.counts().await, (0, 0, 0));
        assert_eq!(
            f.db.inventory().get(&f.store_id, &f.widget.id).await.unwrap().quantity,
            100
        );
    }

    #[tokio::test]
    async fn test_non_positive_quantity_is_validation_error() {
        let f = setup().await;
        for quantity in [0, -1] {
            let err = f.db.sales().record_sale(f.request(quantity)).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        assert_eq!(f.counts().await, (0, 0, 0));
    }

    #[tokio::test]
    async fn test_unknown_customer_rolls_back_stock() {
        let f = setup().await;
        let mut request = f.request(2);
        request.customer_id = "missing".to_string();

        let err = f.db.sales().record_sale(request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        assert_eq!(
            f.db.inventory().get(&f.store_id, &f.widget.id).await.unwrap().quantity,
            100
        );
        assert_eq!(f.counts().await, (0, 0, 0));
        assert!(f.db.profit_loss().get(&f.store_id, &f.widget.id).await.is_err());
    }

    #[tokio::test]
    async fn test_archived_staff_cannot_sell() {
        let f = setup().await;
        f.db.staff().archive(&f.store_id, &f.staff_id).await.unwrap();

        let err = f.db.sales().record_sale(f.request(1)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Staff"));
    }

    #[tokio::test]
    async fn test_service_sale_leaves_quantity_alone() {
        let f = setup().await;
        let repair = f
            .db
            .inventory()
            .create(
                &f.store_id,
                NewInventory {
                    name: "Repair".to_string(),
                    kind: "service".to_string(),
                    cost_price_cents: 1500,
                    selling_price_cents: 5000,
                    quantity: 0,
                },
            )
            .await
            .unwrap();

        let mut request = f.request(4);
        request.inventory_id = repair.id.clone();
        let sale = f.db.sales().record_sale(request).await.unwrap();

        assert_eq!(sale.inventory.quantity, 0);
        assert_eq!(sale.order.total_price_cents, 20_000);
        let pl = f.db.profit_loss().get(&f.store_id, &repair.id).await.unwrap();
        assert_eq!(pl.total_net_profit_cents, 14_000);
    }

    #[tokio::test]
    async fn test_sale_reads_and_listing() {
        let f = setup().await;
        let first = f.db.sales().record_sale(f.request(1)).await.unwrap();
        let second = f.db.sales().record_sale(f.request(2)).await.unwrap();

        let fetched = f
            .db
            .sales()
            .get(&f.store_id, &first.transaction.id)
            .await
            .unwrap();
        assert_eq!(fetched.order.quantity, 1);
        assert_eq!(fetched.staff.id, f.staff_id);

        let all = f.db.sales().list(&f.store_id).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].transaction.id, second.transaction.id);

        let mine = f
            .db
            .sales()
            .list_for_customer(&f.store_id, &f.customer_id)
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);
    }

    #[tokio::test]
    async fn test_price_change_does_not_touch_past_orders() {
        let f = setup().await;
        let sale = f.db.sales().record_sale(f.request(1)).await.unwrap();

        f.db
            .inventory()
            .update(
                &f.store_id,
                &f.widget.id,
                storekeep_core::InventoryUpdate {
                    selling_price_cents: Some(9900),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let fetched = f
            .db
            .sales()
            .get(&f.store_id, &sale.transaction.id)
            .await
            .unwrap();
        assert_eq!(fetched.order.unit_price_cents, 2500);
        assert_eq!(fetched.order.total_price_cents, 2500);
    }

    #[tokio::test]
    async fn test_staff_and_customer_must_belong_to_the_store() {
        let f = setup().await;
        let stores = f.db.stores();
        let business_id = stores.get_by_id(&f.store_id).await.unwrap().business_id;
        let brooklyn = stores
            .create(
                &business_id,
                NewStore {
                    name: "Brooklyn".to_string(),
                    code: "BKN".to_string(),
                    is_active: true,
                },
            )
            .await
            .unwrap();
        let outsider = f
            .db
            .staff()
            .create(
                &brooklyn.id,
                NewStaff {
                    name: "Linus".to_string(),
                    staff_number: "S-900".to_string(),
                    mobile_number: "555-0300".to_string(),
                    country_code: "+1".to_string(),
                    pay_per_month_cents: 0,
                    signed_contract: true,
                },
            )
            .await
            .unwrap();
        let visitor = f
            .db
            .customers()
            .create(
                &brooklyn.id,
                NewCustomer {
                    name: "Barbara".to_string(),
                    mobile_number: "555-0301".to_string(),
                    country_code: "+1".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let mut request = f.request(1);
        request.staff_id = outsider.id;
        let err = f.db.sales().record_sale(request).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Staff"));

        let mut request = f.request(1);
        request.customer_id = visitor.id;
        let err = f.db.sales().record_sale(request).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Customer"));

        assert_eq!(f.counts().await, (0, 0, 0));
        assert_eq!(
            f.db.inventory().get(&f.store_id, &f.widget.id).await.unwrap().quantity,
            100
        );
    }

    #[tokio::test]
    async fn test_large_service_sale_is_accepted() {
        let f = setup().await;
        let consult = f
            .db
            .inventory()
            .create(
                &f.store_id,
                NewInventory {
                    name: "Consulting minute".to_string(),
                    kind: "service".to_string(),
                    cost_price_cents: 0,
                    selling_price_cents: 1,
                    quantity: 0,
                },
            )
            .await
            .unwrap();

        let mut request = f.request(250_000);
        request.inventory_id = consult.id.clone();
        let sale = f.db.sales().record_sale(request).await.unwrap();
        assert_eq!(sale.order.total_price_cents, 250_000);

        let pl = f.db.profit_loss().get(&f.store_id, &consult.id).await.unwrap();
        assert_eq!(pl.total_quantity_sold, 250_000);
    }

    #[tokio::test]
    async fn test_overflowing_total_is_validation_error() {
        let f = setup().await;
        let repair = f
            .db
            .inventory()
            .create(
                &f.store_id,
                NewInventory {
                    name: "Repair".to_string(),
                    kind: "service".to_string(),
                    cost_price_cents: 1500,
                    selling_price_cents: 5000,
                    quantity: 0,
                },
            )
            .await
            .unwrap();

        let mut request = f.request(i64::MAX / 1000);
        request.inventory_id = repair.id;
        let err = f.db.sales().record_sale(request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(f.counts().await, (0, 0, 0));
    }

    #[tokio::test]
    async fn test_turning_sold_product_into_service_zeroes_profit_loss_stock() {
        let f = setup().await;
        f.db.sales().record_sale(f.request(3)).await.unwrap();
        assert_eq!(
            f.db.profit_loss()
                .get(&f.store_id, &f.widget.id)
                .await
                .unwrap()
                .quantity_remaining,
            97
        );

        let service = f
            .db
            .inventory()
            .update(
                &f.store_id,
                &f.widget.id,
                storekeep_core::InventoryUpdate {
                    kind: Some("service".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(service.quantity, 0);

        let pl = f.db.profit_loss().get(&f.store_id, &f.widget.id).await.unwrap();
        assert_eq!(pl.quantity_remaining, 0);
        assert_eq!(pl.total_quantity_sold, 3);
    }
}
