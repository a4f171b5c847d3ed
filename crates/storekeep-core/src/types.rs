//! # Domain Types
//!
//! Entities, input payloads and report rows used throughout Storekeep.
//!
//! ## Ownership Graph
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Business ──owns──► Store ──owns──┬──► StoreCounter (1:1)               │
//! │                                   ├──► Customer                         │
//! │                                   ├──► Staff                            │
//! │                                   └──► Inventory                        │
//! │                                                                         │
//! │  One sale:  Order ──► Checkout (staff) ──► Transaction (customer)       │
//! │               │                                                         │
//! │               └──► Inventory ──► ProfitLoss (store, inventory)          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has a UUID `id` used for relations. Human-facing keys
//! (store code, customer number, staff number, item name) are unique per
//! owning store or business.
//!
//! ## Wire Format
//! All types serialize as camelCase JSON; `Inventory.kind` travels as `type`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Business
// =============================================================================

/// A business (tenant root). Owns stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Business {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Store
// =============================================================================

/// A physical or logical sales location owned by a business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Store {
    pub id: String,
    pub business_id: String,
    pub name: String,
    /// Short code, always stored upper-cased ("NYC").
    pub code: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Per-store sequence generator for customer numbers.
///
/// Lives in the database next to its store, never in process memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StoreCounter {
    pub store_id: String,
    /// The value the next allocation will return. Starts at 1.
    pub next_customer_number: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Customer & Staff
// =============================================================================

/// A customer of one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub store_id: String,
    pub name: String,
    /// Sequential per store, issued by the store counter.
    pub customer_number: i64,
    pub mobile_number: String,
    pub country_code: String,
    pub address: Option<String>,
    /// Archived customers are kept but hidden from active lists.
    pub is_archived: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A staff member of one store. Checkouts are attributed to staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Staff {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub staff_number: String,
    pub mobile_number: String,
    pub country_code: String,
    pub pay_per_month_cents: i64,
    pub signed_contract: bool,
    pub is_archived: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Staff {
    /// Monthly pay as Money.
    #[inline]
    pub fn pay_per_month(&self) -> Money {
        Money::from_cents(self.pay_per_month_cents)
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// What an inventory item is. Only products deplete stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum InventoryKind {
    /// Physical goods with a stock count.
    Product,
    /// Labour or time; the quantity field is ignored.
    Service,
}

impl InventoryKind {
    /// Accepted spellings, exactly as stored.
    pub const ALLOWED: [&'static str; 2] = ["product", "service"];

    /// Parses the wire value. Surrounding whitespace is ignored, case is not.
    ///
    /// ## Example
    /// ```rust
    /// use storekeep_core::InventoryKind;
    ///
    /// assert_eq!(InventoryKind::parse(" product ").unwrap(), InventoryKind::Product);
    /// assert!(InventoryKind::parse("Product").is_err());
    /// assert!(InventoryKind::parse("goods").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim() {
            "product" => Ok(InventoryKind::Product),
            "service" => Ok(InventoryKind::Service),
            "" => Err(ValidationError::Required {
                field: "type".to_string(),
            }),
            _ => Err(ValidationError::NotAllowed {
                field: "type".to_string(),
                allowed: Self::ALLOWED.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }

    /// Lowercase name as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            InventoryKind::Product => "product",
            InventoryKind::Service => "service",
        }
    }

    /// Whether selling this kind of item depletes stock.
    #[inline]
    pub const fn tracks_stock(&self) -> bool {
        matches!(self, InventoryKind::Product)
    }
}

impl fmt::Display for InventoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product or service a store sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Inventory {
    pub id: String,
    pub store_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InventoryKind,
    pub cost_price_cents: i64,
    pub selling_price_cents: i64,
    /// Units on hand. Meaningful only for products.
    pub quantity: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Inventory {
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// Checks whether `quantity` units can be sold right now.
    ///
    /// Services are always sellable; products need enough stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        !self.kind.tracks_stock() || self.quantity >= quantity
    }
}

// =============================================================================
// Sale records
// =============================================================================

/// One sale line. Price is a snapshot taken at sale time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub store_id: String,
    pub inventory_id: String,
    pub quantity: i64,
    /// Selling price at the time of sale (frozen).
    pub unit_price_cents: i64,
    /// `quantity × unit_price_cents`, never re-derived.
    pub total_price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

/// The receipt that finalizes exactly one order, attributed to a staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Checkout {
    pub id: String,
    pub store_id: String,
    pub staff_id: String,
    pub order_id: String,
    pub total_price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Attributes a completed checkout to the purchasing customer. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    pub store_id: String,
    pub customer_id: String,
    pub inventory_id: String,
    pub checkout_id: String,
    #[ts(as = "String")]
    pub transaction_date: DateTime<Utc>,
}

/// A transaction together with everything it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleDetails {
    pub transaction: Transaction,
    pub checkout: Checkout,
    pub order: Order,
    pub inventory: Inventory,
    pub customer: Customer,
    pub staff: Staff,
}

// =============================================================================
// Profit / Loss
// =============================================================================

/// Lifetime sales aggregate for one (store, inventory) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProfitLoss {
    pub id: String,
    pub store_id: String,
    pub inventory_id: String,
    pub total_quantity_sold: i64,
    /// Mirror of the inventory quantity at the last sync.
    pub quantity_remaining: i64,
    pub total_revenue_cents: i64,
    pub total_net_profit_cents: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl ProfitLoss {
    #[inline]
    pub fn total_revenue(&self) -> Money {
        Money::from_cents(self.total_revenue_cents)
    }

    #[inline]
    pub fn total_net_profit(&self) -> Money {
        Money::from_cents(self.total_net_profit_cents)
    }
}

/// A profit/loss row joined with its inventory item, for dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProfitLossReport {
    pub id: String,
    pub store_id: String,
    pub inventory_id: String,
    pub inventory_name: String,
    pub inventory_kind: InventoryKind,
    pub selling_price_cents: i64,
    pub cost_price_cents: i64,
    pub total_quantity_sold: i64,
    pub quantity_remaining: i64,
    pub total_revenue_cents: i64,
    pub total_net_profit_cents: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Store-wide totals across every profit/loss row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProfitLossSummary {
    pub store_id: String,
    pub item_count: i64,
    pub total_quantity_sold: i64,
    pub total_revenue_cents: i64,
    pub total_net_profit_cents: i64,
}

/// The amounts one sale contributes to its profit/loss row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleAmounts {
    pub quantity_sold: i64,
    pub revenue: Money,
    pub cost_basis: Money,
}

impl SaleAmounts {
    /// Prices a sale of `quantity` units of `item` at its current prices.
    ///
    /// Returns `None` if the totals would overflow.
    pub fn for_item(item: &Inventory, quantity: i64) -> Option<Self> {
        Some(SaleAmounts {
            quantity_sold: quantity,
            revenue: item.selling_price().checked_multiply_quantity(quantity)?,
            cost_basis: item.cost_price().checked_multiply_quantity(quantity)?,
        })
    }

    /// Largest quantity of `item` whose totals still fit in an `i64`.
    pub fn max_quantity(item: &Inventory) -> i64 {
        let unit = item.selling_price_cents.max(item.cost_price_cents).max(1);
        i64::MAX / unit
    }

    /// `revenue - cost_basis`; negative when sold below cost.
    #[inline]
    pub fn net_profit(&self) -> Money {
        self.revenue - self.cost_basis
    }
}

// =============================================================================
// Input payloads
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewBusiness {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Partial update. `None` leaves a field alone; an empty string clears an
/// optional field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct BusinessUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewStore {
    pub name: String,
    pub code: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct StoreUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    pub mobile_number: String,
    pub country_code: String,
    #[serde(default)]
    pub address: Option<String>,
    /// Only set when migrating existing records; normally allocated.
    #[serde(default)]
    pub customer_number: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub mobile_number: Option<String>,
    pub country_code: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewStaff {
    pub name: String,
    pub staff_number: String,
    pub mobile_number: String,
    pub country_code: String,
    #[serde(default)]
    pub pay_per_month_cents: i64,
    #[serde(default)]
    pub signed_contract: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct StaffUpdate {
    pub name: Option<String>,
    pub staff_number: Option<String>,
    pub mobile_number: Option<String>,
    pub country_code: Option<String>,
    pub pay_per_month_cents: Option<i64>,
    pub signed_contract: Option<bool>,
}

/// Inventory payload as received. `kind` stays a string until validated so
/// a bad value is reported as a field error rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewInventory {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub cost_price_cents: i64,
    pub selling_price_cents: i64,
    #[serde(default)]
    pub quantity: i64,
}

/// A validated [`NewInventory`].
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryDraft {
    pub name: String,
    pub kind: InventoryKind,
    pub cost_price_cents: i64,
    pub selling_price_cents: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct InventoryUpdate {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub cost_price_cents: Option<i64>,
    pub selling_price_cents: Option<i64>,
}

/// Request to sell `quantity` units of one item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleRequest {
    #[serde(default)]
    pub store_id: String,
    pub inventory_id: String,
    pub quantity: i64,
    pub staff_id: String,
    pub customer_id: String,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Bulk import results
// =============================================================================

/// One rejected row of a bulk import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ImportRowError {
    /// 1-based position of the row in the submitted batch.
    pub row: usize,
    pub message: String,
}

/// Outcome of a bulk import: every row is attempted independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ImportSummary {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<ImportRowError>,
}

impl ImportSummary {
    pub fn record_success(&mut self) {
        self.success += 1;
    }

    pub fn record_failure(&mut self, row: usize, message: impl Into<String>) {
        self.failed += 1;
        self.errors.push(ImportRowError {
            row,
            message: message.into(),
        });
    }

    /// Total rows attempted.
    pub fn total(&self) -> usize {
        self.success + self.failed
    }
}
