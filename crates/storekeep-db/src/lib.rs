//! # storekeep-db: Database Layer for Storekeep
//!
//! Persistence and every multi-row write of the system: entity storage,
//! customer number allocation, the sale pipeline and profit/loss
//! aggregation. SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storekeep Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /stores/{id}/sales)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   storekeep-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ StoreRepo     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CustomerRepo  │    │ 001_initial_ │  │   │
//! │  │   │ KeyedLocks    │    │ SaleRepo      │    │   schema.sql │  │   │
//! │  │   │               │    │ ProfitLossRepo│    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                              ▲                                  │   │
//! │  │                        ┌─────┴─────┐                            │   │
//! │  │                        │ Importer  │ bulk rows → create()       │   │
//! │  │                        └───────────┘                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types and the error taxonomy
//! - [`locks`] - Per-key write serialization
//! - [`repository`] - Repository implementations
//! - [`import`] - Bulk import adapter
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storekeep_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("storekeep.db")).await?;
//!
//! let sale = db.sales().record_sale(request).await?;
//! let report = db.profit_loss().list(&store_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod import;
pub mod locks;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ErrorKind};
pub use import::Importer;
pub use locks::KeyedLocks;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::business::BusinessRepository;
pub use repository::counter::CounterRepository;
pub use repository::customer::CustomerRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::profit_loss::ProfitLossRepository;
pub use repository::sale::SaleRepository;
pub use repository::staff::StaffRepository;
pub use repository::store::StoreRepository;
