//! # storekeep-core: Pure Business Logic for Storekeep
//!
//! Domain types, integer money, validation rules and domain errors for a
//! multi-tenant retail back office. Zero I/O: everything here is
//! deterministic and testable without a database.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storekeep Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Dashboard client (tables, charts)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                         apps/api                                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ storekeep-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   error   │  │ validation│  │   │
//! │  │   │  Store    │  │   Money   │  │ CoreError │  │   rules   │  │   │
//! │  │   │  Order    │  │           │  │           │  │  payloads │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  storekeep-db (Database Layer)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities, payloads and report rows
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules and payload normalization
//!
//! ## Example Usage
//!
//! ```rust
//! use storekeep_core::money::Money;
//!
//! let selling_price = Money::from_cents(2500);
//! let total = selling_price.multiply_quantity(3);
//! assert_eq!(total.cents(), 7500);
//! ```

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

/// Largest customer number a store will record, explicit or allocated.
///
/// Keeps the store counter (always one past the highest number) an integer.
pub const MAX_CUSTOMER_NUMBER: i64 = 999_999_999_999;

/// Maximum length for free-text names (business, store, customer, item).
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of a store code.
pub const MAX_STORE_CODE_LENGTH: usize = 16;
