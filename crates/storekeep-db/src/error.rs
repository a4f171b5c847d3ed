//! # Database Error Types
//!
//! Error types for database operations and their mapping onto the
//! five-way error taxonomy every caller sees.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError (storekeep-core)      SQLite Error (sqlx::Error)      │
//! │       │                                      │                          │
//! │       └──────────────┬───────────────────────┘                          │
//! │                      ▼                                                  │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError::kind() → Validation | Conflict | NotFound                    │
//! │                    | InsufficientStock | Internal                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (apps/api) ← {code, message} + HTTP status                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use storekeep_core::{CoreError, ValidationError};
use thiserror::Error;

/// The category of a failure, independent of where it happened.
///
/// Callers branch on this rather than on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input failed a field rule. Not retryable without changing input.
    Validation,
    /// A uniqueness rule, a delete restriction or lock contention.
    Conflict,
    /// A referenced entity is absent or belongs to another tenant.
    NotFound,
    /// A product sale asked for more units than are on hand.
    InsufficientStock,
    /// Anything else. Detail is logged, never shown to clients.
    Internal,
}

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - ID doesn't exist
    /// - Row exists but is owned by another store or business
    /// - Customer or staff is archived and a sale tries to use them
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate store code or name within a business
    /// - Customer number or staff number already held in the store
    /// - Inventory name already used in the store
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a store that does not exist
    /// - Deleting a row that still has dependents (RESTRICT)
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Input failed validation before any SQL ran.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Not enough stock to complete a product sale.
    ///
    /// ## When This Occurs
    /// ```text
    /// UPDATE inventory ... WHERE quantity >= ?q   → 0 rows
    ///      │
    ///      ▼
    /// re-read: item exists with quantity 97, requested 200
    ///      │
    ///      ▼
    /// InsufficientStock { item: "Widget", available: 97, requested: 200 }
    /// ```
    #[error("Insufficient stock for {item}: available {available}, requested {requested}")]
    InsufficientStock {
        item: String,
        available: i64,
        requested: i64,
    },

    /// The database stayed locked for longer than the busy timeout.
    ///
    /// Retryable.
    #[error("Database is busy, retry the operation")]
    Busy,

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Fills in the offending value of a UniqueViolation parsed from SQLite,
    /// which only reports the columns.
    pub fn with_duplicate_value(self, value: impl Into<String>) -> Self {
        match self {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: value.into(),
            },
            other => other,
        }
    }

    /// Maps this error onto the caller-facing taxonomy.
    ///
    /// ```text
    /// Validation                              → Validation
    /// UniqueViolation, ForeignKeyViolation,
    /// Busy                                    → Conflict
    /// NotFound                                → NotFound
    /// InsufficientStock                       → InsufficientStock
    /// everything else                         → Internal
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Validation(_) => ErrorKind::Validation,
            DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } | DbError::Busy => {
                ErrorKind::Conflict
            }
            DbError::NotFound { .. } => ErrorKind::NotFound,
            DbError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::TransactionFailed(_)
            | DbError::PoolExhausted
            | DbError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the same request may succeed if simply retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::Busy | DbError::PoolExhausted)
    }
}

/// Turns `"UNIQUE constraint failed: stores.business_id, stores.code"` into
/// `"(business_id, code)"`, or `"store_id"` for a single column.
fn unique_fields(message: &str) -> String {
    let columns: Vec<&str> = message
        .split("UNIQUE constraint failed: ")
        .nth(1)
        .unwrap_or("unknown")
        .split(',')
        .map(|col| col.trim())
        .map(|col| col.rsplit('.').next().unwrap_or(col))
        .collect();

    if columns.len() == 1 {
        columns[0].to_string()
    } else {
        format!("({})", columns.join(", "))
    }
}

/// SQLITE_BUSY (5), SQLITE_LOCKED (6) and their extended codes.
fn is_busy(code: Option<&str>, message: &str) -> bool {
    matches!(code, Some("5") | Some("6") | Some("261") | Some("262") | Some("517"))
        || message.contains("database is locked")
        || message.contains("database table is locked")
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type / busy
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                let code = db_err.code();

                if msg.contains("UNIQUE constraint failed") {
                    DbError::UniqueViolation {
                        field: unique_fields(msg),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if is_busy(code.as_deref(), msg) {
                    DbError::Busy
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => DbError::Validation(e),
            CoreError::InsufficientStock {
                item,
                available,
                requested,
            } => DbError::InsufficientStock {
                item,
                available,
                requested,
            },
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
