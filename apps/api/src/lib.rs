//! # Storekeep API
//!
//! HTTP surface for the retail back office.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storekeep API Server                             │
//! │                                                                         │
//! │  Dashboard ───► HTTP (8080) ───► TraceLayer ───► routes ───► storekeep-db│
//! │                                                                   │     │
//! │                                                                   ▼     │
//! │                                                            SQLite (WAL) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! ```text
//! storekeep_api/
//! ├── lib.rs          ◄─── AppState, router assembly, tracing setup
//! ├── config.rs       ◄─── ApiConfig (file + STOREKEEP_* env)
//! ├── error.rs        ◄─── ApiError {code, message} + status mapping
//! └── routes/         ◄─── one module per resource
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `STOREKEEP_HOST` / `STOREKEEP_PORT` - bind address (default: 0.0.0.0:8080)
//! - `STOREKEEP_DATABASE_PATH` - SQLite file (default: storekeep.db)
//! - `STOREKEEP_MAX_CONNECTIONS` - pool size (default: 5)
//! - `STOREKEEP_BUSY_TIMEOUT_SECS` - SQLite busy timeout (default: 5)
//! - `STOREKEEP_LOG_FILTER` - log directives when `RUST_LOG` is unset

pub mod config;
pub mod error;
pub mod routes;

use axum::Router;
use storekeep_db::Database;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};

/// Shared application state.
///
/// `Database` is a cheap handle (pool + lock table), so cloning per request
/// is fine.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    routes::routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Installs the global tracing subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
