//! # Bulk Import
//!
//! Creates many customers, staff members or inventory items from a batch of
//! JSON rows (parsed from an uploaded spreadsheet by the client).
//!
//! ## Row Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rows[0] ──► deserialize ──► repository.create() ──► success += 1     │
//! │  rows[1] ──► deserialize ✗ ───────────────────────► errors += {2, …}   │
//! │  rows[2] ──► deserialize ──► repository.create() ✗ ► errors += {3, …}  │
//! │                                                                         │
//! │  Each row goes through the same create() as a single request, with    │
//! │  its own transaction. A bad row never blocks the good ones and never   │
//! │  leaves half a record behind.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Row numbers in the summary are 1-based positions in the batch. Internal
//! failures (SQL errors, pool trouble) are logged in full and reported to the
//! client only as a generic message.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, error, info};

use crate::error::{DbResult, ErrorKind};
use crate::pool::Database;
use storekeep_core::{ImportSummary, NewCustomer, NewInventory, NewStaff};

/// Bulk import adapter over the per-entity repositories.
#[derive(Debug, Clone)]
pub struct Importer {
    db: Database,
}

impl Importer {
    pub fn new(db: Database) -> Self {
        Importer { db }
    }

    /// Imports customers. Rows without `customerNumber` get the next
    /// counter value, in row order.
    ///
    /// ## Errors
    /// Only `NotFound` for an unknown store; row failures go in the summary.
    pub async fn import_customers(&self, store_id: &str, rows: Vec<Value>) -> DbResult<ImportSummary> {
        self.db.stores().get_by_id(store_id).await?;
        let customers = self.db.customers();

        let summary = import_rows(rows, |payload: NewCustomer| {
            let customers = customers.clone();
            async move { customers.create(store_id, payload).await.map(|_| ()) }
        })
        .await;

        log_summary("customers", store_id, &summary);
        Ok(summary)
    }

    /// Imports staff members.
    pub async fn import_staff(&self, store_id: &str, rows: Vec<Value>) -> DbResult<ImportSummary> {
        self.db.stores().get_by_id(store_id).await?;
        let staff = self.db.staff();

        let summary = import_rows(rows, |payload: NewStaff| {
            let staff = staff.clone();
            async move { staff.create(store_id, payload).await.map(|_| ()) }
        })
        .await;

        log_summary("staff", store_id, &summary);
        Ok(summary)
    }

    /// Imports inventory items.
    pub async fn import_inventory(&self, store_id: &str, rows: Vec<Value>) -> DbResult<ImportSummary> {
        self.db.stores().get_by_id(store_id).await?;
        let inventory = self.db.inventory();

        let summary = import_rows(rows, |payload: NewInventory| {
            let inventory = inventory.clone();
            async move { inventory.create(store_id, payload).await.map(|_| ()) }
        })
        .await;

        log_summary("inventory", store_id, &summary);
        Ok(summary)
    }
}

/// Summary message for rows that failed on an internal error.
const INTERNAL_ROW_ERROR: &str = "Internal server error";

/// Runs `create` for every row in order and tallies the outcome.
async fn import_rows<T, F, Fut>(rows: Vec<Value>, mut create: F) -> ImportSummary
where
    T: DeserializeOwned,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = DbResult<()>>,
{
    let mut summary = ImportSummary::default();

    for (index, row) in rows.into_iter().enumerate() {
        let row_number = index + 1;

        let payload = match serde_json::from_value::<T>(row) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(row = row_number, error = %e, "Import row malformed");
                summary.record_failure(row_number, e.to_string());
                continue;
            }
        };

        match create(payload).await {
            Ok(()) => summary.record_success(),
            Err(e) if e.kind() == ErrorKind::Internal => {
                error!(row = row_number, error = %e, "Import row failed");
                summary.record_failure(row_number, INTERNAL_ROW_ERROR.to_string());
            }
            Err(e) => {
                debug!(row = row_number, error = %e, "Import row rejected");
                summary.record_failure(row_number, e.to_string());
            }
        }
    }

    summary
}

fn log_summary(entity: &str, store_id: &str, summary: &ImportSummary) {
    info!(
        entity,
        store_id = %store_id,
        success = summary.success,
        failed = summary.failed,
        "Bulk import finished"
    );
}
