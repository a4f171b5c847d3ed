//! # Sale Routes
//!
//! `POST /stores/:store_id/sales` runs the whole sale pipeline in one
//! request:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  body {inventoryId, quantity, staffId, customerId}                      │
//! │       │  storeId taken from the path, any body value is ignored         │
//! │       ▼                                                                 │
//! │  SaleRepository::record_sale                                            │
//! │       │  reserve stock → order → checkout → transaction → profit/loss   │
//! │       ▼                                                                 │
//! │  201 SaleDetails          or   409 INSUFFICIENT_STOCK / 404 / 422       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use storekeep_core::{SaleDetails, SaleRequest};

use super::ApiJson;
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stores/:store_id/sales", get(list).post(record))
        .route("/stores/:store_id/sales/:transaction_id", get(fetch))
}

async fn record(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    ApiJson(mut request): ApiJson<SaleRequest>,
) -> ApiResult<(StatusCode, Json<SaleDetails>)> {
    request.store_id = store_id;
    let sale = state.db.sales().record_sale(request).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> ApiResult<Json<Vec<SaleDetails>>> {
    Ok(Json(state.db.sales().list(&store_id).await?))
}

async fn fetch(
    State(state): State<AppState>,
    Path((store_id, transaction_id)): Path<(String, String)>,
) -> ApiResult<Json<SaleDetails>> {
    Ok(Json(state.db.sales().get(&store_id, &transaction_id).await?))
}
