//! Bulk import. The body is a JSON array of rows; the response is an
//! `ImportSummary` even when some rows fail.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use storekeep_core::ImportSummary;

use super::ApiJson;
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stores/:store_id/import/customers", post(customers))
        .route("/stores/:store_id/import/staff", post(staff))
        .route("/stores/:store_id/import/inventory", post(inventory))
}

async fn customers(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    ApiJson(rows): ApiJson<Vec<Value>>,
) -> ApiResult<Json<ImportSummary>> {
    Ok(Json(
        state.db.importer().import_customers(&store_id, rows).await?,
    ))
}

async fn staff(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    ApiJson(rows): ApiJson<Vec<Value>>,
) -> ApiResult<Json<ImportSummary>> {
    Ok(Json(state.db.importer().import_staff(&store_id, rows).await?))
}

async fn inventory(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    ApiJson(rows): ApiJson<Vec<Value>>,
) -> ApiResult<Json<ImportSummary>> {
    Ok(Json(
        state.db.importer().import_inventory(&store_id, rows).await?,
    ))
}
