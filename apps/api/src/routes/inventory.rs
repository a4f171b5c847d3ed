//! Inventory items and stock adjustments.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use storekeep_core::{Inventory, InventoryUpdate, NewInventory};

use super::ApiJson;
use crate::error::ApiResult;
use crate::AppState;

/// Body of `POST .../inventory/:inventory_id/stock`. Positive restocks,
/// negative writes off.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub delta: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stores/:store_id/inventory", get(list).post(create))
        .route(
            "/stores/:store_id/inventory/:inventory_id",
            get(fetch).put(update).delete(remove),
        )
        .route(
            "/stores/:store_id/inventory/:inventory_id/stock",
            post(adjust_stock),
        )
}

async fn create(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    ApiJson(payload): ApiJson<NewInventory>,
) -> ApiResult<(StatusCode, Json<Inventory>)> {
    let item = state.db.inventory().create(&store_id, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> ApiResult<Json<Vec<Inventory>>> {
    Ok(Json(state.db.inventory().list(&store_id).await?))
}

async fn fetch(
    State(state): State<AppState>,
    Path((store_id, inventory_id)): Path<(String, String)>,
) -> ApiResult<Json<Inventory>> {
    Ok(Json(state.db.inventory().get(&store_id, &inventory_id).await?))
}

async fn update(
    State(state): State<AppState>,
    Path((store_id, inventory_id)): Path<(String, String)>,
    ApiJson(update): ApiJson<InventoryUpdate>,
) -> ApiResult<Json<Inventory>> {
    Ok(Json(
        state
            .db
            .inventory()
            .update(&store_id, &inventory_id, update)
            .await?,
    ))
}

async fn adjust_stock(
    State(state): State<AppState>,
    Path((store_id, inventory_id)): Path<(String, String)>,
    ApiJson(body): ApiJson<StockAdjustment>,
) -> ApiResult<Json<Inventory>> {
    Ok(Json(
        state
            .db
            .inventory()
            .adjust_stock(&store_id, &inventory_id, body.delta)
            .await?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    Path((store_id, inventory_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state.db.inventory().delete(&store_id, &inventory_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
