//! Stores, always addressed under their owning business.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use storekeep_core::{NewStore, Store, StoreUpdate};

use super::ApiJson;
use crate::error::ApiResult;
use crate::AppState;

/// Body of `POST /businesses/:business_id/stores/:store_id/active`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActive {
    pub active: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/businesses/:business_id/stores", get(list).post(create))
        .route(
            "/businesses/:business_id/stores/:store_id",
            get(fetch).put(update).delete(remove),
        )
        .route(
            "/businesses/:business_id/stores/:store_id/active",
            post(set_active),
        )
}

async fn create(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    ApiJson(payload): ApiJson<NewStore>,
) -> ApiResult<(StatusCode, Json<Store>)> {
    let store = state.db.stores().create(&business_id, payload).await?;
    Ok((StatusCode::CREATED, Json(store)))
}

async fn list(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
) -> ApiResult<Json<Vec<Store>>> {
    Ok(Json(state.db.stores().list(&business_id).await?))
}

async fn fetch(
    State(state): State<AppState>,
    Path((business_id, store_id)): Path<(String, String)>,
) -> ApiResult<Json<Store>> {
    Ok(Json(state.db.stores().get(&business_id, &store_id).await?))
}

async fn update(
    State(state): State<AppState>,
    Path((business_id, store_id)): Path<(String, String)>,
    ApiJson(update): ApiJson<StoreUpdate>,
) -> ApiResult<Json<Store>> {
    Ok(Json(
        state.db.stores().update(&business_id, &store_id, update).await?,
    ))
}

async fn set_active(
    State(state): State<AppState>,
    Path((business_id, store_id)): Path<(String, String)>,
    ApiJson(body): ApiJson<SetActive>,
) -> ApiResult<Json<Store>> {
    Ok(Json(
        state
            .db
            .stores()
            .set_active(&business_id, &store_id, body.active)
            .await?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    Path((business_id, store_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state.db.stores().delete(&business_id, &store_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
