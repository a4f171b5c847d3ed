//! Business (tenant root) CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use storekeep_core::{Business, BusinessUpdate, NewBusiness};

use super::ApiJson;
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/businesses", get(list).post(create))
        .route("/businesses/:business_id", get(fetch).put(update).delete(remove))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewBusiness>,
) -> ApiResult<(StatusCode, Json<Business>)> {
    let business = state.db.businesses().create(payload).await?;
    Ok((StatusCode::CREATED, Json(business)))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Business>>> {
    Ok(Json(state.db.businesses().list().await?))
}

async fn fetch(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
) -> ApiResult<Json<Business>> {
    Ok(Json(state.db.businesses().get(&business_id).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    ApiJson(update): ApiJson<BusinessUpdate>,
) -> ApiResult<Json<Business>> {
    Ok(Json(state.db.businesses().update(&business_id, update).await?))
}

async fn remove(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.businesses().delete(&business_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
