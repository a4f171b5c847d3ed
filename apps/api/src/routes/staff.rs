//! Staff members of one store.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use storekeep_core::{NewStaff, Staff, StaffUpdate};

use super::{ApiJson, ApiQuery, ListParams};
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stores/:store_id/staff", get(list).post(create))
        .route("/stores/:store_id/staff/:staff_id", get(fetch).put(update))
        .route("/stores/:store_id/staff/:staff_id/archive", post(archive))
        .route("/stores/:store_id/staff/:staff_id/restore", post(restore))
}

async fn create(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    ApiJson(payload): ApiJson<NewStaff>,
) -> ApiResult<(StatusCode, Json<Staff>)> {
    let staff = state.db.staff().create(&store_id, payload).await?;
    Ok((StatusCode::CREATED, Json(staff)))
}

async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Vec<Staff>>> {
    let staff = state.db.staff();
    let list = if params.include_archived {
        staff.list_all(&store_id).await?
    } else {
        staff.list_active(&store_id).await?
    };
    Ok(Json(list))
}

async fn fetch(
    State(state): State<AppState>,
    Path((store_id, staff_id)): Path<(String, String)>,
) -> ApiResult<Json<Staff>> {
    Ok(Json(state.db.staff().get(&store_id, &staff_id).await?))
}

async fn update(
    State(state): State<AppState>,
    Path((store_id, staff_id)): Path<(String, String)>,
    ApiJson(update): ApiJson<StaffUpdate>,
) -> ApiResult<Json<Staff>> {
    Ok(Json(
        state.db.staff().update(&store_id, &staff_id, update).await?,
    ))
}

async fn archive(
    State(state): State<AppState>,
    Path((store_id, staff_id)): Path<(String, String)>,
) -> ApiResult<Json<Staff>> {
    Ok(Json(state.db.staff().archive(&store_id, &staff_id).await?))
}

async fn restore(
    State(state): State<AppState>,
    Path((store_id, staff_id)): Path<(String, String)>,
) -> ApiResult<Json<Staff>> {
    Ok(Json(state.db.staff().restore(&store_id, &staff_id).await?))
}
