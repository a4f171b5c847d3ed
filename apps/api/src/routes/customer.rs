//! Customers of one store. Numbers are allocated on create.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use storekeep_core::{Customer, CustomerUpdate, NewCustomer, SaleDetails};

use super::{ApiJson, ApiQuery, ListParams};
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stores/:store_id/customers", get(list).post(create))
        .route(
            "/stores/:store_id/customers/:customer_id",
            get(fetch).put(update),
        )
        .route(
            "/stores/:store_id/customers/:customer_id/archive",
            post(archive),
        )
        .route(
            "/stores/:store_id/customers/:customer_id/restore",
            post(restore),
        )
        .route(
            "/stores/:store_id/customers/:customer_id/sales",
            get(purchases),
        )
}

async fn create(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    ApiJson(payload): ApiJson<NewCustomer>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let customer = state.db.customers().create(&store_id, payload).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Vec<Customer>>> {
    let customers = state.db.customers();
    let list = if params.include_archived {
        customers.list_all(&store_id).await?
    } else {
        customers.list_active(&store_id).await?
    };
    Ok(Json(list))
}

async fn fetch(
    State(state): State<AppState>,
    Path((store_id, customer_id)): Path<(String, String)>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(state.db.customers().get(&store_id, &customer_id).await?))
}

async fn update(
    State(state): State<AppState>,
    Path((store_id, customer_id)): Path<(String, String)>,
    ApiJson(update): ApiJson<CustomerUpdate>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(
        state
            .db
            .customers()
            .update(&store_id, &customer_id, update)
            .await?,
    ))
}

async fn archive(
    State(state): State<AppState>,
    Path((store_id, customer_id)): Path<(String, String)>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(state.db.customers().archive(&store_id, &customer_id).await?))
}

async fn restore(
    State(state): State<AppState>,
    Path((store_id, customer_id)): Path<(String, String)>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(state.db.customers().restore(&store_id, &customer_id).await?))
}

/// Purchase history, newest first.
async fn purchases(
    State(state): State<AppState>,
    Path((store_id, customer_id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<SaleDetails>>> {
    Ok(Json(
        state
            .db
            .sales()
            .list_for_customer(&store_id, &customer_id)
            .await?,
    ))
}
