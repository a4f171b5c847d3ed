//! # HTTP Routes
//!
//! One module per resource. Handlers are thin: extract, call one
//! repository operation, wrap the result.
//!
//! ## Route Map
//! ```text
//! /health
//! /businesses ─────────────────────── business.rs
//!   /:business_id/stores ──────────── store.rs
//! /stores/:store_id
//!   /customers ────────────────────── customer.rs
//!   /staff ────────────────────────── staff.rs
//!   /inventory ────────────────────── inventory.rs
//!   /sales ────────────────────────── sale.rs
//!   /profit-loss ──────────────────── profit_loss.rs
//!   /import/{customers,staff,inventory} ── import.rs
//! ```

pub mod business;
pub mod customer;
pub mod health;
pub mod import;
pub mod inventory;
pub mod profit_loss;
pub mod sale;
pub mod staff;
pub mod store;

use axum::extract::{FromRequest, FromRequestParts, Query};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::ApiError;
use crate::AppState;

/// `Json` whose rejection is an [`ApiError`] body instead of plain text.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejection is an [`ApiError`] body instead of plain text.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// `?includeArchived=true` on customer and staff lists.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParams {
    pub include_archived: bool,
}

/// All resource routes, without state or middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(business::routes())
        .merge(store::routes())
        .merge(customer::routes())
        .merge(staff::routes())
        .merge(inventory::routes())
        .merge(sale::routes())
        .merge(profit_loss::routes())
        .merge(import::routes())
}
