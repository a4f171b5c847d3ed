//! Profit/loss dashboards.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use storekeep_core::{ProfitLossReport, ProfitLossSummary};

use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stores/:store_id/profit-loss", get(list))
        .route("/stores/:store_id/profit-loss/summary", get(summary))
}

/// Per-item rows, most profitable first.
async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> ApiResult<Json<Vec<ProfitLossReport>>> {
    Ok(Json(state.db.profit_loss().list(&store_id).await?))
}

async fn summary(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> ApiResult<Json<ProfitLossSummary>> {
    Ok(Json(state.db.profit_loss().summary(&store_id).await?))
}
