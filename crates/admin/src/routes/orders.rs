//! Order view route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use clementine_core::OrderId;

use crate::db::orders::OrderFilter;
use crate::error::Result;
use crate::models::Order;
use crate::state::AppState;

/// Query parameters for the order listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// List orders, newest first, optionally filtered by customer email.
#[instrument(skip(state, params))]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Order>>> {
    let filter = OrderFilter {
        query: params.query,
        limit: params.limit,
        offset: params.offset,
    };

    Ok(Json(state.orders().list(&filter).await?))
}

/// Fetch a single order.
#[instrument(skip(state), fields(order_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    Ok(Json(state.orders().get(&id).await?))
}
