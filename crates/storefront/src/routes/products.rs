//! Product catalog route handlers.
//!
//! The storefront only ever serves live products; draft catalog entries are
//! visible through the admin API alone.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use clementine_core::ProductId;

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;

/// List live products, newest first.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().list_live_products().await?;
    Ok(Json(products))
}

/// Fetch a single live product.
#[instrument(skip(state), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = state
        .catalog()
        .get_live_product(&id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("product {id}")),
            other => AppError::Database(other),
        })?;

    Ok(Json(product))
}
