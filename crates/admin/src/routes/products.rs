//! Product CRUD route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use clementine_core::ProductId;

use crate::error::Result;
use crate::models::{CatalogStats, CreateProductInput, Product, UpdateProductInput};
use crate::services::DeleteOutcome;
use crate::state::AppState;

/// List all products, drafts included.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.products().list().await?))
}

/// Fetch a single product.
#[instrument(skip(state), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(state.products().get(&id).await?))
}

/// Catalog-wide counts for the dashboard.
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Result<Json<CatalogStats>> {
    Ok(Json(state.products().stats().await?))
}

/// Create a product with its variants.
#[instrument(skip(state, input), fields(name = %input.name))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> Result<Json<Product>> {
    let product = state.catalog().create_product(input).await?;
    Ok(Json(product))
}

/// Update a product, replacing its variant set when one is submitted.
#[instrument(skip(state, input), fields(product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<UpdateProductInput>,
) -> Result<Json<Product>> {
    let product = state.catalog().update_product(&id, input).await?;
    Ok(Json(product))
}

/// Delete a product, reporting any provider deactivations that failed.
#[instrument(skip(state), fields(product_id = %id))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<DeleteOutcome>> {
    let outcome = state.catalog().delete_product(&id).await?;
    Ok(Json(outcome))
}
