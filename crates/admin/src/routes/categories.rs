//! Category CRUD route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use clementine_core::CategoryId;

use crate::error::Result;
use crate::models::{Category, CreateCategoryInput, UpdateCategoryInput};
use crate::state::AppState;

/// List all categories, newest first.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.categories().list().await?))
}

/// Fetch a single category.
#[instrument(skip(state), fields(category_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>> {
    Ok(Json(state.categories().get(&id).await?))
}

/// Create a category.
#[instrument(skip(state, input), fields(name = %input.name))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryInput>,
) -> Result<Json<Category>> {
    Ok(Json(state.categories().create(&input).await?))
}

/// Update a category.
#[instrument(skip(state, input), fields(category_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(input): Json<UpdateCategoryInput>,
) -> Result<Json<Category>> {
    Ok(Json(state.categories().update(&id, &input).await?))
}

/// Delete a category.
#[instrument(skip(state), fields(category_id = %id))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    state.categories().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
