//! Shipping settings route handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::db::settings::SHIPMENT_GROUPING_DAYS_RANGE;
use crate::error::{AppError, Result};
use crate::models::{SiteSettings, UpdateShippingSettingsInput};
use crate::state::AppState;

/// Fetch the shipping settings (defaults when never written).
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<SiteSettings>> {
    Ok(Json(state.settings().shipping_settings().await?))
}

/// Update the shipment grouping window.
#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Json(input): Json<UpdateShippingSettingsInput>,
) -> Result<Json<SiteSettings>> {
    if !SHIPMENT_GROUPING_DAYS_RANGE.contains(&input.shipment_grouping_days) {
        return Err(AppError::BadRequest(format!(
            "shipment_grouping_days must be between {} and {}",
            SHIPMENT_GROUPING_DAYS_RANGE.start(),
            SHIPMENT_GROUPING_DAYS_RANGE.end()
        )));
    }

    let settings = state
        .settings()
        .update_shipment_grouping_days(input.shipment_grouping_days)
        .await?;

    Ok(Json(settings))
}
