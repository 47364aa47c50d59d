//! Checkout route handlers.
//!
//! `POST /checkout` runs the full pipeline and hands back the Stripe
//! redirect URL; the caller is responsible for sending the customer there.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use crate::checkout::{self, CheckoutRequest};
use crate::error::Result;
use crate::state::AppState;

/// Successful checkout response: where to send the customer.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// Session status as shown on the success page.
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub status: Option<String>,
    pub customer_email: Option<String>,
}

/// Create a payment session for the submitted cart.
#[instrument(skip(state, request), fields(item_count = request.items.len()))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let url = checkout::create_checkout_session(
        state.catalog(),
        state.stripe(),
        &state.config().base_url,
        request,
    )
    .await?;

    Ok(Json(CheckoutResponse { url }))
}

/// Look up a checkout session's status for the success page.
#[instrument(skip(state), fields(session_id = %session_id))]
pub async fn session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatusResponse>> {
    let session = state
        .stripe()
        .retrieve_checkout_session(&session_id)
        .await?;

    Ok(Json(SessionStatusResponse {
        status: session.status,
        customer_email: session.customer_details.and_then(|d| d.email),
    }))
}
