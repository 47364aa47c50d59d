//! Storefront route handlers.

pub mod checkout;
pub mod products;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the storefront router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list))
        .route("/products/{id}", get(products::show))
        .route("/checkout", post(checkout::create))
        .route("/checkout/session/{id}", get(checkout::session_status))
        .route("/webhooks/stripe", post(webhooks::stripe))
}
