//! Admin route handlers.

pub mod categories;
pub mod orders;
pub mod products;
pub mod settings;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(products::list).post(products::create),
        )
        .route("/products/stats", get(products::stats))
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::destroy),
        )
        .route("/orders", get(orders::list))
        .route("/orders/{id}", get(orders::show))
        .route(
            "/settings/shipping",
            get(settings::show).put(settings::update),
        )
}
