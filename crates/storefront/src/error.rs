//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::db::RepositoryError;
use crate::stripe::StripeError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Checkout pipeline rejected the request or failed downstream.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Stripe API operation failed outside the checkout pipeline.
    #[error("Stripe error: {0}")]
    Stripe(#[from] StripeError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is a server-side fault worth capturing to Sentry.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Internal(_) => true,
            Self::Stripe(e) => e.status() >= 500,
            Self::Checkout(e) => matches!(
                e,
                CheckoutError::Repository(_) | CheckoutError::PaymentSession(_)
            ),
            Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Stripe(e) => provider_status(e),
            Self::Checkout(e) => match e {
                CheckoutError::Validation(_)
                | CheckoutError::ItemsNotPurchasable { .. }
                | CheckoutError::MissingShippingAddress => StatusCode::BAD_REQUEST,
                CheckoutError::UnknownVariants { .. } => StatusCode::NOT_FOUND,
                CheckoutError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
                CheckoutError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
                CheckoutError::PaymentSession(stripe) => provider_status(stripe),
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// The message returned to the client.
    ///
    /// Recoverable client errors get enough detail to correct the request;
    /// internal faults and provider transport errors stay generic. Stripe
    /// API messages pass through - they are the provider's client-facing
    /// wording, not SDK internals.
    fn client_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Stripe(e) => provider_message(e),
            Self::Checkout(e) => match e {
                CheckoutError::Repository(_) => "Internal server error".to_string(),
                CheckoutError::PaymentSession(stripe) => provider_message(stripe),
                other => other.to_string(),
            },
            Self::NotFound(_) | Self::BadRequest(_) => self.to_string(),
        }
    }
}

/// HTTP status to surface for a Stripe failure.
fn provider_status(error: &StripeError) -> StatusCode {
    StatusCode::from_u16(error.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Client-safe message for a Stripe failure.
fn provider_message(error: &StripeError) -> String {
    match error {
        StripeError::Api { message, .. } => message.clone(),
        _ => "An unexpected error occurred with the payment system".to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status_code();
        let body = Json(json!({ "error": self.client_message() }));

        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
