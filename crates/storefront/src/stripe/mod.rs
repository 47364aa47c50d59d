//! Stripe API client for the storefront.
//!
//! # Architecture
//!
//! - Plain `reqwest` over Stripe's form-encoded REST API - no vendored SDK
//! - The storefront only touches the checkout-session slice of the API;
//!   catalog sync (products/prices) lives in the admin binary
//! - Webhook payloads are verified with the signing secret before any
//!   parsing happens
//!
//! # Example
//!
//! ```rust,ignore
//! use clementine_storefront::stripe::StripeClient;
//!
//! let client = StripeClient::new(&config.stripe);
//! let session = client.create_checkout_session(&request).await?;
//! // redirect the customer to session.url
//! ```

mod client;
pub mod types;
pub mod webhook;

pub use client::StripeClient;
pub use webhook::verify_signature;

use thiserror::Error;

/// Errors that can occur when interacting with the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe returned a structured API error.
    #[error("Stripe API error ({status}): {message}")]
    Api {
        /// Provider error message, safe to show to the caller.
        message: String,
        /// HTTP status Stripe responded with.
        status: u16,
    },

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A created session came back without a redirect URL.
    #[error("checkout session has no redirect URL")]
    MissingUrl,
}

impl StripeError {
    /// The HTTP-equivalent status to surface for this error.
    ///
    /// API errors pass the provider's status through; transport and parse
    /// failures are the provider being unreachable or unintelligible.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Api { status, .. } => *status,
            Self::Http(_) => 502,
            Self::Parse(_) | Self::MissingUrl => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = StripeError::Api {
            message: "No such product: prod_x".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Stripe API error (404): No such product: prod_x"
        );
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn test_missing_url_status() {
        assert_eq!(StripeError::MissingUrl.status(), 500);
    }
}
