//! Stripe catalog client for the admin binary.
//!
//! # Architecture
//!
//! - Plain `reqwest` over Stripe's form-encoded REST API
//! - The admin binary only touches the catalog slice (products and prices);
//!   checkout sessions and webhooks live in the storefront
//! - Stripe prices are immutable, so a price change always appends a new
//!   price to the product

mod client;
pub mod types;

pub use client::StripeClient;

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
}

impl StripeError {
    /// The HTTP-equivalent status to surface for this error.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Api { status, .. } => *status,
            Self::Http(_) => 502,
            Self::Parse(_) => 500,
        }
    }
}
