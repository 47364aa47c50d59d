//! The checkout pipeline: cart normalization, shipping calculation, and
//! payment-session composition.
//!
//! # Stages
//!
//! Within one request the stages run strictly in order, each consuming the
//! validated output of the previous one:
//!
//! 1. [`cart::normalize`] - validate and flatten the client cart
//! 2. variant resolution through [`CatalogReader`] - the only database read
//! 3. [`shipping::plan`] - eligibility and tier derivation
//! 4. [`session::compose`] + one Stripe call - the only outbound request
//!
//! The pipeline holds no state across requests and performs no local
//! writes; the durable Order is created later by the webhook handler once
//! Stripe confirms the session. Stock is NOT reserved or decremented here,
//! so concurrent checkouts of a limited-stock variant can oversell (see
//! DESIGN.md).

pub mod cart;
pub mod session;
pub mod shipping;

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use clementine_core::VariantId;

use crate::db::RepositoryError;
use crate::models::VariantShipping;
use crate::stripe::{StripeClient, StripeError};

pub use cart::{CartLineItem, CheckoutItem, NormalizedCart};
pub use shipping::{ShippingAddress, ShippingTier};

/// Read-side catalog access the pipeline depends on.
///
/// The pipeline never sees the storage engine; the Postgres implementation
/// lives in `db::catalog`.
pub trait CatalogReader {
    /// Fetch the shipping-relevant slice of the given variants.
    ///
    /// Unknown ids are simply absent from the result.
    fn variants_shipping(
        &self,
        ids: &[VariantId],
    ) -> impl Future<Output = Result<Vec<VariantShipping>, RepositoryError>> + Send;
}

/// A checkout request as received from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    pub email: String,
}

/// Errors produced by the checkout pipeline.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Malformed or incomplete input; never retried.
    #[error("invalid checkout request: {0}")]
    Validation(String),

    /// One or more items lack a Stripe product reference.
    #[error("items not available for purchase: {}", format_ids(.variant_ids))]
    ItemsNotPurchasable { variant_ids: Vec<VariantId> },

    /// Physical items present but no shipping address supplied.
    #[error("shipping address is required for physical items")]
    MissingShippingAddress,

    /// Referenced variants do not exist in the catalog.
    #[error("no variants found for the selected items: {}", format_ids(.variant_ids))]
    UnknownVariants { variant_ids: Vec<VariantId> },

    /// Catalog read failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The payment provider rejected or failed the session request.
    #[error("payment session error: {0}")]
    PaymentSession(#[from] StripeError),
}

fn format_ids(ids: &[VariantId]) -> String {
    ids.iter()
        .map(VariantId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run the full checkout pipeline and return the payment redirect URL.
///
/// One outbound Stripe call per invocation; a retry after any failure is a
/// brand-new session. Nothing is written locally on any path through this
/// function.
///
/// # Errors
///
/// Propagates every stage's error unchanged; see [`CheckoutError`].
#[instrument(skip(catalog, stripe, request), fields(item_count = request.items.len()))]
pub async fn create_checkout_session(
    catalog: &impl CatalogReader,
    stripe: &StripeClient,
    base_url: &str,
    request: CheckoutRequest,
) -> Result<String, CheckoutError> {
    let cart = cart::normalize(request.items, &request.email)?;

    let variant_ids = cart.variant_ids();
    let variants = catalog.variants_shipping(&variant_ids).await?;

    if variants.is_empty() {
        return Err(CheckoutError::UnknownVariants {
            variant_ids,
        });
    }

    let tiers = shipping::plan(&cart, &variants, request.shipping_address.as_ref())?;

    let session_request = session::compose(&cart, tiers.as_ref(), base_url);
    let session = stripe.create_checkout_session(&session_request).await?;

    session
        .url
        .ok_or(CheckoutError::PaymentSession(StripeError::MissingUrl))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_items_not_purchasable_lists_ids() {
        let err = CheckoutError::ItemsNotPurchasable {
            variant_ids: vec![VariantId::new("v1"), VariantId::new("v2")],
        };
        assert_eq!(
            err.to_string(),
            "items not available for purchase: v1, v2"
        );
    }

    #[test]
    fn test_unknown_variants_lists_ids() {
        let err = CheckoutError::UnknownVariants {
            variant_ids: vec![VariantId::new("v9")],
        };
        assert_eq!(err.to_string(), "no variants found for the selected items: v9");
    }
}
