//! Checkout session composition: the final checkout stage.
//!
//! Assembles the validated cart and computed shipping tiers into a single
//! `CreateSessionRequest`. Pure - the one outbound Stripe call happens in
//! the pipeline, not here.

use crate::checkout::cart::NormalizedCart;
use crate::checkout::shipping::ShippingTier;
use crate::stripe::types::{
    BillingAddressCollection, CreateSessionRequest, SessionLineItem, SessionShippingOption,
};

/// Metadata key read back by the webhook to decide whether a shipping
/// address is expected on the completed session.
pub const METADATA_REQUIRES_SHIPPING: &str = "requires_shipping";

/// Metadata key recording whether any line item carried a price.
pub const METADATA_HAS_PAID_ITEMS: &str = "has_paid_items";

/// Compose the payment-session request for a normalized cart.
///
/// - Billing address collection is `required` iff any item has a positive
///   price; free-item-only carts need no billing verification.
/// - Shipping address collection and shipping options appear iff `tiers`
///   is `Some`; digital-only carts omit both entirely.
/// - Automatic tax and phone-number collection are always enabled.
#[must_use]
pub fn compose(
    cart: &NormalizedCart,
    tiers: Option<&[ShippingTier; 3]>,
    base_url: &str,
) -> CreateSessionRequest {
    let has_paid_items = cart.has_paid_items();

    let billing_address_collection = if has_paid_items {
        BillingAddressCollection::Required
    } else {
        BillingAddressCollection::Auto
    };

    let line_items = cart
        .lines
        .iter()
        .map(|line| SessionLineItem {
            product: line.stripe_product_id.clone(),
            unit_amount: line.unit_price,
            quantity: line.quantity,
        })
        .collect();

    let shipping_options = tiers.map_or_else(Vec::new, |tiers| {
        tiers
            .iter()
            .map(|tier| SessionShippingOption {
                display_name: tier.name.to_string(),
                amount: tier.amount,
                min_delivery_days: tier.min_delivery_days,
                max_delivery_days: tier.max_delivery_days,
            })
            .collect()
    });

    CreateSessionRequest {
        customer_email: cart.email.as_str().to_string(),
        line_items,
        billing_address_collection,
        collect_shipping_address: tiers.is_some(),
        shipping_options,
        metadata: vec![
            (
                METADATA_REQUIRES_SHIPPING.to_string(),
                tiers.is_some().to_string(),
            ),
            (
                METADATA_HAS_PAID_ITEMS.to_string(),
                has_paid_items.to_string(),
            ),
        ],
        success_url: format!("{base_url}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}"),
        cancel_url: format!("{base_url}/shop"),
    }
}
