//! Cart normalization: the first stage of the checkout pipeline.
//!
//! Takes the raw, client-held cart and turns it into validated line items,
//! or rejects the whole request. Pure validation - no I/O happens here.

use serde::Deserialize;

use clementine_core::{Cents, Email, VariantId};

use super::CheckoutError;

/// One raw item in a checkout request, as sent by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutItem {
    /// Variant being purchased.
    pub id: VariantId,
    /// Requested quantity.
    pub quantity: u32,
    /// Unit price in cents.
    pub price: Cents,
    /// Display name shown on the payment page.
    pub name: String,
    /// Stripe product reference; empty means the item is not purchasable.
    #[serde(default)]
    pub stripe_product_id: String,
    /// Whether the item is digital (no shipping).
    pub is_digital: bool,
}

/// A validated, priceable line item.
///
/// Ephemeral: constructed per checkout request and discarded once the
/// payment session exists. The Order created by the webhook is the durable
/// record.
#[derive(Debug, Clone)]
pub struct CartLineItem {
    pub variant_id: VariantId,
    pub quantity: u32,
    pub unit_price: Cents,
    pub display_name: String,
    pub stripe_product_id: String,
    pub is_digital: bool,
}

/// A fully validated cart ready for shipping calculation.
#[derive(Debug, Clone)]
pub struct NormalizedCart {
    pub email: Email,
    pub lines: Vec<CartLineItem>,
}

impl NormalizedCart {
    /// Whether any line item carries a positive unit price.
    ///
    /// Free-item-only carts skip required billing address collection.
    #[must_use]
    pub fn has_paid_items(&self) -> bool {
        self.lines.iter().any(|line| line.unit_price.is_positive())
    }

    /// Whether any line item is physical and therefore needs shipping.
    #[must_use]
    pub fn requires_shipping(&self) -> bool {
        self.lines.iter().any(|line| !line.is_digital)
    }

    /// Variant ids of every line, in cart order.
    #[must_use]
    pub fn variant_ids(&self) -> Vec<VariantId> {
        self.lines.iter().map(|line| line.variant_id.clone()).collect()
    }
}

/// Validate a raw cart and customer email into a [`NormalizedCart`].
///
/// Fail-fast: if any item lacks a Stripe product reference the entire
/// request is rejected and every offending variant id is reported. A mixed
/// valid/invalid cart never produces a partial checkout.
///
/// # Errors
///
/// - [`CheckoutError::Validation`] for an empty cart, a zero quantity, a
///   negative price, or an unparseable email
/// - [`CheckoutError::ItemsNotPurchasable`] when any item has an empty
///   `stripe_product_id`, naming all offending items
pub fn normalize(items: Vec<CheckoutItem>, email: &str) -> Result<NormalizedCart, CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::Validation("cart is empty".to_string()));
    }

    let email = Email::parse(email)
        .map_err(|e| CheckoutError::Validation(format!("invalid email: {e}")))?;

    for item in &items {
        if item.quantity < 1 {
            return Err(CheckoutError::Validation(format!(
                "quantity must be at least 1 for variant {}",
                item.id
            )));
        }
        if item.price.is_negative() {
            return Err(CheckoutError::Validation(format!(
                "price must not be negative for variant {}",
                item.id
            )));
        }
    }

    // Collect every unpurchasable item before rejecting, so the client can
    // fix the whole cart in one pass.
    let not_purchasable: Vec<VariantId> = items
        .iter()
        .filter(|item| item.stripe_product_id.is_empty())
        .map(|item| item.id.clone())
        .collect();

    if !not_purchasable.is_empty() {
        return Err(CheckoutError::ItemsNotPurchasable {
            variant_ids: not_purchasable,
        });
    }

    let lines = items
        .into_iter()
        .map(|item| CartLineItem {
            variant_id: item.id,
            quantity: item.quantity,
            unit_price: item.price,
            display_name: item.name,
            stripe_product_id: item.stripe_product_id,
            is_digital: item.is_digital,
        })
        .collect();

    Ok(NormalizedCart { email, lines })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, price: i64, digital: bool) -> CheckoutItem {
        CheckoutItem {
            id: VariantId::new(id),
            quantity: 1,
            price: Cents::new(price),
            name: format!("Item {id}"),
            stripe_product_id: format!("prod_{id}"),
            is_digital: digital,
        }
    }

    #[test]
    fn test_normalize_valid_cart() {
        let cart = normalize(
            vec![item("v1", 1000, false), item("v2", 0, true)],
            "buyer@example.com",
        )
        .unwrap();

        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.email.as_str(), "buyer@example.com");
        assert!(cart.has_paid_items());
        assert!(cart.requires_shipping());
    }

    #[test]
    fn test_normalize_rejects_empty_cart() {
        let err = normalize(vec![], "buyer@example.com").unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
    }

    #[test]
    fn test_normalize_rejects_invalid_email() {
        let err = normalize(vec![item("v1", 100, true)], "not-an-email").unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
    }

    #[test]
    fn test_normalize_rejects_zero_quantity() {
        let mut bad = item("v1", 100, true);
        bad.quantity = 0;
        let err = normalize(vec![bad], "buyer@example.com").unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
    }

    #[test]
    fn test_missing_stripe_reference_rejects_whole_cart() {
        // Scenario C: one item with an empty reference poisons the request.
        let mut bad = item("v2", 500, false);
        bad.stripe_product_id = String::new();

        let err = normalize(
            vec![item("v1", 1000, false), bad, item("v3", 0, true)],
            "buyer@example.com",
        )
        .unwrap_err();

        match err {
            CheckoutError::ItemsNotPurchasable { variant_ids } => {
                assert_eq!(variant_ids, vec![VariantId::new("v2")]);
            }
            other => panic!("expected ItemsNotPurchasable, got {other:?}"),
        }
    }

    #[test]
    fn test_all_offending_items_are_named() {
        let mut bad1 = item("v1", 100, false);
        bad1.stripe_product_id = String::new();
        let mut bad2 = item("v2", 200, true);
        bad2.stripe_product_id = String::new();

        let err = normalize(vec![bad1, item("v3", 300, true), bad2], "a@b.c").unwrap_err();

        match err {
            CheckoutError::ItemsNotPurchasable { variant_ids } => {
                assert_eq!(
                    variant_ids,
                    vec![VariantId::new("v1"), VariantId::new("v2")]
                );
            }
            other => panic!("expected ItemsNotPurchasable, got {other:?}"),
        }
    }

    #[test]
    fn test_digital_only_cart_flags() {
        let cart = normalize(vec![item("v1", 0, true)], "buyer@example.com").unwrap();
        assert!(!cart.has_paid_items());
        assert!(!cart.requires_shipping());
    }
}
