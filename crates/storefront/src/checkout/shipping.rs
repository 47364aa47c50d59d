//! Shipping eligibility and tier calculation: the second checkout stage.
//!
//! Decides whether the cart needs a shipping address at all, and derives the
//! three rate tiers offered on the payment page from the cart's base
//! flat-rate cost.

use serde::{Deserialize, Serialize};

use clementine_core::Cents;

use super::CheckoutError;
use crate::checkout::cart::NormalizedCart;
use crate::models::VariantShipping;

/// Surcharge over the base cost for express shipping.
pub const EXPRESS_SURCHARGE: Cents = Cents::new(1000);

/// Surcharge over the base cost for next-day air.
pub const NEXT_DAY_SURCHARGE: Cents = Cents::new(2500);

/// A customer-supplied shipping address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// One shipping option offered at checkout. Computed, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingTier {
    pub name: &'static str,
    pub amount: Cents,
    pub min_delivery_days: u32,
    pub max_delivery_days: u32,
}

/// The base flat-rate shipping cost of a cart.
///
/// Summed over distinct variant lines, NOT multiplied by quantity: a line
/// with quantity 3 contributes its flat rate once (see DESIGN.md).
#[must_use]
pub fn base_shipping_cost(variants: &[VariantShipping]) -> Cents {
    variants
        .iter()
        .map(|v| v.flat_rate_shipping.unwrap_or(Cents::ZERO))
        .sum()
}

/// Derive the three shipping tiers for a given base cost, cheapest first.
#[must_use]
pub fn shipping_tiers(base: Cents) -> [ShippingTier; 3] {
    [
        ShippingTier {
            name: "Standard Shipping",
            amount: base,
            min_delivery_days: 5,
            max_delivery_days: 7,
        },
        ShippingTier {
            name: "Express Shipping",
            amount: base + EXPRESS_SURCHARGE,
            min_delivery_days: 2,
            max_delivery_days: 4,
        },
        ShippingTier {
            name: "Next Day Air",
            amount: base + NEXT_DAY_SURCHARGE,
            min_delivery_days: 1,
            max_delivery_days: 1,
        },
    ]
}

/// Decide shipping applicability for a cart and produce the tier set.
///
/// Returns `None` when no line item is physical - the session then omits
/// shipping address collection and shipping options entirely.
///
/// # Errors
///
/// Returns [`CheckoutError::MissingShippingAddress`] when the cart contains
/// physical items but no address was supplied.
pub fn plan(
    cart: &NormalizedCart,
    variants: &[VariantShipping],
    address: Option<&ShippingAddress>,
) -> Result<Option<[ShippingTier; 3]>, CheckoutError> {
    if !cart.requires_shipping() {
        return Ok(None);
    }

    if address.is_none() {
        return Err(CheckoutError::MissingShippingAddress);
    }

    Ok(Some(shipping_tiers(base_shipping_cost(variants))))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::checkout::cart::{CheckoutItem, normalize};
    use clementine_core::VariantId;

    fn variant(id: &str, flat_rate: Option<i64>) -> VariantShipping {
        VariantShipping {
            id: VariantId::new(id),
            price: Cents::new(1000),
            stock: -1,
            is_digital: false,
            requires_shipping: true,
            flat_rate_shipping: flat_rate.map(Cents::new),
            stripe_product_id: Some(format!("prod_{id}")),
            is_live: true,
        }
    }

    fn cart(items: Vec<(&str, i64, bool)>) -> NormalizedCart {
        let items = items
            .into_iter()
            .map(|(id, price, digital)| CheckoutItem {
                id: VariantId::new(id),
                quantity: 2,
                price: Cents::new(price),
                name: id.to_string(),
                stripe_product_id: format!("prod_{id}"),
                is_digital: digital,
            })
            .collect();
        normalize(items, "buyer@example.com").unwrap()
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            line1: "1 Main St".to_string(),
            line2: None,
            city: "Portland".to_string(),
            state: "OR".to_string(),
            postal_code: "97201".to_string(),
            country: "US".to_string(),
        }
    }

    #[test]
    fn test_base_cost_sums_per_line_not_per_unit() {
        // Quantity is 2 on every line, but the flat rate counts once per line.
        let variants = vec![variant("v1", Some(500)), variant("v2", Some(300))];
        assert_eq!(base_shipping_cost(&variants), Cents::new(800));
    }

    #[test]
    fn test_base_cost_treats_missing_rate_as_zero() {
        let variants = vec![variant("v1", Some(500)), variant("v2", None)];
        assert_eq!(base_shipping_cost(&variants), Cents::new(500));
    }

    #[test]
    fn test_tiers_ascend_with_fixed_surcharges() {
        let tiers = shipping_tiers(Cents::new(500));

        assert_eq!(tiers[0].amount, Cents::new(500));
        assert_eq!(tiers[1].amount, Cents::new(1500));
        assert_eq!(tiers[2].amount, Cents::new(3000));
        assert!(tiers[0].amount < tiers[1].amount);
        assert!(tiers[1].amount < tiers[2].amount);
    }

    #[test]
    fn test_tier_delivery_windows() {
        let tiers = shipping_tiers(Cents::ZERO);

        assert_eq!(tiers[0].name, "Standard Shipping");
        assert_eq!((tiers[0].min_delivery_days, tiers[0].max_delivery_days), (5, 7));
        assert_eq!(tiers[1].name, "Express Shipping");
        assert_eq!((tiers[1].min_delivery_days, tiers[1].max_delivery_days), (2, 4));
        assert_eq!(tiers[2].name, "Next Day Air");
        assert_eq!((tiers[2].min_delivery_days, tiers[2].max_delivery_days), (1, 1));
    }

    #[test]
    fn test_physical_cart_with_address_gets_three_tiers() {
        // Scenario A: one physical item, flat rate 500 -> tiers 500/1500/3000.
        let cart = cart(vec![("v1", 1000, false)]);
        let variants = vec![variant("v1", Some(500))];

        let tiers = plan(&cart, &variants, Some(&address())).unwrap().unwrap();
        let amounts: Vec<i64> = tiers.iter().map(|t| t.amount.as_i64()).collect();
        assert_eq!(amounts, vec![500, 1500, 3000]);
    }

    #[test]
    fn test_physical_cart_without_address_fails() {
        // Scenario D: physical cart, no address supplied.
        let cart = cart(vec![("v1", 1000, false)]);
        let variants = vec![variant("v1", Some(500))];

        let err = plan(&cart, &variants, None).unwrap_err();
        assert!(matches!(err, CheckoutError::MissingShippingAddress));
    }

    #[test]
    fn test_digital_cart_produces_no_tiers() {
        // Scenario B: digital-only carts skip shipping entirely, with or
        // without an address supplied.
        let cart = cart(vec![("v1", 0, true)]);

        assert!(plan(&cart, &[], None).unwrap().is_none());
        assert!(plan(&cart, &[], Some(&address())).unwrap().is_none());
    }

    #[test]
    fn test_mixed_cart_requires_shipping() {
        let cart = cart(vec![("v1", 500, true), ("v2", 700, false)]);
        let variants = vec![variant("v2", Some(250))];

        let tiers = plan(&cart, &variants, Some(&address())).unwrap().unwrap();
        assert_eq!(tiers[0].amount, Cents::new(250));
    }
}
