//! Variant consistency guard.
//!
//! Every variant create/update passes through here before touching the
//! database. Two rules have teeth:
//!
//! - a variant can only go live with a non-empty Stripe product reference
//!   (rejected, pinned to the `stripe_product_id` field)
//! - `requires_shipping` is always derived from `is_digital`; callers
//!   cannot set the pair inconsistently because the derived value silently
//!   overwrites whatever was submitted

use thiserror::Error;

use crate::models::VariantInput;

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 256;

/// A validation failure pinned to a specific input field.
#[derive(Debug, Clone, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// The offending field, in the input's own naming.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Derive whether a variant needs shipping from its digital flag.
///
/// Pure and idempotent: digital goods never ship, physical goods always do.
#[must_use]
pub const fn derive_requires_shipping(is_digital: bool) -> bool {
    !is_digital
}

/// Validate a variant write.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming the first offending field. Setting
/// `is_live` without a Stripe product reference is the canonical rejection.
pub fn validate_variant(input: &VariantInput) -> Result<(), ValidationError> {
    if input.name.len() < NAME_MIN || input.name.len() > NAME_MAX {
        return Err(ValidationError::new(
            "name",
            format!("must be between {NAME_MIN} and {NAME_MAX} characters"),
        ));
    }

    if input.is_live
        && input
            .stripe_product_id
            .as_deref()
            .is_none_or(str::is_empty)
    {
        return Err(ValidationError::new(
            "stripe_product_id",
            "a Stripe product ID is required to make a variant live",
        ));
    }

    if input.price.is_negative() {
        return Err(ValidationError::new("price", "must not be negative"));
    }

    if input.stock < -1 {
        return Err(ValidationError::new(
            "stock",
            "must be -1 (unlimited) or a non-negative count",
        ));
    }

    for (field, value) in [
        ("weight", input.weight),
        ("length", input.length),
        ("width", input.width),
        ("height", input.height),
    ] {
        if value.is_some_and(|v| v < 0) {
            return Err(ValidationError::new(field, "must not be negative"));
        }
    }

    if input.flat_rate_shipping.is_some_and(|c| c.is_negative()) {
        return Err(ValidationError::new(
            "flat_rate_shipping",
            "must not be negative",
        ));
    }

    for image in &input.images {
        if image.url.is_empty() {
            return Err(ValidationError::new("images", "image url must not be empty"));
        }
        if image.title.len() < NAME_MIN || image.title.len() > NAME_MAX {
            return Err(ValidationError::new(
                "images",
                format!("image title must be between {NAME_MIN} and {NAME_MAX} characters"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::ImageInput;
    use clementine_core::Cents;
    use std::collections::BTreeMap;

    fn input() -> VariantInput {
        VariantInput {
            name: "Small / Blue".to_string(),
            description: None,
            price: Cents::new(1500),
            stock: -1,
            is_digital: false,
            is_live: false,
            stripe_product_id: None,
            attributes: BTreeMap::new(),
            images: Vec::new(),
            is_physical: true,
            weight: Some(250),
            length: None,
            width: None,
            height: None,
            flat_rate_shipping: Some(Cents::new(500)),
        }
    }

    #[test]
    fn test_valid_draft_variant_passes() {
        assert!(validate_variant(&input()).is_ok());
    }

    #[test]
    fn test_live_without_reference_is_rejected_on_the_field() {
        // Scenario E: is_live with an empty reference pins the error to
        // stripe_product_id.
        let mut live = input();
        live.is_live = true;
        live.stripe_product_id = Some(String::new());

        let err = validate_variant(&live).unwrap_err();
        assert_eq!(err.field, "stripe_product_id");

        live.stripe_product_id = None;
        let err = validate_variant(&live).unwrap_err();
        assert_eq!(err.field, "stripe_product_id");
    }

    #[test]
    fn test_live_with_reference_passes() {
        let mut live = input();
        live.is_live = true;
        live.stripe_product_id = Some("prod_abc".to_string());

        assert!(validate_variant(&live).is_ok());
    }

    #[test]
    fn test_name_length_bounds() {
        let mut short = input();
        short.name = "ab".to_string();
        assert_eq!(validate_variant(&short).unwrap_err().field, "name");

        let mut long = input();
        long.name = "x".repeat(257);
        assert_eq!(validate_variant(&long).unwrap_err().field, "name");
    }

    #[test]
    fn test_stock_sentinel_and_bounds() {
        let mut unlimited = input();
        unlimited.stock = -1;
        assert!(validate_variant(&unlimited).is_ok());

        let mut zero = input();
        zero.stock = 0;
        assert!(validate_variant(&zero).is_ok());

        let mut invalid = input();
        invalid.stock = -2;
        assert_eq!(validate_variant(&invalid).unwrap_err().field, "stock");
    }

    #[test]
    fn test_negative_dimensions_rejected() {
        let mut bad = input();
        bad.weight = Some(-1);
        assert_eq!(validate_variant(&bad).unwrap_err().field, "weight");
    }

    #[test]
    fn test_image_bounds() {
        let mut bad = input();
        bad.images = vec![ImageInput {
            url: String::new(),
            title: "Front view".to_string(),
            position: 0,
        }];
        assert_eq!(validate_variant(&bad).unwrap_err().field, "images");
    }

    #[test]
    fn test_derivation_is_idempotent() {
        // Applying the derivation twice always lands on the same answer.
        for is_digital in [true, false] {
            let once = derive_requires_shipping(is_digital);
            let twice = derive_requires_shipping(is_digital);
            assert_eq!(once, twice);
            assert_eq!(once, !is_digital);
        }
    }
}
