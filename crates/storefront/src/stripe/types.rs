//! Request and response types for the Stripe Checkout API.
//!
//! Stripe's API takes form-encoded bodies with bracketed nested keys
//! (`line_items[0][price_data][unit_amount]`), so requests are modeled as
//! plain structs with an explicit [`CreateSessionRequest::to_form`] encoder
//! rather than serde serialization.

use serde::Deserialize;

use clementine_core::Cents;

/// Currency for all line items and shipping rates.
pub const CURRENCY: &str = "usd";

/// Stripe tax code for shipping charges.
pub const SHIPPING_TAX_CODE: &str = "txcd_92010001";

/// Countries shipping addresses may be collected from.
pub const ALLOWED_SHIPPING_COUNTRIES: &[&str] = &["US", "CA"];

/// How aggressively Stripe collects a billing address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingAddressCollection {
    /// Billing address is mandatory (carts with priced items).
    Required,
    /// Stripe decides; address is optional (free-item-only carts).
    Auto,
}

impl BillingAddressCollection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Auto => "auto",
        }
    }
}

/// One line item in a checkout session request.
#[derive(Debug, Clone)]
pub struct SessionLineItem {
    /// Stripe product id the price is attached to.
    pub product: String,
    /// Unit amount in minor currency units.
    pub unit_amount: Cents,
    pub quantity: u32,
}

/// One fixed-amount shipping option in a checkout session request.
#[derive(Debug, Clone)]
pub struct SessionShippingOption {
    pub display_name: String,
    pub amount: Cents,
    pub min_delivery_days: u32,
    pub max_delivery_days: u32,
}

/// A fully-composed "create checkout session" request.
///
/// Construction happens in `checkout::session`; this type only knows how to
/// encode itself for the wire.
#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    pub customer_email: String,
    pub line_items: Vec<SessionLineItem>,
    pub billing_address_collection: BillingAddressCollection,
    /// `Some` iff the cart requires shipping; `None` omits both the address
    /// collection and the shipping options from the request entirely.
    pub collect_shipping_address: bool,
    pub shipping_options: Vec<SessionShippingOption>,
    pub metadata: Vec<(String, String)>,
    pub success_url: String,
    pub cancel_url: String,
}

impl CreateSessionRequest {
    /// Encode the request as form key/value pairs in Stripe's bracketed style.
    #[must_use]
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            (
                "payment_method_types[0]".to_string(),
                "card".to_string(),
            ),
            ("customer_email".to_string(), self.customer_email.clone()),
            (
                "billing_address_collection".to_string(),
                self.billing_address_collection.as_str().to_string(),
            ),
        ];

        for (i, item) in self.line_items.iter().enumerate() {
            form.push((
                format!("line_items[{i}][price_data][currency]"),
                CURRENCY.to_string(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product]"),
                item.product.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.unit_amount.as_i64().to_string(),
            ));
            form.push((
                format!("line_items[{i}][price_data][tax_behavior]"),
                "exclusive".to_string(),
            ));
            form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }

        if self.collect_shipping_address {
            for (i, country) in ALLOWED_SHIPPING_COUNTRIES.iter().enumerate() {
                form.push((
                    format!("shipping_address_collection[allowed_countries][{i}]"),
                    (*country).to_string(),
                ));
            }

            for (i, option) in self.shipping_options.iter().enumerate() {
                let prefix = format!("shipping_options[{i}][shipping_rate_data]");
                form.push((format!("{prefix}[type]"), "fixed_amount".to_string()));
                form.push((
                    format!("{prefix}[fixed_amount][amount]"),
                    option.amount.as_i64().to_string(),
                ));
                form.push((
                    format!("{prefix}[fixed_amount][currency]"),
                    CURRENCY.to_string(),
                ));
                form.push((
                    format!("{prefix}[display_name]"),
                    option.display_name.clone(),
                ));
                form.push((format!("{prefix}[tax_behavior]"), "exclusive".to_string()));
                form.push((
                    format!("{prefix}[tax_code]"),
                    SHIPPING_TAX_CODE.to_string(),
                ));
                form.push((
                    format!("{prefix}[delivery_estimate][minimum][unit]"),
                    "business_day".to_string(),
                ));
                form.push((
                    format!("{prefix}[delivery_estimate][minimum][value]"),
                    option.min_delivery_days.to_string(),
                ));
                form.push((
                    format!("{prefix}[delivery_estimate][maximum][unit]"),
                    "business_day".to_string(),
                ));
                form.push((
                    format!("{prefix}[delivery_estimate][maximum][value]"),
                    option.max_delivery_days.to_string(),
                ));
            }
        }

        form.push(("automatic_tax[enabled]".to_string(), "true".to_string()));
        form.push((
            "phone_number_collection[enabled]".to_string(),
            "true".to_string(),
        ));

        for (key, value) in &self.metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }

        form.push(("success_url".to_string(), self.success_url.clone()));
        form.push(("cancel_url".to_string(), self.cancel_url.clone()));

        form
    }
}

// =============================================================================
// Responses
// =============================================================================

/// A Stripe checkout session, as returned by create and retrieve.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Redirect URL the customer completes payment at. Absent once the
    /// session is no longer open.
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
}

/// Customer contact details collected on a session.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<StripeAddress>,
}

/// An address object as Stripe returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeAddress {
    #[serde(default)]
    pub line1: Option<String>,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Error payload Stripe returns on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// The inner error object of an [`ApiErrorResponse`].
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(shipping: bool) -> CreateSessionRequest {
        CreateSessionRequest {
            customer_email: "buyer@example.com".to_string(),
            line_items: vec![SessionLineItem {
                product: "prod_123".to_string(),
                unit_amount: Cents::new(1000),
                quantity: 2,
            }],
            billing_address_collection: BillingAddressCollection::Required,
            collect_shipping_address: shipping,
            shipping_options: if shipping {
                vec![SessionShippingOption {
                    display_name: "Standard Shipping".to_string(),
                    amount: Cents::new(500),
                    min_delivery_days: 5,
                    max_delivery_days: 7,
                }]
            } else {
                Vec::new()
            },
            metadata: vec![
                ("requires_shipping".to_string(), shipping.to_string()),
                ("has_paid_items".to_string(), "true".to_string()),
            ],
            success_url: "http://localhost:3000/checkout/success?session_id={CHECKOUT_SESSION_ID}"
                .to_string(),
            cancel_url: "http://localhost:3000/shop".to_string(),
        }
    }

    fn get<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_form_encodes_line_items_with_bracketed_keys() {
        let form = request(true).to_form();

        assert_eq!(get(&form, "mode"), Some("payment"));
        assert_eq!(get(&form, "payment_method_types[0]"), Some("card"));
        assert_eq!(
            get(&form, "line_items[0][price_data][product]"),
            Some("prod_123")
        );
        assert_eq!(
            get(&form, "line_items[0][price_data][unit_amount]"),
            Some("1000")
        );
        assert_eq!(
            get(&form, "line_items[0][price_data][tax_behavior]"),
            Some("exclusive")
        );
        assert_eq!(get(&form, "line_items[0][quantity]"), Some("2"));
    }

    #[test]
    fn test_form_includes_shipping_when_collecting() {
        let form = request(true).to_form();

        assert_eq!(
            get(&form, "shipping_address_collection[allowed_countries][0]"),
            Some("US")
        );
        assert_eq!(
            get(&form, "shipping_address_collection[allowed_countries][1]"),
            Some("CA")
        );
        assert_eq!(
            get(&form, "shipping_options[0][shipping_rate_data][type]"),
            Some("fixed_amount")
        );
        assert_eq!(
            get(
                &form,
                "shipping_options[0][shipping_rate_data][fixed_amount][amount]"
            ),
            Some("500")
        );
        assert_eq!(
            get(&form, "shipping_options[0][shipping_rate_data][tax_code]"),
            Some(SHIPPING_TAX_CODE)
        );
        assert_eq!(
            get(
                &form,
                "shipping_options[0][shipping_rate_data][delivery_estimate][minimum][value]"
            ),
            Some("5")
        );
        assert_eq!(
            get(
                &form,
                "shipping_options[0][shipping_rate_data][delivery_estimate][maximum][unit]"
            ),
            Some("business_day")
        );
    }

    #[test]
    fn test_form_omits_shipping_keys_entirely_for_digital_carts() {
        let form = request(false).to_form();

        assert!(
            form.iter()
                .all(|(k, _)| !k.starts_with("shipping_address_collection")
                    && !k.starts_with("shipping_options"))
        );
    }

    #[test]
    fn test_form_always_enables_tax_and_phone_collection() {
        let form = request(false).to_form();

        assert_eq!(get(&form, "automatic_tax[enabled]"), Some("true"));
        assert_eq!(get(&form, "phone_number_collection[enabled]"), Some("true"));
    }

    #[test]
    fn test_form_carries_metadata() {
        let form = request(true).to_form();

        assert_eq!(get(&form, "metadata[requires_shipping]"), Some("true"));
        assert_eq!(get(&form, "metadata[has_paid_items]"), Some("true"));
    }

    #[test]
    fn test_error_response_parses() {
        let json = r#"{"error":{"message":"No such product: prod_x","type":"invalid_request_error","code":"resource_missing"}}"#;
        let parsed: ApiErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.error.message.as_deref(),
            Some("No such product: prod_x")
        );
        assert_eq!(parsed.error.code.as_deref(), Some("resource_missing"));
    }
}
