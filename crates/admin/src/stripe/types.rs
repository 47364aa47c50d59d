//! Request and response types for Stripe's product and price endpoints.

use serde::Deserialize;

use clementine_core::Cents;

/// Currency for all catalog prices.
pub const CURRENCY: &str = "usd";

/// A Stripe product object, reduced to the fields the catalog sync uses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeProduct {
    pub id: String,
    #[serde(default)]
    pub active: bool,
}

/// A Stripe price object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripePrice {
    pub id: String,
    #[serde(default)]
    pub unit_amount: Option<i64>,
}

/// Fields for creating or updating a Stripe product.
#[derive(Debug, Clone)]
pub struct ProductFields {
    pub name: String,
    pub description: Option<String>,
    /// Image URLs in display order.
    pub images: Vec<String>,
}

impl ProductFields {
    /// Encode as form pairs in Stripe's bracketed style.
    #[must_use]
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![("name".to_string(), self.name.clone())];

        if let Some(description) = &self.description {
            form.push(("description".to_string(), description.clone()));
        }

        for (i, url) in self.images.iter().enumerate() {
            form.push((format!("images[{i}]"), url.clone()));
        }

        form
    }
}

/// Form pairs for creating a price on a product.
#[must_use]
pub fn price_form(product_id: &str, unit_amount: Cents) -> Vec<(String, String)> {
    vec![
        ("product".to_string(), product_id.to_string()),
        ("unit_amount".to_string(), unit_amount.as_i64().to_string()),
        ("currency".to_string(), CURRENCY.to_string()),
    ]
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

    #[test]
    fn test_product_fields_form() {
        let fields = ProductFields {
            name: "Tea Towel - Small".to_string(),
            description: Some("Linen tea towel".to_string()),
            images: vec![
                "https://img.example.com/1.jpg".to_string(),
                "https://img.example.com/2.jpg".to_string(),
            ],
        };

        let form = fields.to_form();

        assert!(form.contains(&("name".to_string(), "Tea Towel - Small".to_string())));
        assert!(form.contains(&(
            "images[1]".to_string(),
            "https://img.example.com/2.jpg".to_string()
        )));
    }

    #[test]
    fn test_product_fields_form_omits_missing_description() {
        let fields = ProductFields {
            name: "Tea Towel".to_string(),
            description: None,
            images: Vec::new(),
        };

        assert!(fields.to_form().iter().all(|(k, _)| k != "description"));
    }

    #[test]
    fn test_price_form() {
        let form = price_form("prod_123", Cents::new(1500));

        assert_eq!(
            form,
            vec![
                ("product".to_string(), "prod_123".to_string()),
                ("unit_amount".to_string(), "1500".to_string()),
                ("currency".to_string(), "usd".to_string()),
            ]
        );
    }
}
