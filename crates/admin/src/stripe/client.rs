//! Stripe catalog API client.
//!
//! Keeps the payment provider's catalog in step with the local one: every
//! variant gets a Stripe product (and a price per price change), and
//! deleted variants are deactivated rather than deleted, since Stripe
//! products referenced by past payments cannot be removed.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use clementine_core::Cents;

use super::StripeError;
use super::types::{ApiErrorResponse, ProductFields, StripePrice, StripeProduct, price_form};
use crate::config::StripeConfig;

/// Client for the product/price slice of the Stripe API.
#[derive(Clone)]
pub struct StripeClient {
    inner: Arc<StripeClientInner>,
}

struct StripeClientInner {
    client: reqwest::Client,
    api_base: String,
    secret_key: SecretString,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("api_base", &self.inner.api_base)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

impl StripeClient {
    /// Create a new Stripe client.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            inner: Arc::new(StripeClientInner {
                client: reqwest::Client::new(),
                api_base: config.api_base.clone(),
                secret_key: config.secret_key.clone(),
            }),
        }
    }

    /// Create a product in Stripe's catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::Api`] with Stripe's message and status on a
    /// non-2xx response.
    #[instrument(skip(self, fields), fields(name = %fields.name))]
    pub async fn create_product(
        &self,
        fields: &ProductFields,
    ) -> Result<StripeProduct, StripeError> {
        let url = format!("{}/v1/products", self.inner.api_base);
        let product: StripeProduct = self.post_form(&url, &fields.to_form()).await?;

        debug!(product_id = %product.id, "Stripe product created");
        Ok(product)
    }

    /// Update an existing Stripe product's display fields.
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::Api`] on a non-2xx response (404 for an
    /// unknown product id).
    #[instrument(skip(self, fields), fields(product_id = %product_id))]
    pub async fn update_product(
        &self,
        product_id: &str,
        fields: &ProductFields,
    ) -> Result<StripeProduct, StripeError> {
        let url = format!("{}/v1/products/{product_id}", self.inner.api_base);
        self.post_form(&url, &fields.to_form()).await
    }

    /// Mark a Stripe product inactive.
    ///
    /// Used instead of deletion: the product stops being purchasable but
    /// stays referenceable from past sessions.
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::Api`] on a non-2xx response.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn deactivate_product(&self, product_id: &str) -> Result<(), StripeError> {
        let url = format!("{}/v1/products/{product_id}", self.inner.api_base);
        let form = vec![("active".to_string(), "false".to_string())];
        let _: StripeProduct = self.post_form(&url, &form).await?;

        debug!("Stripe product deactivated");
        Ok(())
    }

    /// Create a price for a product.
    ///
    /// Prices are immutable in Stripe; a price change appends a new one.
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::Api`] on a non-2xx response.
    #[instrument(skip(self), fields(product_id = %product_id, unit_amount = unit_amount.as_i64()))]
    pub async fn create_price(
        &self,
        product_id: &str,
        unit_amount: Cents,
    ) -> Result<StripePrice, StripeError> {
        let url = format!("{}/v1/prices", self.inner.api_base);
        self.post_form(&url, &price_form(product_id, unit_amount))
            .await
    }

    /// POST a form and decode the response, mapping non-2xx statuses to
    /// [`StripeError::Api`] with the provider's own message.
    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<T, StripeError> {
        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(self.inner.secret_key.expose_secret())
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| format!("HTTP {status}"));

            tracing::error!(
                status = %status,
                message = %message,
                "Stripe API returned an error"
            );

            return Err(StripeError::Api {
                message,
                status: status.as_u16(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
