//! Stripe Checkout API client.
//!
//! Creates and retrieves checkout sessions. Requests are form-encoded per
//! Stripe's conventions; authentication is a bearer secret key.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use super::StripeError;
use super::types::{ApiErrorResponse, CheckoutSession, CreateSessionRequest};
use crate::config::StripeConfig;

/// Client for the checkout-session slice of the Stripe API.
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

    /// Create a checkout session.
    ///
    /// One outbound call per checkout attempt; retries are the caller's
    /// decision and always produce a brand-new session.
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::Api`] with Stripe's message and status on a
    /// non-2xx response, [`StripeError::MissingUrl`] when the created
    /// session has no redirect URL.
    #[instrument(skip(self, request), fields(line_items = request.line_items.len()))]
    pub async fn create_checkout_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<CheckoutSession, StripeError> {
        let url = format!("{}/v1/checkout/sessions", self.inner.api_base);

        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(self.inner.secret_key.expose_secret())
            .form(&request.to_form())
            .send()
            .await?;

        let session: CheckoutSession = read_response(response).await?;

        debug!(session_id = %session.id, "Checkout session created");

        Ok(session)
    }

    /// Retrieve an existing checkout session by id.
    ///
    /// Used by the success page to confirm payment status.
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::Api`] on a non-2xx response (404 for an
    /// unknown session id).
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, StripeError> {
        let url = format!(
            "{}/v1/checkout/sessions/{session_id}",
            self.inner.api_base
        );

        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(self.inner.secret_key.expose_secret())
            .send()
            .await?;

        read_response(response).await
    }
}

/// Decode a Stripe response, mapping non-2xx statuses to
/// [`StripeError::Api`] with the provider's own message.
async fn read_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, StripeError> {
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
