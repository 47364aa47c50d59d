//! Stripe webhook signature verification and event payloads.
//!
//! Implements Stripe's webhook signature scheme:
//! <https://docs.stripe.com/webhooks/signatures>
//!
//! The `Stripe-Signature` header carries a unix timestamp and one or more
//! HMAC-SHA256 signatures of `"{timestamp}.{raw_body}"` keyed with the
//! endpoint's signing secret. Verification must happen on the raw body
//! before any JSON parsing.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

/// The HTTP header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Tolerance for the signature timestamp, to limit replay attacks.
const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

/// Errors from webhook signature verification.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The signature header is malformed.
    #[error("invalid signature header: {0}")]
    InvalidHeader(String),

    /// The timestamp is outside the allowed tolerance.
    #[error("signature timestamp outside tolerance")]
    StaleTimestamp,

    /// No signature in the header matched the payload.
    #[error("signature mismatch")]
    SignatureMismatch,

    /// The event payload could not be parsed after verification.
    #[error("invalid event payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Verify a Stripe webhook signature against the raw request body.
///
/// # Arguments
///
/// * `secret` - The endpoint's signing secret (`whsec_...`)
/// * `header` - The `Stripe-Signature` header value
/// * `body` - The raw request body, exactly as received
///
/// # Errors
///
/// Returns an error if the header is malformed, the timestamp is older than
/// five minutes, or no `v1` signature matches.
pub fn verify_signature(
    secret: &SecretString,
    header: &str,
    body: &str,
) -> Result<(), WebhookError> {
    let (timestamp, signatures) = parse_signature_header(header)?;

    let now_secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| WebhookError::InvalidHeader(e.to_string()))?
        .as_secs();

    let now = i64::try_from(now_secs)
        .map_err(|_| WebhookError::InvalidHeader("system time overflow".to_string()))?;

    if (now - timestamp).abs() > TIMESTAMP_TOLERANCE_SECS {
        return Err(WebhookError::StaleTimestamp);
    }

    let expected = compute_signature(secret, timestamp, body)
        .map_err(WebhookError::InvalidHeader)?;

    if signatures
        .iter()
        .any(|candidate| constant_time_compare(&expected, candidate))
    {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

/// Compute the hex HMAC-SHA256 signature for a timestamped payload.
fn compute_signature(
    secret: &SecretString,
    timestamp: i64,
    body: &str,
) -> Result<String, String> {
    let signed_payload = format!("{timestamp}.{body}");

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|e| e.to_string())?;
    mac.update(signed_payload.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Parse `t=<unix>,v1=<hex>[,v1=<hex>...]` into a timestamp and signatures.
///
/// Unknown schemes (e.g. `v0`) are ignored, matching Stripe's guidance.
fn parse_signature_header(header: &str) -> Result<(i64, Vec<String>), WebhookError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            return Err(WebhookError::InvalidHeader(format!(
                "malformed element: {part}"
            )));
        };

        match key {
            "t" => {
                timestamp = Some(value.parse().map_err(|_| {
                    WebhookError::InvalidHeader(format!("invalid timestamp: {value}"))
                })?);
            }
            "v1" => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| WebhookError::InvalidHeader("missing timestamp".to_string()))?;

    if signatures.is_empty() {
        return Err(WebhookError::InvalidHeader(
            "missing v1 signature".to_string(),
        ));
    }

    Ok((timestamp, signatures))
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

// =============================================================================
// Event Payloads
// =============================================================================

/// A verified webhook event envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

/// The `data` wrapper of a webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    /// The event's subject object, left opaque until the type is known.
    pub object: serde_json::Value,
}

impl WebhookEvent {
    /// Parse an event from a verified raw body.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::InvalidPayload`] if the body is not a valid
    /// event envelope.
    pub fn parse(body: &str) -> Result<Self, WebhookError> {
        Ok(serde_json::from_str(body)?)
    }
}

/// The checkout session object carried by a `checkout.session.completed`
/// event, reduced to the fields the order record needs.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletedSession {
    pub id: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub amount_subtotal: Option<i64>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub total_details: Option<TotalDetails>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub customer_details: Option<super::types::CustomerDetails>,
    #[serde(default)]
    pub shipping_details: Option<ShippingDetails>,
    #[serde(default)]
    pub metadata: std::collections::BTreeMap<String, String>,
}

/// Tax and shipping totals on a completed session.
#[derive(Debug, Clone, Deserialize)]
pub struct TotalDetails {
    #[serde(default)]
    pub amount_tax: Option<i64>,
    #[serde(default)]
    pub amount_shipping: Option<i64>,
}

/// Shipping recipient collected on a completed session.
#[derive(Debug, Clone, Deserialize)]
pub struct ShippingDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<super::types::StripeAddress>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("whsec_test_secret".to_string())
    }

    fn now() -> i64 {
        i64::try_from(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("system time before epoch")
                .as_secs(),
        )
        .expect("timestamp fits i64")
    }

    fn sign(timestamp: i64, body: &str) -> String {
        compute_signature(&secret(), timestamp, body).unwrap()
    }

    #[test]
    fn test_verify_valid_signature() {
        let body = r#"{"id":"evt_1","type":"checkout.session.completed"}"#;
        let ts = now();
        let header = format!("t={ts},v1={}", sign(ts, body));

        assert!(verify_signature(&secret(), &header, body).is_ok());
    }

    #[test]
    fn test_verify_accepts_any_matching_v1() {
        let body = "payload";
        let ts = now();
        let header = format!("t={ts},v1=deadbeef,v1={}", sign(ts, body));

        assert!(verify_signature(&secret(), &header, body).is_ok());
    }

    #[test]
    fn test_verify_rejects_tampered_body() {
        let ts = now();
        let header = format!("t={ts},v1={}", sign(ts, "original"));

        let result = verify_signature(&secret(), &header, "tampered");
        assert!(matches!(result, Err(WebhookError::SignatureMismatch)));
    }

    #[test]
    fn test_verify_rejects_stale_timestamp() {
        let body = "payload";
        let ts = now() - 600;
        let header = format!("t={ts},v1={}", sign(ts, body));

        let result = verify_signature(&secret(), &header, body);
        assert!(matches!(result, Err(WebhookError::StaleTimestamp)));
    }

    #[test]
    fn test_verify_rejects_malformed_header() {
        let result = verify_signature(&secret(), "not-a-header", "payload");
        assert!(matches!(result, Err(WebhookError::InvalidHeader(_))));

        let result = verify_signature(&secret(), "t=notanumber,v1=abc", "payload");
        assert!(matches!(result, Err(WebhookError::InvalidHeader(_))));

        let result = verify_signature(&secret(), "t=123", "payload");
        assert!(matches!(result, Err(WebhookError::InvalidHeader(_))));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "ab"));
    }

    #[test]
    fn test_event_parse() {
        let body = r#"{
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {"object": {"id": "cs_test_1", "metadata": {}}}
        }"#;

        let event = WebhookEvent::parse(body).unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");

        let session: CompletedSession = serde_json::from_value(event.data.object).unwrap();
        assert_eq!(session.id, "cs_test_1");
    }

    #[test]
    fn test_completed_session_parses_totals_and_metadata() {
        let json = r#"{
            "id": "cs_test_2",
            "currency": "usd",
            "amount_subtotal": 2000,
            "amount_total": 2650,
            "total_details": {"amount_tax": 150, "amount_shipping": 500},
            "payment_status": "paid",
            "customer_details": {
                "email": "buyer@example.com",
                "name": "Buyer",
                "address": {"line1": "1 Main St", "city": "Portland", "state": "OR",
                            "postal_code": "97201", "country": "US"}
            },
            "shipping_details": {
                "name": "Buyer",
                "address": {"line1": "1 Main St", "city": "Portland", "state": "OR",
                            "postal_code": "97201", "country": "US"}
            },
            "metadata": {"requires_shipping": "true", "has_paid_items": "true"}
        }"#;

        let session: CompletedSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.amount_total, Some(2650));
        assert_eq!(
            session.total_details.as_ref().unwrap().amount_shipping,
            Some(500)
        );
        assert_eq!(
            session.metadata.get("requires_shipping").map(String::as_str),
            Some("true")
        );
    }
}
