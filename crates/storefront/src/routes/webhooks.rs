//! Stripe webhook receiver.
//!
//! Verifies the signature on the raw body before any parsing, then records
//! an Order for `checkout.session.completed` events. All other event types
//! are acknowledged and logged. Stripe redelivers events until it sees a
//! 2xx, so order insertion is idempotent on the session id.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{info, instrument, warn};

use clementine_core::{Cents, PaymentStatus};

use crate::db::orders::NewOrder;
use crate::state::AppState;
use crate::stripe::types::StripeAddress;
use crate::stripe::webhook::{self, CompletedSession, WebhookEvent};

/// Handle a Stripe webhook delivery.
#[instrument(skip(state, headers, body))]
pub async fn stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let Some(signature) = headers
        .get(webhook::SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
    else {
        return error_response(StatusCode::BAD_REQUEST, "Missing stripe-signature header");
    };

    if let Err(e) = webhook::verify_signature(
        &state.config().stripe.webhook_secret,
        signature,
        &body,
    ) {
        warn!(error = %e, "Webhook signature verification failed");
        return error_response(
            StatusCode::BAD_REQUEST,
            "Webhook signature verification failed",
        );
    }

    let event = match WebhookEvent::parse(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Webhook payload did not parse");
            return error_response(StatusCode::BAD_REQUEST, "Invalid event payload");
        }
    };

    match event.event_type.as_str() {
        "checkout.session.completed" => {
            if let Err(response) = handle_session_completed(&state, event).await {
                return response;
            }
        }
        other => {
            info!(event_type = %other, event_id = %event.id, "Unhandled event type");
        }
    }

    (StatusCode::OK, Json(json!({ "received": true }))).into_response()
}

/// Record an order for a completed session.
///
/// Unusable payloads are logged and acknowledged so Stripe stops
/// redelivering them; database failures return 500 so Stripe retries.
async fn handle_session_completed(state: &AppState, event: WebhookEvent) -> Result<(), Response> {
    let session: CompletedSession = match serde_json::from_value(event.data.object) {
        Ok(session) => session,
        Err(e) => {
            warn!(event_id = %event.id, error = %e, "Completed session did not parse");
            return Ok(());
        }
    };

    let Some(order) = build_order(&session) else {
        warn!(
            session_id = %session.id,
            "Completed session has no customer email, skipping order"
        );
        return Ok(());
    };

    match state.orders().record_completed_session(&order).await {
        Ok(true) => {
            info!(session_id = %session.id, "Order created from webhook");
            Ok(())
        }
        Ok(false) => {
            info!(session_id = %session.id, "Order already existed");
            Ok(())
        }
        Err(e) => {
            sentry::capture_error(&e);
            tracing::error!(session_id = %session.id, error = %e, "Failed to record order");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to record order",
            ))
        }
    }
}

/// Shape a completed session into an order row.
///
/// Returns `None` when the session carries no customer email - there is no
/// order to attribute without a customer.
fn build_order(session: &CompletedSession) -> Option<NewOrder> {
    let details = session.customer_details.as_ref()?;
    let email = details.email.clone()?;

    let requires_shipping = session
        .metadata
        .get("requires_shipping")
        .is_some_and(|v| v == "true");

    let shipping = session.shipping_details.as_ref();
    let shipping_address = shipping.and_then(|s| s.address.as_ref());
    let billing_address = details.address.as_ref();

    let payment_status = session
        .payment_status
        .as_deref()
        .and_then(|s| s.parse::<PaymentStatus>().ok())
        .unwrap_or_default();

    Some(NewOrder {
        stripe_session_id: session.id.clone(),
        customer_email: email,
        customer_name: details.name.clone().unwrap_or_default(),
        customer_phone: details.phone.clone(),
        requires_shipping,
        shipping_name: shipping.and_then(|s| s.name.clone()),
        shipping_address_line1: field(shipping_address, |a| &a.line1),
        shipping_address_line2: field(shipping_address, |a| &a.line2),
        shipping_city: field(shipping_address, |a| &a.city),
        shipping_state: field(shipping_address, |a| &a.state),
        shipping_postal_code: field(shipping_address, |a| &a.postal_code),
        shipping_country: field(shipping_address, |a| &a.country),
        billing_address_line1: field(billing_address, |a| &a.line1),
        billing_address_line2: field(billing_address, |a| &a.line2),
        billing_city: field(billing_address, |a| &a.city),
        billing_state: field(billing_address, |a| &a.state),
        billing_postal_code: field(billing_address, |a| &a.postal_code),
        billing_country: field(billing_address, |a| &a.country),
        currency: session.currency.clone().unwrap_or_else(|| "usd".to_string()),
        amount_subtotal: Cents::new(session.amount_subtotal.unwrap_or(0)),
        amount_total: Cents::new(session.amount_total.unwrap_or(0)),
        amount_tax: Cents::new(
            session
                .total_details
                .as_ref()
                .and_then(|t| t.amount_tax)
                .unwrap_or(0),
        ),
        amount_shipping: Cents::new(
            session
                .total_details
                .as_ref()
                .and_then(|t| t.amount_shipping)
                .unwrap_or(0),
        ),
        payment_status,
        metadata: serde_json::to_value(&session.metadata).unwrap_or(serde_json::Value::Null),
    })
}

fn field(
    address: Option<&StripeAddress>,
    pick: impl Fn(&StripeAddress) -> &Option<String>,
) -> Option<String> {
    address.and_then(|a| pick(a).clone())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
