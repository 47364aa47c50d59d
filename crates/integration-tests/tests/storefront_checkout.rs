//! Integration tests for the storefront checkout API.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running (cargo run -p clementine-storefront)
//! - A Stripe test key for the happy path
//!
//! Run with: cargo test -p clementine-integration-tests -- --ignored

use clementine_integration_tests::storefront_base_url;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

fn checkout_item(id: &str, price: i64, stripe_product_id: &str, is_digital: bool) -> Value {
    json!({
        "id": id,
        "quantity": 1,
        "price": price,
        "name": format!("Item {id}"),
        "stripe_product_id": stripe_product_id,
        "is_digital": is_digital,
    })
}

fn shipping_address() -> Value {
    json!({
        "line1": "1 Main St",
        "city": "Portland",
        "state": "OR",
        "postal_code": "97201",
        "country": "US",
    })
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health_endpoints() {
    let base_url = storefront_base_url();
    let client = Client::new();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Checkout validation (no Stripe credentials needed - rejected before the
// provider call)
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_rejects_items_without_stripe_reference() {
    let base_url = storefront_base_url();
    let client = Client::new();

    let resp = client
        .post(format!("{base_url}/checkout"))
        .json(&json!({
            "items": [
                checkout_item("variant-ok", 1000, "prod_ok", true),
                checkout_item("variant-missing", 500, "", true),
            ],
            "email": "buyer@example.com",
        }))
        .send()
        .await
        .expect("Failed to post checkout");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("Failed to read error body");
    let error = body["error"].as_str().expect("error message missing");
    // The whole request is rejected and the offending id is named.
    assert!(error.contains("variant-missing"));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_rejects_physical_cart_without_address() {
    let base_url = storefront_base_url();
    let client = Client::new();

    let resp = client
        .post(format!("{base_url}/checkout"))
        .json(&json!({
            "items": [checkout_item("variant-1", 1000, "prod_1", false)],
            "email": "buyer@example.com",
        }))
        .send()
        .await
        .expect("Failed to post checkout");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("Failed to read error body");
    assert!(
        body["error"]
            .as_str()
            .expect("error message missing")
            .contains("shipping address")
    );
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_rejects_invalid_email() {
    let base_url = storefront_base_url();
    let client = Client::new();

    let resp = client
        .post(format!("{base_url}/checkout"))
        .json(&json!({
            "items": [checkout_item("variant-1", 1000, "prod_1", true)],
            "email": "not-an-email",
        }))
        .send()
        .await
        .expect("Failed to post checkout");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_rejects_empty_cart() {
    let base_url = storefront_base_url();
    let client = Client::new();

    let resp = client
        .post(format!("{base_url}/checkout"))
        .json(&json!({ "items": [], "email": "buyer@example.com" }))
        .send()
        .await
        .expect("Failed to post checkout");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server with seeded catalog"]
async fn test_checkout_unknown_variants_are_not_found() {
    let base_url = storefront_base_url();
    let client = Client::new();

    let resp = client
        .post(format!("{base_url}/checkout"))
        .json(&json!({
            "items": [checkout_item("no-such-variant", 1000, "prod_1", false)],
            "shipping_address": shipping_address(),
            "email": "buyer@example.com",
        }))
        .send()
        .await
        .expect("Failed to post checkout");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Happy path (needs Stripe test credentials and a live seeded variant)
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server, Stripe test key, and a live variant"]
async fn test_checkout_returns_redirect_url() {
    let base_url = storefront_base_url();
    let client = Client::new();

    // The variant id and Stripe product must exist; export them before
    // running this test.
    let variant_id =
        std::env::var("TEST_VARIANT_ID").expect("TEST_VARIANT_ID must be set for this test");
    let stripe_product_id = std::env::var("TEST_STRIPE_PRODUCT_ID")
        .expect("TEST_STRIPE_PRODUCT_ID must be set for this test");

    let resp = client
        .post(format!("{base_url}/checkout"))
        .json(&json!({
            "items": [checkout_item(&variant_id, 1500, &stripe_product_id, false)],
            "shipping_address": shipping_address(),
            "email": "buyer@example.com",
        }))
        .send()
        .await
        .expect("Failed to post checkout");

    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to read body");
    let url = body["url"].as_str().expect("redirect url missing");
    assert!(url.starts_with("https://"));
}

// ============================================================================
// Webhook
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_webhook_rejects_missing_signature() {
    let base_url = storefront_base_url();
    let client = Client::new();

    let resp = client
        .post(format!("{base_url}/webhooks/stripe"))
        .body(r#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{}}}"#)
        .send()
        .await
        .expect("Failed to post webhook");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_webhook_rejects_bad_signature() {
    let base_url = storefront_base_url();
    let client = Client::new();

    let resp = client
        .post(format!("{base_url}/webhooks/stripe"))
        .header("stripe-signature", "t=1,v1=deadbeef")
        .body(r#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{}}}"#)
        .send()
        .await
        .expect("Failed to post webhook");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
