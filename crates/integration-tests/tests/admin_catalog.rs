//! Integration tests for admin catalog management.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The admin server running (cargo run -p clementine-admin)
//! - A Stripe test key for the product-write tests
//!
//! Run with: cargo test -p clementine-integration-tests -- --ignored

use clementine_integration_tests::{admin_base_url, unique_suffix};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Test helper: create a category and return its id.
async fn create_test_category(client: &Client) -> String {
    let base_url = admin_base_url();
    let resp = client
        .post(format!("{base_url}/categories"))
        .json(&json!({
            "name": format!("Test Category {}", unique_suffix()),
            "description": "integration test category",
        }))
        .send()
        .await
        .expect("Failed to create test category");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to read category");
    body["id"].as_str().expect("category id missing").to_string()
}

// ============================================================================
// Categories
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_category_crud_roundtrip() {
    let client = Client::new();
    let base_url = admin_base_url();

    let id = create_test_category(&client).await;

    // Read it back
    let resp = client
        .get(format!("{base_url}/categories/{id}"))
        .send()
        .await
        .expect("Failed to get category");
    assert_eq!(resp.status(), StatusCode::OK);

    // Update the description
    let resp = client
        .put(format!("{base_url}/categories/{id}"))
        .json(&json!({ "description": "updated" }))
        .send()
        .await
        .expect("Failed to update category");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to read category");
    assert_eq!(body["description"], "updated");

    // Delete it
    let resp = client
        .delete(format!("{base_url}/categories/{id}"))
        .send()
        .await
        .expect("Failed to delete category");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // Gone now
    let resp = client
        .get(format!("{base_url}/categories/{id}"))
        .send()
        .await
        .expect("Failed to get category");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Consistency guard (validation runs before any Stripe call, so no test key
// is needed)
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_live_variant_without_stripe_reference_is_rejected() {
    let client = Client::new();
    let base_url = admin_base_url();

    let category_id = create_test_category(&client).await;

    let resp = client
        .post(format!("{base_url}/products"))
        .json(&json!({
            "name": format!("Guarded Product {}", unique_suffix()),
            "description": "should never be created",
            "category_id": category_id,
            "variants": [{
                "name": "Bad Variant",
                "price": 1000,
                "is_live": true,
                "stripe_product_id": "",
            }],
        }))
        .send()
        .await
        .expect("Failed to post product");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = resp.json().await.expect("Failed to read error body");
    // The error is pinned to the offending field.
    assert_eq!(body["field"], "stripe_product_id");
}

// ============================================================================
// Products (need a Stripe test key - every variant write syncs the catalog)
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and Stripe test key"]
async fn test_product_create_derives_shipping_flags() {
    let client = Client::new();
    let base_url = admin_base_url();

    let category_id = create_test_category(&client).await;

    let resp = client
        .post(format!("{base_url}/products"))
        .json(&json!({
            "name": format!("Mixed Product {}", unique_suffix()),
            "description": "one physical, one digital variant",
            "category_id": category_id,
            "variants": [
                { "name": "Physical", "price": 1500, "is_digital": false,
                  "flat_rate_shipping": 500 },
                { "name": "Digital", "price": 500, "is_digital": true },
            ],
        }))
        .send()
        .await
        .expect("Failed to post product");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to read product");

    let variants = body["variants"].as_array().expect("variants missing");
    assert_eq!(variants.len(), 2);

    for variant in variants {
        let is_digital = variant["is_digital"].as_bool().expect("is_digital missing");
        let requires_shipping = variant["requires_shipping"]
            .as_bool()
            .expect("requires_shipping missing");
        // The guard derives requires_shipping from is_digital, always.
        assert_eq!(requires_shipping, !is_digital);

        // Every created variant carries a Stripe product reference.
        assert!(
            !variant["stripe_product_id"]
                .as_str()
                .expect("stripe_product_id missing")
                .is_empty()
        );
    }

    // A freshly created product has no live variants, so it is not live.
    assert_eq!(body["is_live"], false);
}

#[tokio::test]
#[ignore = "Requires running admin server and Stripe test key"]
async fn test_product_delete_reports_provider_outcome() {
    let client = Client::new();
    let base_url = admin_base_url();

    let category_id = create_test_category(&client).await;

    let resp = client
        .post(format!("{base_url}/products"))
        .json(&json!({
            "name": format!("Doomed Product {}", unique_suffix()),
            "description": "created to be deleted",
            "category_id": category_id,
            "variants": [{ "name": "Only Variant", "price": 900 }],
        }))
        .send()
        .await
        .expect("Failed to post product");
    assert_eq!(resp.status(), StatusCode::OK);
    let product: Value = resp.json().await.expect("Failed to read product");
    let product_id = product["id"].as_str().expect("product id missing");

    let resp = client
        .delete(format!("{base_url}/products/{product_id}"))
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(resp.status(), StatusCode::OK);

    let outcome: Value = resp.json().await.expect("Failed to read outcome");
    assert_eq!(outcome["local_deleted"], true);
    assert_eq!(
        outcome["provider_deactivated"]
            .as_array()
            .expect("provider_deactivated missing")
            .len(),
        1
    );
    assert!(
        outcome["provider_failed"]
            .as_array()
            .expect("provider_failed missing")
            .is_empty()
    );

    // The product is gone locally regardless of provider outcome.
    let resp = client
        .get(format!("{base_url}/products/{product_id}"))
        .send()
        .await
        .expect("Failed to get product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Settings
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_shipping_settings_roundtrip() {
    let client = Client::new();
    let base_url = admin_base_url();

    // Defaults are served even before the first write.
    let resp = client
        .get(format!("{base_url}/settings/shipping"))
        .send()
        .await
        .expect("Failed to get settings");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .put(format!("{base_url}/settings/shipping"))
        .json(&json!({ "shipment_grouping_days": 10 }))
        .send()
        .await
        .expect("Failed to update settings");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to read settings");
    assert_eq!(body["shipment_grouping_days"], 10);

    // Out-of-range values are rejected.
    let resp = client
        .put(format!("{base_url}/settings/shipping"))
        .json(&json!({ "shipment_grouping_days": 45 }))
        .send()
        .await
        .expect("Failed to update settings");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
