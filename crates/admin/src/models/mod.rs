//! Admin-side catalog and order models.
//!
//! Unlike the storefront's read models, these cover draft catalog entries
//! (non-live variants included) and the write-side input shapes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clementine_core::{
    AttributeValue, CategoryId, Cents, ImageId, OrderId, PaymentStatus, ProductId, ShippingStatus,
    VariantId,
};

// =============================================================================
// Catalog (read side)
// =============================================================================

/// A product category.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A product with all of its variants, live or not.
///
/// `is_live` is computed from the variants at query time.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub is_live: bool,
    pub variants: Vec<ProductVariant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A sellable variant, including draft-only fields.
#[derive(Debug, Clone, Serialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Cents,
    /// `-1` means unlimited stock; any other value is a hard ceiling.
    pub stock: i32,
    pub is_digital: bool,
    pub is_live: bool,
    pub stripe_product_id: Option<String>,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub is_physical: bool,
    pub weight: Option<i32>,
    pub length: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub requires_shipping: bool,
    pub flat_rate_shipping: Option<Cents>,
    pub images: Vec<VariantImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// An image attached to a variant.
#[derive(Debug, Clone, Serialize)]
pub struct VariantImage {
    pub id: ImageId,
    pub variant_id: VariantId,
    pub url: String,
    pub title: String,
    pub position: i32,
}

/// Catalog-wide counts for the dashboard.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogStats {
    pub total_products: i64,
    pub live_products: i64,
    pub digital_variants: i64,
    pub physical_variants: i64,
}

// =============================================================================
// Catalog (write side)
// =============================================================================

/// Input for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Input for updating a category; absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCategoryInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Input for creating a product with its variants.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub variants: Vec<VariantInput>,
}

/// Input for updating a product.
///
/// When `variants` is present the product's variant set is replaced
/// wholesale, mirroring how the catalog editor submits the full form.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProductInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub variants: Option<Vec<VariantInput>>,
}

/// Input for one variant in a product write.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Cents,
    #[serde(default = "default_stock")]
    pub stock: i32,
    #[serde(default)]
    pub is_digital: bool,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub stripe_product_id: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    #[serde(default)]
    pub images: Vec<ImageInput>,
    #[serde(default)]
    pub is_physical: bool,
    #[serde(default)]
    pub weight: Option<i32>,
    #[serde(default)]
    pub length: Option<i32>,
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
    #[serde(default)]
    pub flat_rate_shipping: Option<Cents>,
}

const fn default_stock() -> i32 {
    -1
}

/// Input for one image on a variant write.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageInput {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub position: i32,
}

// =============================================================================
// Orders
// =============================================================================

/// A completed order as shown in the admin order views.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub stripe_session_id: String,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub requires_shipping: bool,
    pub shipping_name: Option<String>,
    pub shipping_address_line1: Option<String>,
    pub shipping_address_line2: Option<String>,
    pub shipping_city: Option<String>,
    pub shipping_state: Option<String>,
    pub shipping_postal_code: Option<String>,
    pub shipping_country: Option<String>,
    pub billing_address_line1: Option<String>,
    pub billing_address_line2: Option<String>,
    pub billing_city: Option<String>,
    pub billing_state: Option<String>,
    pub billing_postal_code: Option<String>,
    pub billing_country: Option<String>,
    pub currency: String,
    pub amount_subtotal: Cents,
    pub amount_total: Cents,
    pub amount_tax: Cents,
    pub amount_shipping: Cents,
    pub payment_status: PaymentStatus,
    pub shipping_status: ShippingStatus,
    pub shipping_carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Settings
// =============================================================================

/// Store-wide settings singleton.
#[derive(Debug, Clone, Serialize)]
pub struct SiteSettings {
    pub id: String,
    /// Window in days within which physical order lines are grouped into
    /// one shipment.
    pub shipment_grouping_days: i32,
    pub updated_at: DateTime<Utc>,
}

/// Input for updating shipping settings.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateShippingSettingsInput {
    pub shipment_grouping_days: i32,
}
