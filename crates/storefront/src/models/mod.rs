//! Catalog view models served by the storefront API.
//!
//! These are read-side projections of the catalog tables. The admin binary
//! owns the write-side models; the storefront only ever serves live data.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use clementine_core::{AttributeValue, CategoryId, Cents, ImageId, ProductId, VariantId};

/// The slice of a variant the checkout pipeline needs: shipping attributes
/// and purchasability, nothing else.
#[derive(Debug, Clone)]
pub struct VariantShipping {
    pub id: VariantId,
    pub price: Cents,
    pub stock: i32,
    pub is_digital: bool,
    pub requires_shipping: bool,
    pub flat_rate_shipping: Option<Cents>,
    pub stripe_product_id: Option<String>,
    pub is_live: bool,
}

/// A product as served to storefront clients.
///
/// `is_live` is computed from the variants at query time; it is never stored.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub category: String,
    pub is_live: bool,
    pub variants: Vec<ProductVariant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A sellable variant as served to storefront clients.
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
    pub is_physical: bool,
    pub weight: Option<i32>,
    pub length: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub requires_shipping: bool,
    pub flat_rate_shipping: Option<Cents>,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub images: Vec<VariantImage>,
}

/// An image attached to a variant, ordered by `position`.
#[derive(Debug, Clone, Serialize)]
pub struct VariantImage {
    pub id: ImageId,
    pub url: String,
    pub title: String,
    pub position: i32,
}
