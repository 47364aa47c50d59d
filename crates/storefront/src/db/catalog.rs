//! Read-side catalog repository.
//!
//! Serves live products to the public API and resolves variant shipping
//! attributes for the checkout pipeline. Product listings are cached with
//! `moka` (5-minute TTL); checkout variant lookups are never cached.
//!
//! A product is live iff at least one of its variants is live. That flag is
//! computed per query - it is intentionally not a stored column.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use clementine_core::{
    AttributeValue, CategoryId, Cents, ImageId, ProductId, VariantId,
};

use super::RepositoryError;
use crate::checkout::CatalogReader;
use crate::models::{Product, ProductVariant, VariantImage, VariantShipping};

/// Cached catalog values.
#[derive(Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Arc<Product>),
}

/// Read-only catalog access backed by Postgres.
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
    cache: Cache<String, CacheValue>,
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct VariantShippingRow {
    id: String,
    price: i64,
    stock: i32,
    is_digital: bool,
    requires_shipping: bool,
    flat_rate_shipping: Option<i64>,
    stripe_product_id: Option<String>,
    is_live: bool,
}

impl From<VariantShippingRow> for VariantShipping {
    fn from(row: VariantShippingRow) -> Self {
        Self {
            id: VariantId::new(row.id),
            price: Cents::new(row.price),
            stock: row.stock,
            is_digital: row.is_digital,
            requires_shipping: row.requires_shipping,
            flat_rate_shipping: row.flat_rate_shipping.map(Cents::new),
            stripe_product_id: row.stripe_product_id,
            is_live: row.is_live,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    description: String,
    category_id: String,
    category: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    id: String,
    product_id: String,
    name: String,
    description: Option<String>,
    price: i64,
    stock: i32,
    is_digital: bool,
    is_live: bool,
    stripe_product_id: Option<String>,
    is_physical: bool,
    weight: Option<i32>,
    length: Option<i32>,
    width: Option<i32>,
    height: Option<i32>,
    requires_shipping: bool,
    flat_rate_shipping: Option<i64>,
    attributes: serde_json::Value,
}

#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    id: String,
    variant_id: String,
    url: String,
    title: String,
    position: i32,
}

impl VariantRow {
    fn into_model(self, images: Vec<VariantImage>) -> Result<ProductVariant, RepositoryError> {
        let attributes: BTreeMap<String, AttributeValue> =
            serde_json::from_value(self.attributes).map_err(|e| {
                RepositoryError::DataCorruption(format!(
                    "invalid attributes on variant {}: {e}",
                    self.id
                ))
            })?;

        Ok(ProductVariant {
            id: VariantId::new(self.id),
            product_id: ProductId::new(self.product_id),
            name: self.name,
            description: self.description,
            price: Cents::new(self.price),
            stock: self.stock,
            is_digital: self.is_digital,
            is_live: self.is_live,
            stripe_product_id: self.stripe_product_id,
            is_physical: self.is_physical,
            weight: self.weight,
            length: self.length,
            width: self.width,
            height: self.height,
            requires_shipping: self.requires_shipping,
            flat_rate_shipping: self.flat_rate_shipping.map(Cents::new),
            attributes,
            images,
        })
    }
}

impl CatalogRepository {
    /// Create a new catalog repository over the shared pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self { pool, cache }
    }

    /// List live products with their live variants, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if any query fails or stored attributes are invalid.
    #[instrument(skip(self))]
    pub async fn list_live_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let cache_key = "products:live".to_string();

        if let Some(CacheValue::Products(products)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for live products");
            return Ok(products.as_ref().clone());
        }

        let product_rows: Vec<ProductRow> = sqlx::query_as(
            r"
            SELECT p.id, p.name, p.description, p.category_id,
                   c.name AS category, p.created_at, p.updated_at
            FROM products p
            JOIN product_categories c ON c.id = p.category_id
            WHERE EXISTS (
                SELECT 1 FROM product_variants v
                WHERE v.product_id = p.id AND v.is_live
            )
            ORDER BY p.created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let products = self.assemble_products(product_rows, true).await?;

        self.cache
            .insert(cache_key, CacheValue::Products(Arc::new(products.clone())))
            .await;

        Ok(products)
    }

    /// Fetch a single live product by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the product does not exist
    /// or has no live variants.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_live_product(&self, id: &ProductId) -> Result<Product, RepositoryError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(product.as_ref().clone());
        }

        let product_rows: Vec<ProductRow> = sqlx::query_as(
            r"
            SELECT p.id, p.name, p.description, p.category_id,
                   c.name AS category, p.created_at, p.updated_at
            FROM products p
            JOIN product_categories c ON c.id = p.category_id
            WHERE p.id = $1
              AND EXISTS (
                SELECT 1 FROM product_variants v
                WHERE v.product_id = p.id AND v.is_live
              )
            ",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?;

        let product = self
            .assemble_products(product_rows, true)
            .await?
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound)?;

        self.cache
            .insert(cache_key, CacheValue::Product(Arc::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Attach variants, images, and the computed live flag to product rows.
    async fn assemble_products(
        &self,
        product_rows: Vec<ProductRow>,
        only_live_variants: bool,
    ) -> Result<Vec<Product>, RepositoryError> {
        if product_rows.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<String> = product_rows.iter().map(|p| p.id.clone()).collect();

        let variant_rows: Vec<VariantRow> = sqlx::query_as(
            r"
            SELECT id, product_id, name, description, price, stock,
                   is_digital, is_live, stripe_product_id, is_physical,
                   weight, length, width, height, requires_shipping,
                   flat_rate_shipping, attributes
            FROM product_variants
            WHERE product_id = ANY($1)
              AND (NOT $2 OR is_live)
            ORDER BY created_at
            ",
        )
        .bind(&product_ids)
        .bind(only_live_variants)
        .fetch_all(&self.pool)
        .await?;

        let variant_ids: Vec<String> = variant_rows.iter().map(|v| v.id.clone()).collect();

        let image_rows: Vec<ImageRow> = if variant_ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query_as(
                r"
                SELECT id, variant_id, url, title, position
                FROM variant_images
                WHERE variant_id = ANY($1)
                ORDER BY position
                ",
            )
            .bind(&variant_ids)
            .fetch_all(&self.pool)
            .await?
        };

        let mut images_by_variant: BTreeMap<String, Vec<VariantImage>> = BTreeMap::new();
        for row in image_rows {
            images_by_variant
                .entry(row.variant_id.clone())
                .or_default()
                .push(VariantImage {
                    id: ImageId::new(row.id),
                    url: row.url,
                    title: row.title,
                    position: row.position,
                });
        }

        let mut variants_by_product: BTreeMap<String, Vec<ProductVariant>> = BTreeMap::new();
        for row in variant_rows {
            let product_id = row.product_id.clone();
            let images = images_by_variant.remove(&row.id).unwrap_or_default();
            variants_by_product
                .entry(product_id)
                .or_default()
                .push(row.into_model(images)?);
        }

        Ok(product_rows
            .into_iter()
            .map(|row| {
                let variants = variants_by_product.remove(&row.id).unwrap_or_default();
                Product {
                    is_live: variants.iter().any(|v| v.is_live),
                    id: ProductId::new(row.id),
                    name: row.name,
                    description: row.description,
                    category_id: CategoryId::new(row.category_id),
                    category: row.category,
                    variants,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }
            })
            .collect())
    }
}

impl CatalogReader for CatalogRepository {
    /// Variant lookups feed checkout pricing, so they bypass the cache.
    async fn variants_shipping(
        &self,
        ids: &[VariantId],
    ) -> Result<Vec<VariantShipping>, RepositoryError> {
        let id_strings: Vec<String> = ids.iter().map(|id| id.as_str().to_owned()).collect();

        let rows: Vec<VariantShippingRow> = sqlx::query_as(
            r"
            SELECT id, price, stock, is_digital, requires_shipping,
                   flat_rate_shipping, stripe_product_id, is_live
            FROM product_variants
            WHERE id = ANY($1)
            ",
        )
        .bind(&id_strings)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(VariantShipping::from).collect())
    }
}
