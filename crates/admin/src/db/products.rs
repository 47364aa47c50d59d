//! Product and variant repository.
//!
//! Reads assemble full products (draft variants included). Writes are
//! split into transaction-scoped helpers so the catalog service can wrap a
//! product row, its variants, and their images in a single transaction -
//! partial writes are not acceptable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use clementine_core::{AttributeValue, CategoryId, Cents, ImageId, ProductId, VariantId};

use super::RepositoryError;
use crate::models::{
    CatalogStats, CreateProductInput, ImageInput, Product, ProductVariant, UpdateProductInput,
    VariantImage,
};

/// A fully-resolved variant ready for insertion: input fields plus the
/// derived shipping flag and the Stripe product reference assigned by the
/// catalog sync.
#[derive(Debug, Clone)]
pub struct VariantRecord {
    pub id: VariantId,
    pub product_id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Cents,
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
    pub images: Vec<ImageInput>,
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    description: String,
    category_id: String,
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
    attributes: serde_json::Value,
    is_physical: bool,
    weight: Option<i32>,
    length: Option<i32>,
    width: Option<i32>,
    height: Option<i32>,
    requires_shipping: bool,
    flat_rate_shipping: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
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
            attributes,
            is_physical: self.is_physical,
            weight: self.weight,
            length: self.length,
            width: self.width,
            height: self.height,
            requires_shipping: self.requires_shipping,
            flat_rate_shipping: self.flat_rate_shipping.map(Cents::new),
            images,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const VARIANT_COLUMNS: &str = r"
    id, product_id, name, description, price, stock, is_digital, is_live,
    stripe_product_id, attributes, is_physical, weight, length, width,
    height, requires_shipping, flat_rate_shipping, created_at, updated_at
";

/// Catalog product access for the admin binary.
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository over the shared pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// List all products with every variant, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if any query fails or stored attributes are invalid.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r"
            SELECT id, name, description, category_id, created_at, updated_at
            FROM products
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Fetch a single product with every variant.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] for an unknown id.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: &ProductId) -> Result<Product, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r"
            SELECT id, name, description, category_id, created_at, updated_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows)
            .await?
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound)
    }

    /// Fetch every variant of a product, images included.
    ///
    /// # Errors
    ///
    /// Returns an error if any query fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn variants(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<ProductVariant>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {VARIANT_COLUMNS}
            FROM product_variants
            WHERE product_id = $1
            ORDER BY created_at
            "
        );

        let variant_rows: Vec<VariantRow> = sqlx::query_as(&sql)
            .bind(product_id.as_str())
            .fetch_all(&self.pool)
            .await?;

        let variant_ids: Vec<String> = variant_rows.iter().map(|v| v.id.clone()).collect();
        let mut images = self.images_by_variant(&variant_ids).await?;

        variant_rows
            .into_iter()
            .map(|row| {
                let imgs = images.remove(&row.id).unwrap_or_default();
                row.into_model(imgs)
            })
            .collect()
    }

    /// Catalog-wide counts for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<CatalogStats, RepositoryError> {
        let (total_products, live_products, digital_variants, physical_variants): (
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r"
            SELECT
                (SELECT count(*) FROM products),
                (SELECT count(*) FROM products p WHERE EXISTS (
                    SELECT 1 FROM product_variants v
                    WHERE v.product_id = p.id AND v.is_live
                )),
                (SELECT count(*) FROM product_variants WHERE is_digital),
                (SELECT count(*) FROM product_variants WHERE NOT is_digital)
            ",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CatalogStats {
            total_products,
            live_products,
            digital_variants,
            physical_variants,
        })
    }

    // =========================================================================
    // Transaction-scoped writes
    // =========================================================================

    /// Insert the product row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (e.g., unknown category).
    pub async fn insert_product(
        conn: &mut PgConnection,
        id: &ProductId,
        input: &CreateProductInput,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO products (id, name, description, category_id)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(id.as_str())
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category_id.as_str())
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Update the product row's scalar fields; absent fields are unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] for an unknown id.
    pub async fn update_product_row(
        conn: &mut PgConnection,
        id: &ProductId,
        input: &UpdateProductInput,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                category_id = COALESCE($4, category_id),
                updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category_id.as_ref().map(CategoryId::as_str))
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Fetch the product's current name inside a write transaction.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] for an unknown id.
    pub async fn product_name(
        conn: &mut PgConnection,
        id: &ProductId,
    ) -> Result<String, RepositoryError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT name FROM products WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(conn)
            .await?;

        row.map(|(name,)| name).ok_or(RepositoryError::NotFound)
    }

    /// Fetch the Stripe product ids of a product's current variants inside
    /// a write transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn variant_stripe_ids(
        conn: &mut PgConnection,
        product_id: &ProductId,
    ) -> Result<Vec<Option<String>>, RepositoryError> {
        let rows: Vec<(Option<String>,)> = sqlx::query_as(
            "SELECT stripe_product_id FROM product_variants WHERE product_id = $1",
        )
        .bind(product_id.as_str())
        .fetch_all(conn)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Delete every variant of a product (images cascade).
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_variants(
        conn: &mut PgConnection,
        product_id: &ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM product_variants WHERE product_id = $1")
            .bind(product_id.as_str())
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Insert one variant and its images.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails.
    pub async fn insert_variant(
        conn: &mut PgConnection,
        record: &VariantRecord,
    ) -> Result<(), RepositoryError> {
        let attributes = serde_json::to_value(&record.attributes).map_err(|e| {
            RepositoryError::DataCorruption(format!("unserializable attributes: {e}"))
        })?;

        sqlx::query(
            r"
            INSERT INTO product_variants (
                id, product_id, name, description, price, stock,
                is_digital, is_live, stripe_product_id, attributes,
                is_physical, weight, length, width, height,
                requires_shipping, flat_rate_shipping
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17)
            ",
        )
        .bind(record.id.as_str())
        .bind(record.product_id.as_str())
        .bind(&record.name)
        .bind(&record.description)
        .bind(record.price)
        .bind(record.stock)
        .bind(record.is_digital)
        .bind(record.is_live)
        .bind(&record.stripe_product_id)
        .bind(attributes)
        .bind(record.is_physical)
        .bind(record.weight)
        .bind(record.length)
        .bind(record.width)
        .bind(record.height)
        .bind(record.requires_shipping)
        .bind(record.flat_rate_shipping)
        .execute(&mut *conn)
        .await?;

        for image in &record.images {
            let image_id = uuid::Uuid::new_v4().to_string();
            sqlx::query(
                r"
                INSERT INTO variant_images (id, variant_id, url, title, position)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(&image_id)
            .bind(record.id.as_str())
            .bind(&image.url)
            .bind(&image.title)
            .bind(image.position)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Delete a product; variants and images cascade.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] for an unknown id.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    // =========================================================================
    // Assembly
    // =========================================================================

    async fn images_by_variant(
        &self,
        variant_ids: &[String],
    ) -> Result<BTreeMap<String, Vec<VariantImage>>, RepositoryError> {
        if variant_ids.is_empty() {
            return Ok(BTreeMap::new());
        }

        let rows: Vec<ImageRow> = sqlx::query_as(
            r"
            SELECT id, variant_id, url, title, position
            FROM variant_images
            WHERE variant_id = ANY($1)
            ORDER BY position
            ",
        )
        .bind(variant_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_variant: BTreeMap<String, Vec<VariantImage>> = BTreeMap::new();
        for row in rows {
            by_variant
                .entry(row.variant_id.clone())
                .or_default()
                .push(VariantImage {
                    id: ImageId::new(row.id),
                    variant_id: VariantId::new(row.variant_id),
                    url: row.url,
                    title: row.title,
                    position: row.position,
                });
        }

        Ok(by_variant)
    }

    async fn assemble(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<String> = rows.iter().map(|p| p.id.clone()).collect();

        let sql = format!(
            r"
            SELECT {VARIANT_COLUMNS}
            FROM product_variants
            WHERE product_id = ANY($1)
            ORDER BY created_at
            "
        );

        let variant_rows: Vec<VariantRow> = sqlx::query_as(&sql)
            .bind(&product_ids)
            .fetch_all(&self.pool)
            .await?;

        let variant_ids: Vec<String> = variant_rows.iter().map(|v| v.id.clone()).collect();
        let mut images = self.images_by_variant(&variant_ids).await?;

        let mut variants_by_product: BTreeMap<String, Vec<ProductVariant>> = BTreeMap::new();
        for row in variant_rows {
            let product_id = row.product_id.clone();
            let imgs = images.remove(&row.id).unwrap_or_default();
            variants_by_product
                .entry(product_id)
                .or_default()
                .push(row.into_model(imgs)?);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let variants = variants_by_product.remove(&row.id).unwrap_or_default();
                Product {
                    is_live: variants.iter().any(|v| v.is_live),
                    id: ProductId::new(row.id),
                    name: row.name,
                    description: row.description,
                    category_id: CategoryId::new(row.category_id),
                    variants,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }
            })
            .collect())
    }
}
