//! Catalog write orchestration.
//!
//! Product writes touch three tables and the Stripe catalog. The database
//! side of every write runs in one transaction; a Stripe failure mid-write
//! aborts the transaction and no local rows land.
//!
//! Deletion is the one place provider failures do NOT abort: the local
//! catalog is the source of truth for display, Stripe only for
//! purchasability, so local deletion proceeds and provider failures are
//! reported in the outcome instead of swallowed.

use serde::Serialize;
use sqlx::PgPool;
use tracing::{instrument, warn};
use uuid::Uuid;

use clementine_core::{ProductId, VariantId};

use crate::catalog::guard;
use crate::db::products::VariantRecord;
use crate::db::{ProductRepository, RepositoryError};
use crate::models::{CreateProductInput, Product, UpdateProductInput, VariantInput};
use crate::stripe::types::ProductFields;
use crate::stripe::{StripeClient, StripeError};

/// Errors from catalog write orchestration.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A variant failed the consistency guard.
    #[error(transparent)]
    Validation(#[from] guard::ValidationError),

    /// Database operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Stripe catalog sync failed.
    #[error(transparent)]
    Stripe(#[from] StripeError),
}

/// One provider deactivation that failed during a delete.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderFailure {
    pub stripe_product_id: String,
    pub error: String,
}

/// The result of a two-phase product deletion.
///
/// Local deletion proceeds even when some provider deactivations fail;
/// callers decide whether to surface the partial failure.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub local_deleted: bool,
    pub provider_deactivated: Vec<String>,
    pub provider_failed: Vec<ProviderFailure>,
}

/// Catalog write orchestration over the product repository and Stripe.
#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
    products: ProductRepository,
    stripe: StripeClient,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: PgPool, products: ProductRepository, stripe: StripeClient) -> Self {
        Self {
            pool,
            products,
            stripe,
        }
    }

    /// Create a product with its variants.
    ///
    /// Every variant gets a Stripe product and an initial price before its
    /// row is inserted. All rows land in one transaction.
    ///
    /// # Errors
    ///
    /// Returns a validation error before anything is written; repository or
    /// Stripe errors roll the transaction back.
    #[instrument(skip(self, input), fields(name = %input.name, variant_count = input.variants.len()))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<Product, CatalogError> {
        for variant in &input.variants {
            guard::validate_variant(variant)?;
        }

        let product_id = ProductId::new(Uuid::new_v4().to_string());

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        ProductRepository::insert_product(&mut tx, &product_id, &input).await?;

        for variant in &input.variants {
            let stripe_product_id = self
                .create_stripe_product(&input.name, variant)
                .await?;

            let record = build_record(&product_id, variant, Some(stripe_product_id));
            ProductRepository::insert_variant(&mut tx, &record).await?;
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(self.products.get(&product_id).await?)
    }

    /// Update a product, replacing its variant set when one is submitted.
    ///
    /// Variants that disappear from the set have their Stripe products
    /// deactivated; surviving ones get their Stripe product updated and a
    /// fresh price appended (Stripe prices are immutable).
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] for an unknown product;
    /// repository or Stripe errors roll the transaction back.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        input: UpdateProductInput,
    ) -> Result<Product, CatalogError> {
        if let Some(variants) = &input.variants {
            for variant in variants {
                guard::validate_variant(variant)?;
            }
        }

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        ProductRepository::update_product_row(&mut tx, id, &input).await?;
        let product_name = ProductRepository::product_name(&mut tx, id).await?;

        if let Some(variants) = &input.variants {
            let existing = ProductRepository::variant_stripe_ids(&mut tx, id).await?;

            // Deactivate Stripe products for variants dropped from the set.
            let kept: Vec<&str> = variants
                .iter()
                .filter_map(|v| v.stripe_product_id.as_deref())
                .collect();
            for stripe_id in existing.iter().flatten() {
                if !kept.contains(&stripe_id.as_str()) {
                    self.stripe.deactivate_product(stripe_id).await?;
                }
            }

            ProductRepository::delete_variants(&mut tx, id).await?;

            for variant in variants {
                let stripe_product_id = match variant.stripe_product_id.as_deref() {
                    Some(stripe_id) if !stripe_id.is_empty() => {
                        self.update_stripe_product(stripe_id, &product_name, variant)
                            .await?;
                        stripe_id.to_owned()
                    }
                    _ => self.create_stripe_product(&product_name, variant).await?,
                };

                let record = build_record(id, variant, Some(stripe_product_id));
                ProductRepository::insert_variant(&mut tx, &record).await?;
            }
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(self.products.get(id).await?)
    }

    /// Delete a product in two phases.
    ///
    /// Phase one best-effort deactivates each variant's Stripe product;
    /// phase two deletes the local rows (variants and images cascade).
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] for an unknown product. Phase
    /// one failures never abort the delete - they are reported in the
    /// outcome.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<DeleteOutcome, CatalogError> {
        let variants = self.products.variants(id).await?;

        let mut provider_deactivated = Vec::new();
        let mut provider_failed = Vec::new();

        for variant in &variants {
            let Some(stripe_id) = variant.stripe_product_id.as_deref() else {
                continue;
            };

            match self.stripe.deactivate_product(stripe_id).await {
                Ok(()) => provider_deactivated.push(stripe_id.to_owned()),
                Err(e) => {
                    warn!(
                        stripe_product_id = %stripe_id,
                        error = %e,
                        "Provider deactivation failed during delete"
                    );
                    provider_failed.push(ProviderFailure {
                        stripe_product_id: stripe_id.to_owned(),
                        error: e.to_string(),
                    });
                }
            }
        }

        self.products.delete(id).await?;

        Ok(DeleteOutcome {
            local_deleted: true,
            provider_deactivated,
            provider_failed,
        })
    }

    /// Create a Stripe product and its initial price for a variant.
    async fn create_stripe_product(
        &self,
        product_name: &str,
        variant: &VariantInput,
    ) -> Result<String, StripeError> {
        let fields = stripe_fields(product_name, variant);
        let product = self.stripe.create_product(&fields).await?;
        self.stripe.create_price(&product.id, variant.price).await?;

        Ok(product.id)
    }

    /// Update a Stripe product's display fields and append a fresh price.
    async fn update_stripe_product(
        &self,
        stripe_id: &str,
        product_name: &str,
        variant: &VariantInput,
    ) -> Result<(), StripeError> {
        let fields = stripe_fields(product_name, variant);
        self.stripe.update_product(stripe_id, &fields).await?;
        self.stripe.create_price(stripe_id, variant.price).await?;

        Ok(())
    }
}

/// Display fields Stripe shows for a variant's product.
fn stripe_fields(product_name: &str, variant: &VariantInput) -> ProductFields {
    ProductFields {
        name: format!("{product_name} - {}", variant.name),
        description: variant.description.clone(),
        images: variant.images.iter().map(|i| i.url.clone()).collect(),
    }
}

/// Resolve a variant input into an insertable record, deriving the
/// shipping flag from the digital flag.
fn build_record(
    product_id: &ProductId,
    input: &VariantInput,
    stripe_product_id: Option<String>,
) -> VariantRecord {
    VariantRecord {
        id: VariantId::new(Uuid::new_v4().to_string()),
        product_id: product_id.clone(),
        name: input.name.clone(),
        description: input.description.clone(),
        price: input.price,
        stock: input.stock,
        is_digital: input.is_digital,
        is_live: input.is_live,
        stripe_product_id,
        attributes: input.attributes.clone(),
        is_physical: input.is_physical,
        weight: input.weight,
        length: input.length,
        width: input.width,
        height: input.height,
        requires_shipping: guard::derive_requires_shipping(input.is_digital),
        flat_rate_shipping: input.flat_rate_shipping,
        images: input.images.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clementine_core::Cents;
    use std::collections::BTreeMap;

    fn variant(is_digital: bool) -> VariantInput {
        VariantInput {
            name: "Default".to_string(),
            description: None,
            price: Cents::new(1000),
            stock: -1,
            is_digital,
            is_live: false,
            stripe_product_id: None,
            attributes: BTreeMap::new(),
            images: Vec::new(),
            is_physical: !is_digital,
            weight: None,
            length: None,
            width: None,
            height: None,
            flat_rate_shipping: None,
        }
    }

    #[test]
    fn test_build_record_derives_requires_shipping() {
        let product_id = ProductId::new("p1");

        let physical = build_record(&product_id, &variant(false), Some("prod_1".into()));
        assert!(physical.requires_shipping);

        let digital = build_record(&product_id, &variant(true), Some("prod_2".into()));
        assert!(!digital.requires_shipping);
    }

    #[test]
    fn test_build_record_overrides_inconsistent_input() {
        // The guard silently corrects rather than rejecting: whatever the
        // caller believes about shipping, digital wins.
        let product_id = ProductId::new("p1");
        let mut input = variant(true);
        input.is_physical = true; // caller claims physical but digital is set

        let record = build_record(&product_id, &input, None);
        assert!(!record.requires_shipping);
    }

    #[test]
    fn test_stripe_fields_compose_display_name() {
        let input = variant(false);
        let fields = stripe_fields("Tea Towel", &input);
        assert_eq!(fields.name, "Tea Towel - Default");
    }
}
