//! Demo catalog seeding.
//!
//! Inserts a category and a couple of draft products through the same
//! repositories the admin binary uses. Seeded variants are drafts: no
//! Stripe sync happens here, so none of them are live.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use uuid::Uuid;

use clementine_admin::catalog::guard;
use clementine_admin::db::ProductRepository;
use clementine_admin::db::products::VariantRecord;
use clementine_admin::models::{CreateCategoryInput, CreateProductInput, ImageInput};
use clementine_core::{Cents, ProductId, VariantId};

use super::{CommandError, database_url};

/// Seed the database with a demo catalog.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to catalog database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let categories = clementine_admin::db::CategoryRepository::new(pool.clone());
    let category = categories
        .create(&CreateCategoryInput {
            name: format!("Homeware {}", &Uuid::new_v4().to_string()[..8]),
            description: Some("Seeded demo category".to_string()),
        })
        .await?;

    tracing::info!(category_id = %category.id, "Seed category created");

    seed_product(
        &pool,
        &CreateProductInput {
            name: "Linen Tea Towel".to_string(),
            description: "A sturdy linen tea towel, woven in two sizes.".to_string(),
            category_id: category.id.clone(),
            variants: Vec::new(),
        },
        &[
            seed_variant("Small", 1500, false, Some(500)),
            seed_variant("Large", 2200, false, Some(500)),
        ],
    )
    .await?;

    seed_product(
        &pool,
        &CreateProductInput {
            name: "Care Guide (PDF)".to_string(),
            description: "A downloadable guide to caring for linen goods.".to_string(),
            category_id: category.id,
            variants: Vec::new(),
        },
        &[seed_variant("Digital Download", 0, true, None)],
    )
    .await?;

    tracing::info!("Seed complete!");
    Ok(())
}

/// Insert one product and its variants in a single transaction.
async fn seed_product(
    pool: &PgPool,
    input: &CreateProductInput,
    variants: &[SeedVariant],
) -> Result<(), CommandError> {
    let product_id = ProductId::new(Uuid::new_v4().to_string());

    let mut tx = pool
        .begin()
        .await
        .map_err(clementine_admin::db::RepositoryError::from)?;

    ProductRepository::insert_product(&mut tx, &product_id, input).await?;

    for variant in variants {
        let record = VariantRecord {
            id: VariantId::new(Uuid::new_v4().to_string()),
            product_id: product_id.clone(),
            name: variant.name.clone(),
            description: None,
            price: variant.price,
            stock: -1,
            is_digital: variant.is_digital,
            is_live: false,
            stripe_product_id: None,
            attributes: std::collections::BTreeMap::new(),
            is_physical: !variant.is_digital,
            weight: None,
            length: None,
            width: None,
            height: None,
            requires_shipping: guard::derive_requires_shipping(variant.is_digital),
            flat_rate_shipping: variant.flat_rate_shipping,
            images: vec![ImageInput {
                url: "https://placehold.co/600x600".to_string(),
                title: format!("{} photo", variant.name),
                position: 0,
            }],
        };

        ProductRepository::insert_variant(&mut tx, &record).await?;
    }

    tx.commit()
        .await
        .map_err(clementine_admin::db::RepositoryError::from)?;

    tracing::info!(product_id = %product_id, name = %input.name, "Seed product created");
    Ok(())
}

struct SeedVariant {
    name: String,
    price: Cents,
    is_digital: bool,
    flat_rate_shipping: Option<Cents>,
}

fn seed_variant(
    name: &str,
    price: i64,
    is_digital: bool,
    flat_rate_shipping: Option<i64>,
) -> SeedVariant {
    SeedVariant {
        name: name.to_string(),
        price: Cents::new(price),
        is_digital,
        flat_rate_shipping: flat_rate_shipping.map(Cents::new),
    }
}
