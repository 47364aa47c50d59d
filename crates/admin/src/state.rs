//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::db::{CategoryRepository, OrderRepository, ProductRepository, SettingsRepository};
use crate::services::CatalogService;
use crate::stripe::StripeClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    products: ProductRepository,
    categories: CategoryRepository,
    orders: OrderRepository,
    settings: SettingsRepository,
    catalog: CatalogService,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let products = ProductRepository::new(pool.clone());
        let categories = CategoryRepository::new(pool.clone());
        let orders = OrderRepository::new(pool.clone());
        let settings = SettingsRepository::new(pool.clone());
        let stripe = StripeClient::new(&config.stripe);
        let catalog = CatalogService::new(pool.clone(), products.clone(), stripe);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                products,
                categories,
                orders,
                settings,
                catalog,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the product repository.
    #[must_use]
    pub fn products(&self) -> &ProductRepository {
        &self.inner.products
    }

    /// Get a reference to the category repository.
    #[must_use]
    pub fn categories(&self) -> &CategoryRepository {
        &self.inner.categories
    }

    /// Get a reference to the order repository.
    #[must_use]
    pub fn orders(&self) -> &OrderRepository {
        &self.inner.orders
    }

    /// Get a reference to the settings repository.
    #[must_use]
    pub fn settings(&self) -> &SettingsRepository {
        &self.inner.settings
    }

    /// Get a reference to the catalog write service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }
}
