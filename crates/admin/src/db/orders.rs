//! Order read access for the admin order views.
//!
//! Orders are written by the storefront webhook; the admin binary only
//! lists and inspects them (fulfillment workflow is out of scope).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use clementine_core::{Cents, OrderId, PaymentStatus, ShippingStatus};

use super::RepositoryError;
use crate::models::Order;

/// Hard ceiling on page size.
const MAX_PAGE_SIZE: i64 = 100;

/// Listing parameters for the order views.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Substring match on the customer email.
    pub query: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    stripe_session_id: String,
    customer_email: String,
    customer_name: String,
    customer_phone: Option<String>,
    requires_shipping: bool,
    shipping_name: Option<String>,
    shipping_address_line1: Option<String>,
    shipping_address_line2: Option<String>,
    shipping_city: Option<String>,
    shipping_state: Option<String>,
    shipping_postal_code: Option<String>,
    shipping_country: Option<String>,
    billing_address_line1: Option<String>,
    billing_address_line2: Option<String>,
    billing_city: Option<String>,
    billing_state: Option<String>,
    billing_postal_code: Option<String>,
    billing_country: Option<String>,
    currency: String,
    amount_subtotal: i64,
    amount_total: i64,
    amount_tax: i64,
    amount_shipping: i64,
    payment_status: String,
    shipping_status: String,
    shipping_carrier: Option<String>,
    tracking_number: Option<String>,
    metadata: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let payment_status: PaymentStatus = row.payment_status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("order {}: {e}", row.id))
        })?;
        let shipping_status: ShippingStatus = row.shipping_status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("order {}: {e}", row.id))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            stripe_session_id: row.stripe_session_id,
            customer_email: row.customer_email,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            requires_shipping: row.requires_shipping,
            shipping_name: row.shipping_name,
            shipping_address_line1: row.shipping_address_line1,
            shipping_address_line2: row.shipping_address_line2,
            shipping_city: row.shipping_city,
            shipping_state: row.shipping_state,
            shipping_postal_code: row.shipping_postal_code,
            shipping_country: row.shipping_country,
            billing_address_line1: row.billing_address_line1,
            billing_address_line2: row.billing_address_line2,
            billing_city: row.billing_city,
            billing_state: row.billing_state,
            billing_postal_code: row.billing_postal_code,
            billing_country: row.billing_country,
            currency: row.currency,
            amount_subtotal: Cents::new(row.amount_subtotal),
            amount_total: Cents::new(row.amount_total),
            amount_tax: Cents::new(row.amount_tax),
            amount_shipping: Cents::new(row.amount_shipping),
            payment_status,
            shipping_status,
            shipping_carrier: row.shipping_carrier,
            tracking_number: row.tracking_number,
            metadata: row.metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str = r"
    id, stripe_session_id, customer_email, customer_name, customer_phone,
    requires_shipping, shipping_name, shipping_address_line1,
    shipping_address_line2, shipping_city, shipping_state,
    shipping_postal_code, shipping_country, billing_address_line1,
    billing_address_line2, billing_city, billing_state,
    billing_postal_code, billing_country, currency, amount_subtotal,
    amount_total, amount_tax, amount_shipping, payment_status,
    shipping_status, shipping_carrier, tracking_number, metadata,
    created_at, updated_at
";

/// Read-only order access.
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    /// Create a new order repository over the shared pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List orders, newest first, optionally filtered by customer email.
    ///
    /// The limit is clamped to 1..=100.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupted.
    #[instrument(skip(self, filter))]
    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let limit = filter.limit.unwrap_or(50).clamp(1, MAX_PAGE_SIZE);
        let offset = filter.offset.unwrap_or(0).max(0);
        let pattern = filter.query.as_ref().map(|q| format!("%{q}%"));

        let sql = format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE $1::text IS NULL OR customer_email ILIKE $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "
        );

        let rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Fetch a single order by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] for an unknown id.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get(&self, id: &OrderId) -> Result<Order, RepositoryError> {
        let sql = format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE id = $1
            "
        );

        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Order::try_from)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }
}
