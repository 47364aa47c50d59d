//! Order persistence for completed checkout sessions.
//!
//! Orders are the durable record of a checkout; they are written exactly
//! once per Stripe session, driven by the `checkout.session.completed`
//! webhook. Stripe redelivers events, so inserts are idempotent on the
//! session id.

use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use clementine_core::{Cents, PaymentStatus};

use super::RepositoryError;

/// A new order derived from a completed checkout session.
#[derive(Debug, Clone)]
pub struct NewOrder {
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
    pub metadata: serde_json::Value,
}

/// Write-side order access for the webhook handler.
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

    /// Record an order for a completed session.
    ///
    /// Returns `false` when an order for this session already exists (event
    /// redelivery); the existing row is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, order), fields(session_id = %order.stripe_session_id))]
    pub async fn record_completed_session(
        &self,
        order: &NewOrder,
    ) -> Result<bool, RepositoryError> {
        let id = Uuid::new_v4().to_string();

        let result = sqlx::query(
            r"
            INSERT INTO orders (
                id, stripe_session_id, customer_email, customer_name,
                customer_phone, requires_shipping,
                shipping_name, shipping_address_line1, shipping_address_line2,
                shipping_city, shipping_state, shipping_postal_code, shipping_country,
                billing_address_line1, billing_address_line2,
                billing_city, billing_state, billing_postal_code, billing_country,
                currency, amount_subtotal, amount_total, amount_tax, amount_shipping,
                payment_status, shipping_status, metadata
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24,
                $25, 'pending', $26
            )
            ON CONFLICT (stripe_session_id) DO NOTHING
            ",
        )
        .bind(&id)
        .bind(&order.stripe_session_id)
        .bind(&order.customer_email)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(order.requires_shipping)
        .bind(&order.shipping_name)
        .bind(&order.shipping_address_line1)
        .bind(&order.shipping_address_line2)
        .bind(&order.shipping_city)
        .bind(&order.shipping_state)
        .bind(&order.shipping_postal_code)
        .bind(&order.shipping_country)
        .bind(&order.billing_address_line1)
        .bind(&order.billing_address_line2)
        .bind(&order.billing_city)
        .bind(&order.billing_state)
        .bind(&order.billing_postal_code)
        .bind(&order.billing_country)
        .bind(&order.currency)
        .bind(order.amount_subtotal)
        .bind(order.amount_total)
        .bind(order.amount_tax)
        .bind(order.amount_shipping)
        .bind(order.payment_status.to_string())
        .bind(&order.metadata)
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected() > 0;
        if inserted {
            info!(order_id = %id, "Order recorded");
        } else {
            info!("Order already recorded for session, skipping");
        }

        Ok(inserted)
    }
}
