//! Site settings repository.
//!
//! Settings are a singleton row; reads fall back to defaults when the row
//! has never been written.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::SiteSettings;

/// Default shipment grouping window in days.
const DEFAULT_SHIPMENT_GROUPING_DAYS: i32 = 7;

/// Bounds for the shipment grouping window.
pub const SHIPMENT_GROUPING_DAYS_RANGE: std::ops::RangeInclusive<i32> = 1..=30;

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    id: String,
    shipment_grouping_days: i32,
    updated_at: DateTime<Utc>,
}

impl From<SettingsRow> for SiteSettings {
    fn from(row: SettingsRow) -> Self {
        Self {
            id: row.id,
            shipment_grouping_days: row.shipment_grouping_days,
            updated_at: row.updated_at,
        }
    }
}

/// Access to the site settings singleton.
#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    /// Create a new settings repository over the shared pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the shipping settings, defaulting when none are stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn shipping_settings(&self) -> Result<SiteSettings, RepositoryError> {
        let row: Option<SettingsRow> = sqlx::query_as(
            r"
            SELECT id, shipment_grouping_days, updated_at
            FROM site_settings
            LIMIT 1
            ",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map_or_else(
            || SiteSettings {
                id: Uuid::new_v4().to_string(),
                shipment_grouping_days: DEFAULT_SHIPMENT_GROUPING_DAYS,
                updated_at: Utc::now(),
            },
            SiteSettings::from,
        ))
    }

    /// Update the shipment grouping window, creating the row on first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    #[instrument(skip(self))]
    pub async fn update_shipment_grouping_days(
        &self,
        days: i32,
    ) -> Result<SiteSettings, RepositoryError> {
        let existing: Option<SettingsRow> = sqlx::query_as(
            r"
            SELECT id, shipment_grouping_days, updated_at
            FROM site_settings
            LIMIT 1
            ",
        )
        .fetch_optional(&self.pool)
        .await?;

        let row: SettingsRow = if let Some(existing) = existing {
            sqlx::query_as(
                r"
                UPDATE site_settings
                SET shipment_grouping_days = $2, updated_at = now()
                WHERE id = $1
                RETURNING id, shipment_grouping_days, updated_at
                ",
            )
            .bind(&existing.id)
            .bind(days)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_as(
                r"
                INSERT INTO site_settings (id, shipment_grouping_days)
                VALUES ($1, $2)
                RETURNING id, shipment_grouping_days, updated_at
                ",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(days)
            .fetch_one(&self.pool)
            .await?
        };

        Ok(row.into())
    }
}
