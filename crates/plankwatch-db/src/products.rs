//! Write path and freshness queries for the `products` table.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use sqlx::PgPool;

use plankwatch_core::{Retailer, ScrapedProduct};

use crate::DbError;

/// Rows per transaction in [`upsert_products`]. Keeps any single transaction
/// short so a mid-run failure loses at most one batch.
const UPSERT_BATCH_SIZE: usize = 50;

/// Upserts a region's products, keyed on `external_id`. Re-scraped items
/// update their volatile fields (price, brand, url, finish, grade) and bump
/// `last_updated`; the physical attributes were derived from the same title
/// and are left alone.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on any statement or transaction failure.
pub async fn upsert_products(
    pool: &PgPool,
    region_id: &str,
    retailer: Retailer,
    products: &[ScrapedProduct],
) -> Result<u64, DbError> {
    let mut written = 0u64;

    for batch in products.chunks(UPSERT_BATCH_SIZE) {
        let mut tx = pool.begin().await?;
        for product in batch {
            sqlx::query(
                "INSERT INTO products \
                   (region_id, product_type, species, width, thickness, veneer_thickness, \
                    finish, grade, janka_hardness, length, price_per_sqft, retailer, brand, \
                    url, external_id, last_updated) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, NOW()) \
                 ON CONFLICT (external_id) WHERE external_id IS NOT NULL DO UPDATE SET \
                     price_per_sqft = EXCLUDED.price_per_sqft, \
                     brand          = EXCLUDED.brand, \
                     url            = EXCLUDED.url, \
                     finish         = EXCLUDED.finish, \
                     grade          = EXCLUDED.grade, \
                     last_updated   = NOW()",
            )
            .bind(region_id)
            .bind(product.product_type.as_str())
            .bind(&product.species)
            .bind(product.width)
            .bind(product.thickness)
            .bind(product.veneer_thickness)
            .bind(&product.finish)
            .bind(&product.grade)
            .bind(product.janka_hardness)
            .bind(product.length)
            .bind(product.price_per_sqft)
            .bind(retailer.label())
            .bind(&product.brand)
            .bind(&product.url)
            .bind(&product.external_id)
            .execute(&mut *tx)
            .await?;
            written += 1;
        }
        tx.commit().await?;
    }

    Ok(written)
}

/// Deletes scraped rows not refreshed within `retention_days`. Seed rows
/// (NULL `external_id`) are never touched. Returns the number of rows
/// removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_stale_products(pool: &PgPool, retention_days: i64) -> Result<u64, DbError> {
    let cutoff = Utc::now() - Duration::days(retention_days);
    let result =
        sqlx::query("DELETE FROM products WHERE external_id IS NOT NULL AND last_updated < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}

/// Region ids with at least one row for `retailer` refreshed within
/// `freshness_hours`. The orchestrator skips these regions entirely.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn fresh_region_ids(
    pool: &PgPool,
    retailer: Retailer,
    freshness_hours: i64,
) -> Result<HashSet<String>, DbError> {
    let cutoff = Utc::now() - Duration::hours(freshness_hours);
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT region_id FROM products \
         WHERE retailer = $1 \
           AND external_id IS NOT NULL \
           AND last_updated > $2",
    )
    .bind(retailer.label())
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(region_id,)| region_id).collect())
}
