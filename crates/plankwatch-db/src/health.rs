//! Post-run validation queries.
//!
//! All counts are restricted to rows written by the current pipeline
//! (`external_id IS NOT NULL`) so legacy rows never mask a thin run.

use sqlx::PgPool;

use plankwatch_core::Retailer;

use crate::DbError;

/// Distinct regions with current-pipeline rows for `retailer`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn distinct_region_count(pool: &PgPool, retailer: Retailer) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT region_id) FROM products \
         WHERE retailer = $1 AND external_id IS NOT NULL",
    )
    .bind(retailer.label())
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Current-pipeline row count for `retailer`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn product_count(pool: &PgPool, retailer: Retailer) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM products WHERE retailer = $1 AND external_id IS NOT NULL",
    )
    .bind(retailer.label())
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Rows whose price fell outside the plausible retail band. The write path
/// enforces (0, 30]; anything under $1 is also suspicious enough to flag.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn out_of_range_price_count(pool: &PgPool) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM products \
         WHERE external_id IS NOT NULL \
           AND (price_per_sqft < 1.0 OR price_per_sqft > 30.0)",
    )
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Total current-pipeline rows across both retailers.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn total_scraped_count(pool: &PgPool) -> Result<i64, DbError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE external_id IS NOT NULL")
            .fetch_one(pool)
            .await?;
    Ok(count)
}
