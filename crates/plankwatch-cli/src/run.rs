//! Run orchestration: preflight, scraping both retailers region by region,
//! persistence, cleanup, and the post-run validation battery.
//!
//! Per-region failures are logged and skipped rather than propagated so a
//! single blocked region does not abort the full run. Only preflight, the
//! database connection, and migrations are fatal.

use std::collections::HashSet;
use std::time::Duration;

use plankwatch_core::{AppConfig, RegionStore, Retailer, REGION_STORES};
use plankwatch_db::products::{delete_stale_products, fresh_region_ids, upsert_products};
use plankwatch_db::{
    connect_pool, ensure_external_id_column, health, run_migrations, PoolConfig,
};
use plankwatch_scraper::resilience::{jittered_sleep, DelayBounds};
use plankwatch_scraper::{
    AdapterSettings, HomeDepotAdapter, LowesAdapter, RetailerAdapter, SessionProfile,
    StealthSession,
};

use crate::report::{HealthCheck, RetailerSummary, RunReport};

const PREFLIGHT_URL: &str = "https://www.homedepot.com";

/// Minimum rows a full Home Depot pass is expected to produce.
const MIN_HD_PRODUCTS: i64 = 100;
/// Minimum combined rows across both retailers after a full run.
const MIN_COMBINED_PRODUCTS: i64 = 500;

#[derive(Debug)]
pub enum RunStatus {
    Success,
    ValidationFailed,
    PreflightBlocked,
}

pub async fn execute(
    config: &AppConfig,
    test_mode: bool,
    only_retailer: Option<Retailer>,
) -> anyhow::Result<RunStatus> {
    let started = std::time::Instant::now();

    if !preflight(config).await? {
        tracing::error!("preflight navigation was blocked, aborting before scraping");
        return Ok(RunStatus::PreflightBlocked);
    }

    let pool = connect_pool(&config.database_url, PoolConfig::from_app_config(config)).await?;
    run_migrations(&pool).await?;
    ensure_external_id_column(&pool).await?;

    let retailers: Vec<Retailer> = match only_retailer {
        Some(retailer) => vec![retailer],
        None => Retailer::all().to_vec(),
    };

    let settings = AdapterSettings::from_config(config);
    let mut report = RunReport::default();

    for (i, &retailer) in retailers.iter().enumerate() {
        if i > 0 {
            tracing::info!(
                pause_secs = config.retailer_pause_secs,
                "pausing between retailers"
            );
            tokio::time::sleep(Duration::from_secs(config.retailer_pause_secs)).await;
        }

        let summary = match retailer {
            Retailer::HomeDepot => {
                scrape_retailer(
                    HomeDepotAdapter::new(settings.clone()),
                    &pool,
                    config,
                    test_mode,
                )
                .await?
            }
            Retailer::Lowes => {
                scrape_retailer(LowesAdapter::new(settings.clone()), &pool, config, test_mode)
                    .await?
            }
        };
        report.retailers.push(summary);
    }

    report.stale_removed = delete_stale_products(&pool, config.retention_days).await?;

    if test_mode {
        tracing::info!("test mode, skipping validation gate");
        report.log();
        tracing::info!(elapsed_secs = started.elapsed().as_secs(), "run complete");
        return Ok(RunStatus::Success);
    }

    report.checks = validate(&pool, &retailers).await?;
    report.log();
    tracing::info!(elapsed_secs = started.elapsed().as_secs(), "run complete");

    if report.all_checks_passed() {
        Ok(RunStatus::Success)
    } else {
        Ok(RunStatus::ValidationFailed)
    }
}

/// One throwaway navigation to the retailer root before committing to a full
/// run. A block here means the egress IP is burned and every region would
/// fail the same way.
async fn preflight(config: &AppConfig) -> anyhow::Result<bool> {
    let session = StealthSession::launch(
        SessionProfile::for_region_index(0),
        Duration::from_secs(config.nav_timeout_secs),
    )
    .await?;

    let outcome = session.navigate(PREFLIGHT_URL).await;
    session.close().await;

    match outcome {
        Ok(nav) => {
            tracing::info!(status = ?nav.status, "preflight navigation succeeded");
            Ok(true)
        }
        Err(e) if e.is_blocked() => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Regions skipped because a fresh row already covers them. Distinct from
/// regions a test-mode run leaves untaken.
fn fresh_skip_count(all: &[RegionStore], fresh: &HashSet<String>) -> usize {
    all.iter()
        .filter(|store| fresh.contains(store.region_id))
        .count()
}

/// The regions a retailer pass should visit: everything without a fresh row,
/// or just the first such region in test mode.
fn regions_to_scrape<'a>(
    all: &'a [RegionStore],
    fresh: &HashSet<String>,
    test_mode: bool,
) -> Vec<&'a RegionStore> {
    let unvisited = all.iter().filter(|store| !fresh.contains(store.region_id));
    if test_mode {
        unvisited.take(1).collect()
    } else {
        unvisited.collect()
    }
}

async fn scrape_retailer<A: RetailerAdapter>(
    mut adapter: A,
    pool: &sqlx::PgPool,
    config: &AppConfig,
    test_mode: bool,
) -> anyhow::Result<RetailerSummary> {
    let retailer = adapter.retailer();
    let fresh = fresh_region_ids(pool, retailer, config.freshness_window_hours).await?;
    let targets = regions_to_scrape(REGION_STORES, &fresh, test_mode);

    let mut summary = RetailerSummary {
        retailer,
        regions_scraped: 0,
        regions_skipped: fresh_skip_count(REGION_STORES, &fresh),
        regions_failed: 0,
        products_written: 0,
    };
    tracing::info!(
        retailer = retailer.label(),
        targets = targets.len(),
        skipped_fresh = summary.regions_skipped,
        "starting retailer pass"
    );

    let region_delay = DelayBounds::scaled(
        config.region_delay_min_ms,
        config.region_delay_max_ms,
        config.env.is_ci(),
        0,
        0,
    );

    let target_count = targets.len();
    for (i, store) in targets.into_iter().enumerate() {
        match adapter.scrape_region(store).await {
            Ok(products) if products.is_empty() => {
                tracing::warn!(
                    retailer = retailer.label(),
                    region = store.region_id,
                    "region produced no products"
                );
                summary.regions_scraped += 1;
            }
            Ok(products) => {
                let written =
                    upsert_products(pool, store.region_id, retailer, &products).await?;
                tracing::info!(
                    retailer = retailer.label(),
                    region = store.region_id,
                    written,
                    "region persisted"
                );
                summary.regions_scraped += 1;
                summary.products_written += written;
            }
            Err(e) => {
                tracing::error!(
                    retailer = retailer.label(),
                    region = store.region_id,
                    error = %e,
                    "region failed, continuing with next region"
                );
                summary.regions_failed += 1;
            }
        }

        if i + 1 < target_count {
            jittered_sleep(region_delay).await;
        }
    }

    adapter.shutdown().await;
    Ok(summary)
}

/// Post-run validation battery. Only the checks applicable to the retailers
/// that actually ran are evaluated.
async fn validate(
    pool: &sqlx::PgPool,
    retailers: &[Retailer],
) -> anyhow::Result<Vec<HealthCheck>> {
    let required_regions = required_region_count(REGION_STORES.len());
    let mut checks = Vec::new();

    for &retailer in retailers {
        let regions = health::distinct_region_count(pool, retailer).await?;
        checks.push(HealthCheck::new(
            match retailer {
                Retailer::HomeDepot => "home depot region coverage",
                Retailer::Lowes => "lowes region coverage",
            },
            regions >= required_regions,
            format!("{regions}/{required_regions} regions"),
        ));
    }

    if retailers.contains(&Retailer::HomeDepot) {
        let count = health::product_count(pool, Retailer::HomeDepot).await?;
        checks.push(HealthCheck::new(
            "home depot product volume",
            count >= MIN_HD_PRODUCTS,
            format!("{count} rows (min {MIN_HD_PRODUCTS})"),
        ));
    }

    let bad_prices = health::out_of_range_price_count(pool).await?;
    checks.push(HealthCheck::new(
        "price range sanity",
        bad_prices == 0,
        format!("{bad_prices} rows outside $1-$30/sq. ft."),
    ));

    if retailers.len() == Retailer::all().len() {
        let total = health::total_scraped_count(pool).await?;
        checks.push(HealthCheck::new(
            "combined product volume",
            total >= MIN_COMBINED_PRODUCTS,
            format!("{total} rows (min {MIN_COMBINED_PRODUCTS})"),
        ));
    }

    Ok(checks)
}

/// Half the registry, rounded up.
fn required_region_count(total: usize) -> i64 {
    i64::try_from(total.div_ceil(2)).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_regions_are_skipped() {
        let fresh: HashSet<String> = ["pacific-northwest", "southeast"]
            .iter()
            .map(|s| (*s).to_owned())
            .collect();

        let targets = regions_to_scrape(REGION_STORES, &fresh, false);
        assert_eq!(targets.len(), REGION_STORES.len() - 2);
        assert!(targets.iter().all(|s| !fresh.contains(s.region_id)));
    }

    #[test]
    fn test_mode_takes_a_single_unvisited_region() {
        let fresh: HashSet<String> =
            std::iter::once(REGION_STORES[0].region_id.to_owned()).collect();

        let targets = regions_to_scrape(REGION_STORES, &fresh, true);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].region_id, REGION_STORES[1].region_id);
    }

    #[test]
    fn everything_fresh_means_nothing_to_scrape() {
        let fresh: HashSet<String> = REGION_STORES
            .iter()
            .map(|s| s.region_id.to_owned())
            .collect();
        assert!(regions_to_scrape(REGION_STORES, &fresh, false).is_empty());
        assert!(regions_to_scrape(REGION_STORES, &fresh, true).is_empty());
    }

    #[test]
    fn skip_count_reflects_freshness_not_test_truncation() {
        let fresh: HashSet<String> =
            std::iter::once(REGION_STORES[0].region_id.to_owned()).collect();

        // Test mode visits one region; the other eleven untaken regions are
        // not "skipped fresh".
        let targets = regions_to_scrape(REGION_STORES, &fresh, true);
        assert_eq!(targets.len(), 1);
        assert_eq!(fresh_skip_count(REGION_STORES, &fresh), 1);

        let none_fresh = HashSet::new();
        assert_eq!(fresh_skip_count(REGION_STORES, &none_fresh), 0);
    }

    #[test]
    fn region_gate_is_half_the_registry_rounded_up() {
        assert_eq!(required_region_count(13), 7);
        assert_eq!(required_region_count(12), 6);
    }
}
