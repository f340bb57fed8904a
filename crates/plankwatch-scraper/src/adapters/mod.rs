//! Retailer adapters: one per integration shape.
//!
//! An adapter owns its browser session, its circuit breaker, and its
//! recycling counter; nothing here is shared across adapters, so two
//! adapters never pollute each other's failure streaks or network identity.
//!
//! The reduction path from a raw offer to a [`ScrapedProduct`] is common to
//! both retailers and lives here: it enforces the price invariant, drops
//! species-less items, applies catalog-typical dimension defaults, and
//! derives the wear-layer value for engineered planks.

mod home_depot;
mod lowes;

pub use home_depot::HomeDepotAdapter;
pub use lowes::LowesAdapter;

use std::time::Duration;

use plankwatch_core::{
    external_id, AppConfig, ProductType, RegionStore, Retailer, ScrapedProduct,
};

use crate::error::ScrapeError;
use crate::resilience::BackoffPolicy;
use crate::title;

/// Grid page size both retailers paginate by.
pub(crate) const PAGE_SIZE: usize = 24;

/// Consecutive empty pages (beyond page 1) before pagination stops early.
pub(crate) const EMPTY_PAGE_STOP: usize = 2;

/// Dimension defaults applied when a title carries no parseable dimensions.
/// 3/4" × 5" × 48" is the modal solid-hardwood plank in both catalogs.
const DEFAULT_THICKNESS_IN: f64 = 0.75;
const DEFAULT_WIDTH_IN: f64 = 5.0;
const DEFAULT_LENGTH_IN: f64 = 48.0;

/// One category listing to paginate: URL path, a type hint for items whose
/// titles carry no construction evidence, and a page cap.
#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub path: &'static str,
    pub hint: &'static str,
    pub max_pages: usize,
}

/// The common contract every retailer integration implements. Selection is
/// by the closed [`Retailer`] enum, never by open-ended dispatch.
pub trait RetailerAdapter {
    fn retailer(&self) -> Retailer;

    /// Produces the full set of products for one region, handling
    /// pagination, regional context, retries, and session recycling.
    fn scrape_region(
        &mut self,
        store: &RegionStore,
    ) -> impl std::future::Future<Output = Result<Vec<ScrapedProduct>, ScrapeError>> + Send;

    /// Tears down any live browser session.
    fn shutdown(self) -> impl std::future::Future<Output = ()> + Send;
}

/// Everything an adapter needs from [`AppConfig`], copied out so adapters
/// never hold the full config (which carries credentials).
#[derive(Debug, Clone)]
pub struct AdapterSettings {
    pub nav_timeout: Duration,
    pub nav_max_attempts: u32,
    pub backoff: BackoffPolicy,
    pub breaker_threshold: u32,
    pub breaker_cooldown: Duration,
    pub page_delay_min_ms: u64,
    pub page_delay_max_ms: u64,
    pub failure_delay_step_ms: u64,
    pub in_ci: bool,
    pub recycle_interval_regions: usize,
}

impl AdapterSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            nav_timeout: Duration::from_secs(config.nav_timeout_secs),
            nav_max_attempts: config.nav_max_attempts,
            backoff: BackoffPolicy::default(),
            breaker_threshold: config.breaker_threshold,
            breaker_cooldown: Duration::from_secs(config.breaker_cooldown_secs),
            page_delay_min_ms: config.page_delay_min_ms,
            page_delay_max_ms: config.page_delay_max_ms,
            failure_delay_step_ms: config.failure_delay_step_ms,
            in_ci: config.env.is_ci(),
            recycle_interval_regions: config.recycle_interval_regions,
        }
    }
}

/// Grid offset for a 1-based page number.
#[must_use]
pub(crate) fn page_offset(page: usize) -> usize {
    (page - 1) * PAGE_SIZE
}

/// Wear-layer lookup for engineered planks, keyed by total thickness.
/// The values reproduce the source catalog convention exactly.
#[must_use]
pub(crate) fn veneer_for_thickness(thickness: f64) -> f64 {
    if thickness <= 0.375 {
        0.08
    } else if thickness <= 0.5 {
        0.12
    } else if thickness <= 0.625 {
        0.16
    } else {
        0.24
    }
}

/// A raw offer as pulled off a page, before any invariant is enforced.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawOffer {
    pub sku: Option<String>,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub url: Option<String>,
    pub price_per_sqft: Option<f64>,
}

/// Reduces a raw offer to a canonical record, or drops it.
///
/// Drops are silent so a malformed item never aborts a page. Dropped:
/// missing SKU/title/price, price outside (0, 30], or no recognizable
/// species in the title.
pub(crate) fn reduce_offer(
    retailer: Retailer,
    store: &RegionStore,
    category_hint: &str,
    offer: RawOffer,
) -> Option<ScrapedProduct> {
    let sku = offer.sku?;
    let title_text = offer.title?;
    let url = offer.url?;
    let price = offer.price_per_sqft?;

    if !(price > 0.0 && price <= 30.0) {
        return None;
    }

    let attrs = title::parse_title(&title_text);
    let species = attrs.species?;

    let product_type = title::detect_type(&title_text, Some(category_hint));
    let thickness = attrs.thickness.unwrap_or(DEFAULT_THICKNESS_IN);
    let width = attrs.width.unwrap_or(DEFAULT_WIDTH_IN);
    let length = attrs.length.unwrap_or(DEFAULT_LENGTH_IN);

    let veneer_thickness = match product_type {
        ProductType::Engineered => Some(veneer_for_thickness(thickness)),
        ProductType::Solid | ProductType::Unfinished => None,
    };

    Some(ScrapedProduct {
        species,
        product_type,
        width,
        thickness,
        veneer_thickness,
        finish: attrs.finish,
        grade: attrs.grade,
        janka_hardness: attrs.janka_hardness,
        price_per_sqft: price,
        brand: offer.brand.unwrap_or_else(|| "Unknown".to_string()),
        url,
        length,
        external_id: external_id(retailer, store.region_id, &sku),
    })
}
