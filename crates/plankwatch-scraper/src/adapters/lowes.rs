//! Lowe's adapter.
//!
//! Lowe's server-renders its grid and embeds the catalog state in a
//! `window.__PRELOADED_STATE__` blob. The primary path walks that blob in
//! page JS and hands back flat cards; when a layout variant hides the blob,
//! a DOM fallback scrapes the visible product tiles with a list of selector
//! candidates. Both paths normalize to the same card shape before crossing
//! into Rust, so the reduction code never knows which one ran.
//!
//! Regional context is cookie-driven (`sn` store number, `zipcode`) and the
//! server honors it on first paint, so no request interception is needed here.

use std::time::Duration;

use plankwatch_core::{RegionStore, Retailer, ScrapedProduct};

use crate::adapters::{
    page_offset, reduce_offer, AdapterSettings, Category, RawOffer, RetailerAdapter,
    EMPTY_PAGE_STOP,
};
use crate::browser::StealthSession;
use crate::error::ScrapeError;
use crate::profile::SessionProfile;
use crate::resilience::{jittered_sleep, with_navigation_retry, CircuitBreaker, DelayBounds};
use crate::types::LowesCard;

const LOWES_BASE: &str = "https://www.lowes.com";

/// Pause after relaunching a recycled browser before the first navigation.
const SESSION_SETTLE: Duration = Duration::from_secs(2);

const CATEGORIES: &[Category] = &[
    Category {
        path: "/pl/flooring/hardwood-flooring/solid-hardwood-flooring/4294857975",
        hint: "solid-hardwood",
        max_pages: 6,
    },
    Category {
        path: "/pl/flooring/hardwood-flooring/engineered-hardwood-flooring/4294857976",
        hint: "engineered-hardwood",
        max_pages: 6,
    },
];

/// Walks the known embedded-state paths and emits flat cards as a JSON
/// string, or `null` when no path holds items.
const EMBEDDED_STATE_JS: &str = r#"
(() => {
    const state = window.__PRELOADED_STATE__;
    if (!state) return null;
    const candidates = [
        state.itemList,
        state.searchResults && state.searchResults.itemList,
        state.productResults && state.productResults.items,
    ];
    for (const items of candidates) {
        if (!Array.isArray(items) || items.length === 0) continue;
        return JSON.stringify(items.map((item) => {
            const p = item.product || item;
            const price = item.price || p.price || {};
            return {
                title: p.description || p.title || null,
                brand: p.brand || null,
                priceText: (price.pricingDisplay || price.displayPrice ||
                            (price.sellingPrice != null ? String(price.sellingPrice) : null)),
                link: p.pdURL || p.link || null,
                sku: p.omniItemId || p.itemNumber || null,
            };
        }));
    }
    return null;
})()
"#;

/// DOM fallback: scrapes visible product tiles across layout variants.
const DOM_FALLBACK_JS: &str = r#"
(() => {
    const tileSelectors = ['[data-selector="prd-tile"]', '[data-test="product-tile"]', '.plp-tile'];
    let tiles = [];
    for (const sel of tileSelectors) {
        tiles = Array.from(document.querySelectorAll(sel));
        if (tiles.length > 0) break;
    }
    const text = (tile, sels) => {
        for (const sel of sels) {
            const el = tile.querySelector(sel);
            if (el && el.textContent.trim()) return el.textContent.trim();
        }
        return null;
    };
    return JSON.stringify(tiles.map((tile) => {
        const anchor = tile.querySelector('a[href*="/pd/"]');
        return {
            title: text(tile, ['[data-selector="prd-title"]', '.description', 'h3']),
            brand: text(tile, ['[data-selector="prd-brand"]', '.brand']),
            priceText: text(tile, ['[data-selector="prd-price"]', '.price', '[aria-label*="$"]']),
            link: anchor ? anchor.getAttribute('href') : null,
            sku: null,
        };
    }));
})()
"#;

/// Parses a display price like `"$2.99/sq. ft."` or `"$1,299.00"` into the
/// leading numeric value.
fn parse_price_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .chars()
        .filter(|c| *c != ',')
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse::<f64>().ok()
}

/// Extracts the numeric SKU from a product-page link's trailing segment.
fn sku_from_link(link: &str) -> Option<String> {
    let path = link.split(['?', '#']).next()?;
    let segment = path.rsplit('/').find(|s| !s.is_empty())?;
    if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
        Some(segment.to_owned())
    } else {
        None
    }
}

pub struct LowesAdapter {
    settings: AdapterSettings,
    breaker: CircuitBreaker,
    session: Option<StealthSession>,
    regions_on_session: usize,
    region_index: usize,
}

impl LowesAdapter {
    #[must_use]
    pub fn new(settings: AdapterSettings) -> Self {
        let breaker = CircuitBreaker::new(settings.breaker_threshold, settings.breaker_cooldown);
        Self {
            settings,
            breaker,
            session: None,
            regions_on_session: 0,
            region_index: 0,
        }
    }

    async fn teardown_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.close().await;
        }
        self.regions_on_session = 0;
    }

    async fn begin_region(&mut self, store: &RegionStore) -> Result<(), ScrapeError> {
        if self.regions_on_session >= self.settings.recycle_interval_regions {
            tracing::info!(
                regions = self.regions_on_session,
                "recycling browser session"
            );
            self.teardown_session().await;
            tokio::time::sleep(SESSION_SETTLE).await;
        }

        if self.session.is_none() {
            let profile = SessionProfile::for_region_index(self.region_index);
            tracing::debug!(?profile, "launching browser session");
            self.session = Some(StealthSession::launch(profile, self.settings.nav_timeout).await?);
        }

        let session = self.session.as_ref().ok_or_else(|| {
            ScrapeError::Session("session unavailable after launch".to_owned())
        })?;
        session
            .set_cookies(
                ".lowes.com",
                &[
                    ("sn", store.lowes_store_id.to_owned()),
                    ("zipcode", store.zip.to_owned()),
                ],
            )
            .await?;

        self.region_index += 1;
        self.regions_on_session += 1;
        Ok(())
    }

    /// Reads the cards for the page the session currently shows: embedded
    /// state first, DOM tiles as fallback.
    async fn extract_cards(session: &StealthSession, url: &str) -> Result<Vec<LowesCard>, ScrapeError> {
        let mut value = session.evaluate_json(EMBEDDED_STATE_JS).await?;
        if value.is_null() {
            tracing::debug!(url, "embedded state missing, falling back to DOM tiles");
            value = session.evaluate_json(DOM_FALLBACK_JS).await?;
        }

        let serde_json::Value::String(encoded) = value else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&encoded).map_err(|source| ScrapeError::Deserialize {
            context: url.to_owned(),
            source,
        })
    }

    async fn scrape_page(
        &mut self,
        store: &RegionStore,
        category: &Category,
        page: usize,
    ) -> Result<Vec<ScrapedProduct>, ScrapeError> {
        if let Some(cooldown) = self.breaker.cooldown_due() {
            tracing::warn!(
                cooldown_secs = cooldown.as_secs(),
                "failure streak reached threshold, cooling down"
            );
            tokio::time::sleep(cooldown).await;
        }

        let session = self
            .session
            .as_ref()
            .ok_or_else(|| ScrapeError::Session("no active session".to_owned()))?;

        let url = format!("{LOWES_BASE}{}?offset={}", category.path, page_offset(page));
        with_navigation_retry(
            &mut self.breaker,
            self.settings.backoff,
            self.settings.nav_max_attempts,
            || session.navigate(&url),
        )
        .await?;

        let cards = Self::extract_cards(session, &url).await?;
        let products = cards
            .into_iter()
            .filter_map(|card| {
                let sku = card
                    .sku
                    .or_else(|| card.link.as_deref().and_then(sku_from_link));
                let offer = RawOffer {
                    sku,
                    title: card.title,
                    brand: card.brand,
                    url: card.link.map(|link| {
                        if link.starts_with("http") {
                            link
                        } else {
                            format!("{LOWES_BASE}{link}")
                        }
                    }),
                    price_per_sqft: card.price_text.as_deref().and_then(parse_price_text),
                };
                reduce_offer(Retailer::Lowes, store, category.hint, offer)
            })
            .collect();

        Ok(products)
    }

    async fn page_delay(&self) {
        let bounds = DelayBounds::scaled(
            self.settings.page_delay_min_ms,
            self.settings.page_delay_max_ms,
            self.settings.in_ci,
            self.breaker.consecutive_failures(),
            self.settings.failure_delay_step_ms,
        );
        jittered_sleep(bounds).await;
    }
}

impl RetailerAdapter for LowesAdapter {
    fn retailer(&self) -> Retailer {
        Retailer::Lowes
    }

    async fn scrape_region(
        &mut self,
        store: &RegionStore,
    ) -> Result<Vec<ScrapedProduct>, ScrapeError> {
        self.begin_region(store).await?;

        let mut products = Vec::new();
        for category in CATEGORIES {
            let mut empty_streak = 0usize;
            for page in 1..=category.max_pages {
                let page_products = self.scrape_page(store, category, page).await?;
                let count = page_products.len();
                products.extend(page_products);

                tracing::debug!(
                    region = store.region_id,
                    category = category.hint,
                    page,
                    count,
                    "scraped catalog page"
                );

                if count == 0 && page > 1 {
                    empty_streak += 1;
                    if empty_streak >= EMPTY_PAGE_STOP {
                        break;
                    }
                } else {
                    empty_streak = 0;
                }

                self.page_delay().await;
            }
        }

        Ok(products)
    }

    async fn shutdown(mut self) {
        self.teardown_session().await;
    }
}
