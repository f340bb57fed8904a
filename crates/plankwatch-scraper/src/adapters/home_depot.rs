//! Home Depot adapter.
//!
//! The product grid is a client-rendered app that fetches its data through a
//! GraphQL POST. Scraping the DOM races hydration, so this adapter reads the
//! wire instead: it arms a response capture for the GraphQL call before each
//! navigation and parses the captured `searchModel` JSON.
//!
//! Regional pricing needs the outbound request to carry the store id and ZIP
//! in its GraphQL variables; cookies alone do not localize the API call. A
//! fetch-domain interceptor rewrites the POST body in flight.

use std::time::Duration;

use tokio::task::JoinHandle;

use plankwatch_core::{RegionStore, Retailer, ScrapedProduct};

use crate::adapters::{
    page_offset, reduce_offer, AdapterSettings, Category, RawOffer, RetailerAdapter,
    EMPTY_PAGE_STOP, PAGE_SIZE,
};
use crate::browser::StealthSession;
use crate::error::ScrapeError;
use crate::profile::SessionProfile;
use crate::resilience::{jittered_sleep, with_navigation_retry, CircuitBreaker, DelayBounds};
use crate::types::SearchEnvelope;

const HD_BASE: &str = "https://www.homedepot.com";
const GRAPHQL_FRAGMENT: &str = "graphql";

/// How long to wait for the catalog response after a navigation completes.
const CAPTURE_TIMEOUT: Duration = Duration::from_secs(15);

/// Pause after relaunching a recycled browser before the first navigation.
const SESSION_SETTLE: Duration = Duration::from_secs(2);

const CATEGORIES: &[Category] = &[
    Category {
        path: "/b/Flooring-Hardwood-Flooring-Solid-Hardwood/N-5yc1vZar7t",
        hint: "solid-hardwood",
        max_pages: 6,
    },
    Category {
        path: "/b/Flooring-Hardwood-Flooring-Engineered-Hardwood/N-5yc1vZaqsu",
        hint: "engineered-hardwood",
        max_pages: 6,
    },
];

/// Rewrites a GraphQL search POST body to pin `storeId` and `zipCode`.
///
/// Returns `None` for bodies that are not the product search (other GraphQL
/// operations share the endpoint) or that do not parse; those pass through
/// untouched.
fn rewrite_search_body(body: &str, store_id: &str, zip: &str) -> Option<String> {
    if !body.contains("searchModel") {
        return None;
    }
    let mut value: serde_json::Value = serde_json::from_str(body).ok()?;
    let variables = value.get_mut("variables")?.as_object_mut()?;
    variables.insert("storeId".to_owned(), serde_json::Value::from(store_id));
    variables.insert("zipCode".to_owned(), serde_json::Value::from(zip));
    serde_json::to_string(&value).ok()
}

pub struct HomeDepotAdapter {
    settings: AdapterSettings,
    breaker: CircuitBreaker,
    session: Option<StealthSession>,
    rewriter_task: Option<JoinHandle<()>>,
    regions_on_session: usize,
    region_index: usize,
}

impl HomeDepotAdapter {
    #[must_use]
    pub fn new(settings: AdapterSettings) -> Self {
        let breaker = CircuitBreaker::new(settings.breaker_threshold, settings.breaker_cooldown);
        Self {
            settings,
            breaker,
            session: None,
            rewriter_task: None,
            regions_on_session: 0,
            region_index: 0,
        }
    }

    async fn teardown_session(&mut self) {
        if let Some(task) = self.rewriter_task.take() {
            task.abort();
        }
        if let Some(session) = self.session.take() {
            session.close().await;
        }
        self.regions_on_session = 0;
    }

    /// Ensures a live session with the region's cookies and body rewriter
    /// installed, recycling the browser on the configured interval.
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

        // Cookies and the rewriter are per-region even on a reused session.
        let session = self.session.as_ref().ok_or_else(|| {
            ScrapeError::Session("session unavailable after launch".to_owned())
        })?;
        session
            .set_cookies(
                ".homedepot.com",
                &[
                    ("THD_LOCSTORE", store.hd_store_id.to_owned()),
                    ("DELIVERY_ZIP", store.zip.to_owned()),
                ],
            )
            .await?;

        if let Some(task) = self.rewriter_task.take() {
            task.abort();
        }
        let store_id = store.hd_store_id.to_owned();
        let zip = store.zip.to_owned();
        let task = session
            .install_body_rewriter(GRAPHQL_FRAGMENT, move |body| {
                rewrite_search_body(body, &store_id, &zip)
            })
            .await?;
        self.rewriter_task = Some(task);

        self.region_index += 1;
        self.regions_on_session += 1;
        Ok(())
    }

    /// One category page: navigate with the capture armed, parse the captured
    /// envelope, reduce items. An uncaptured response counts as an empty page
    /// rather than a failure; sparse regions legitimately run dry.
    async fn scrape_page(
        &mut self,
        store: &RegionStore,
        category: &Category,
        page: usize,
    ) -> Result<(Vec<ScrapedProduct>, Option<i64>), ScrapeError> {
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

        let url = format!("{HD_BASE}{}?Nao={}", category.path, page_offset(page));
        let capture = session.arm_response_capture(GRAPHQL_FRAGMENT).await?;

        with_navigation_retry(
            &mut self.breaker,
            self.settings.backoff,
            self.settings.nav_max_attempts,
            || session.navigate(&url),
        )
        .await?;

        let value = match capture.wait(CAPTURE_TIMEOUT, &url).await {
            Ok(value) => value,
            Err(ScrapeError::MissingResponse { context }) => {
                tracing::debug!(url = %context, "no search response captured, treating page as empty");
                return Ok((Vec::new(), None));
            }
            Err(e) => return Err(e),
        };

        let envelope: SearchEnvelope =
            serde_json::from_value(value).map_err(|source| ScrapeError::Deserialize {
                context: url.clone(),
                source,
            })?;

        let Some(model) = envelope.data.and_then(|d| d.search_model) else {
            return Ok((Vec::new(), None));
        };
        let total = model.search_report.and_then(|r| r.total_products);

        let products = model
            .products
            .into_iter()
            .filter_map(|item| {
                let ids = item.identifiers?;
                let sku = ids.store_sku_number.or(ids.item_id)?;
                // Sponsored tiles sometimes omit the canonical path; the SKU
                // product URL resolves either way.
                let url = ids.canonical_url.map_or_else(
                    || format!("{HD_BASE}/p/{sku}"),
                    |path| format!("{HD_BASE}{path}"),
                );
                let offer = RawOffer {
                    sku: Some(sku),
                    title: ids.product_label,
                    brand: ids.brand_name,
                    url: Some(url),
                    price_per_sqft: item
                        .pricing
                        .as_ref()
                        .and_then(crate::types::HdPricing::price_per_sqft),
                };
                reduce_offer(Retailer::HomeDepot, store, category.hint, offer)
            })
            .collect();

        Ok((products, total))
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

impl RetailerAdapter for HomeDepotAdapter {
    fn retailer(&self) -> Retailer {
        Retailer::HomeDepot
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
                let (page_products, total) = self.scrape_page(store, category, page).await?;
                let count = page_products.len();
                products.extend(page_products);

                tracing::debug!(
                    region = store.region_id,
                    category = category.hint,
                    page,
                    count,
                    "scraped catalog page"
                );

                // The reported total tells us when pagination has run off the
                // end of the catalog.
                if let Some(total) = total {
                    if page_offset(page) + PAGE_SIZE >= usize::try_from(total).unwrap_or(0) {
                        break;
                    }
                }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_body_gets_store_and_zip_injected() {
        let body = r#"{"operationName":"searchModel","variables":{"keyword":"","navParam":"5yc1vZar7t"}}"#;
        let rewritten = rewrite_search_body(body, "2664", "98101").unwrap();

        let value: serde_json::Value = serde_json::from_str(&rewritten).unwrap();
        assert_eq!(value["variables"]["storeId"], "2664");
        assert_eq!(value["variables"]["zipCode"], "98101");
        assert_eq!(value["variables"]["navParam"], "5yc1vZar7t");
    }

    #[test]
    fn unrelated_graphql_bodies_pass_through() {
        assert!(rewrite_search_body(r#"{"operationName":"cartInfo","variables":{}}"#, "2664", "98101").is_none());
    }

    #[test]
    fn malformed_body_passes_through() {
        assert!(rewrite_search_body("searchModel{not json", "2664", "98101").is_none());
    }

    #[test]
    fn body_without_variables_passes_through() {
        assert!(rewrite_search_body(r#"{"operationName":"searchModel"}"#, "2664", "98101").is_none());
    }
}
