//! Raw wire shapes from the two retailer integrations.
//!
//! ## Home Depot `searchModel` GraphQL response
//!
//! The product grid issues a POST to the GraphQL endpoint whose response
//! carries `data.searchModel.products[]`. Regional pricing only appears when
//! the request body names a `storeId` and `zipCode`; the client-side default
//! ignores cookie state, which is why the adapter rewrites the outbound body.
//!
//! Pricing comes in two observed shapes:
//! - `pricing.alternate.unit.value`: price per square foot, the preferred
//!   field when present and positive.
//! - `pricing.value` with `pricing.unitsPerCase`: carton price; per-area
//!   price is carton ÷ units.
//!
//! Every field is optional in practice; sponsored tiles and accessories
//! arrive with whole sub-objects missing. `#[serde(default)]` throughout so a
//! partial item deserializes and is dropped during reduction instead of
//! failing the page.
//!
//! ## Lowe's catalog cards
//!
//! Lowe's is server-rendered; the adapter first reads an embedded state blob
//! and falls back to scraping visible cards. Both paths are normalized in
//! page JS to the flat [`LowesCard`] shape before crossing back into Rust.

use serde::Deserialize;

/// Top-level envelope of the Home Depot search response.
#[derive(Debug, Deserialize)]
pub struct SearchEnvelope {
    #[serde(default)]
    pub data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    #[serde(rename = "searchModel", default)]
    pub search_model: Option<SearchModel>,
}

#[derive(Debug, Deserialize)]
pub struct SearchModel {
    #[serde(default)]
    pub products: Vec<HdProduct>,
    #[serde(rename = "searchReport", default)]
    pub search_report: Option<SearchReport>,
}

#[derive(Debug, Deserialize)]
pub struct SearchReport {
    #[serde(rename = "totalProducts", default)]
    pub total_products: Option<i64>,
}

/// One grid item. Sponsored tiles can miss `identifiers` entirely.
#[derive(Debug, Deserialize)]
pub struct HdProduct {
    #[serde(default)]
    pub identifiers: Option<HdIdentifiers>,
    #[serde(default)]
    pub pricing: Option<HdPricing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HdIdentifiers {
    /// Site-wide numeric item id, e.g. `"100323174"`.
    #[serde(default)]
    pub item_id: Option<String>,
    /// Store-level SKU; preferred for external identity when present.
    #[serde(default)]
    pub store_sku_number: Option<String>,
    /// Full display title the attribute extractor runs on.
    #[serde(default)]
    pub product_label: Option<String>,
    #[serde(default)]
    pub brand_name: Option<String>,
    /// Product-page path relative to the site root, e.g.
    /// `"/p/Bruce-America-s-Best-Choice-.../100323174"`.
    #[serde(default)]
    pub canonical_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HdPricing {
    /// Displayed price, per carton for flooring.
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub units_per_case: Option<f64>,
    #[serde(default)]
    pub alternate: Option<HdAlternatePricing>,
}

#[derive(Debug, Deserialize)]
pub struct HdAlternatePricing {
    #[serde(default)]
    pub unit: Option<HdUnitPricing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HdUnitPricing {
    /// Price per unit area (sq. ft.) when the store exposes it.
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub case_unit_of_measure: Option<String>,
}

impl HdPricing {
    /// Price per square foot: the alternate unit price when present and
    /// positive, else carton price ÷ units-per-case.
    #[must_use]
    pub fn price_per_sqft(&self) -> Option<f64> {
        if let Some(unit) = self
            .alternate
            .as_ref()
            .and_then(|a| a.unit.as_ref())
            .and_then(|u| u.value)
        {
            if unit > 0.0 {
                return Some(unit);
            }
        }

        let carton = self.value?;
        let units = self.units_per_case?;
        if units > 0.0 {
            Some(carton / units)
        } else {
            None
        }
    }
}

/// Flat card shape produced by the Lowe's in-page extraction JS, covering
/// both the embedded-state and DOM-fallback paths.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowesCard {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    /// Display price with currency formatting intact, e.g. `"$1,299.00"`.
    #[serde(default)]
    pub price_text: Option<String>,
    /// Product-page link, absolute or site-relative.
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hd_search_response_deserializes() {
        let body = r#"{
            "data": {
                "searchModel": {
                    "products": [{
                        "identifiers": {
                            "itemId": "100323174",
                            "storeSkuNumber": "449502",
                            "productLabel": "Bruce White Oak Solid Hardwood 3/4 in. Thick x 5 in. Wide",
                            "brandName": "Bruce",
                            "canonicalUrl": "/p/Bruce-White-Oak/100323174"
                        },
                        "pricing": {
                            "value": 142.78,
                            "unitsPerCase": 22.0,
                            "alternate": {"unit": {"value": 6.49, "caseUnitOfMeasure": "sq. ft."}}
                        }
                    }],
                    "searchReport": {"totalProducts": 87}
                }
            }
        }"#;

        let envelope: SearchEnvelope = serde_json::from_str(body).unwrap();
        let model = envelope.data.unwrap().search_model.unwrap();
        assert_eq!(model.products.len(), 1);
        assert_eq!(model.search_report.unwrap().total_products, Some(87));

        let product = &model.products[0];
        let ids = product.identifiers.as_ref().unwrap();
        assert_eq!(ids.store_sku_number.as_deref(), Some("449502"));
        assert_eq!(product.pricing.as_ref().unwrap().price_per_sqft(), Some(6.49));
    }

    #[test]
    fn sparse_hd_item_deserializes_without_failing() {
        let body = r#"{"identifiers": null, "pricing": {"value": 99.0}}"#;
        let product: HdProduct = serde_json::from_str(body).unwrap();
        assert!(product.identifiers.is_none());
        // No units-per-case and no alternate: price cannot be derived.
        assert!(product.pricing.unwrap().price_per_sqft().is_none());
    }

    #[test]
    fn alternate_unit_price_wins_over_carton_math() {
        let pricing = HdPricing {
            value: Some(100.0),
            units_per_case: Some(20.0),
            alternate: Some(HdAlternatePricing {
                unit: Some(HdUnitPricing {
                    value: Some(6.49),
                    case_unit_of_measure: Some("sq. ft.".to_owned()),
                }),
            }),
        };
        assert_eq!(pricing.price_per_sqft(), Some(6.49));
    }

    #[test]
    fn zero_alternate_price_falls_back_to_carton_division() {
        let pricing = HdPricing {
            value: Some(130.0),
            units_per_case: Some(20.0),
            alternate: Some(HdAlternatePricing {
                unit: Some(HdUnitPricing {
                    value: Some(0.0),
                    case_unit_of_measure: None,
                }),
            }),
        };
        assert_eq!(pricing.price_per_sqft(), Some(6.5));
    }

    #[test]
    fn zero_units_per_case_yields_no_price() {
        let pricing = HdPricing {
            value: Some(130.0),
            units_per_case: Some(0.0),
            alternate: None,
        };
        assert!(pricing.price_per_sqft().is_none());
    }

    #[test]
    fn lowes_card_deserializes_from_page_js_shape() {
        let body = r#"[{"title": "Style Selections Hickory 5-in", "brand": "Style Selections",
                        "priceText": "$2,199.00", "link": "/pd/Style-Selections/5001392471", "sku": "5001392471"}]"#;
        let cards: Vec<LowesCard> = serde_json::from_str(body).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].price_text.as_deref(), Some("$2,199.00"));
    }
}
