use serde::{Deserialize, Serialize};

/// Construction of a hardwood flooring product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Solid,
    Engineered,
    Unfinished,
}

impl ProductType {
    /// Wire/database form of the type, e.g. `"engineered"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductType::Solid => "solid",
            ProductType::Engineered => "engineered",
            ProductType::Unfinished => "unfinished",
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(ProductType::Solid),
            "engineered" => Ok(ProductType::Engineered),
            "unfinished" => Ok(ProductType::Unfinished),
            other => Err(format!("unknown product type \"{other}\"")),
        }
    }
}

/// The retailers the pipeline integrates with. Closed set; adapter selection
/// is by this enum, never by open-ended dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Retailer {
    HomeDepot,
    Lowes,
}

impl Retailer {
    /// Human/database label, matching what the dashboard displays.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Retailer::HomeDepot => "Home Depot",
            Retailer::Lowes => "Lowe's",
        }
    }

    /// Short slug used in external-id composition (`"hd-midwest-1003..."`).
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Retailer::HomeDepot => "hd",
            Retailer::Lowes => "lowes",
        }
    }

    #[must_use]
    pub fn all() -> [Retailer; 2] {
        [Retailer::HomeDepot, Retailer::Lowes]
    }
}

impl std::fmt::Display for Retailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Retailer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hd" | "home-depot" | "homedepot" => Ok(Retailer::HomeDepot),
            "lowes" | "lowe's" => Ok(Retailer::Lowes),
            other => Err(format!("unknown retailer \"{other}\"")),
        }
    }
}

/// Composite external identity: the sole deduplication and upsert key.
///
/// Format: `{retailer-slug}-{region-id}-{sku}`.
#[must_use]
pub fn external_id(retailer: Retailer, region_id: &str, sku: &str) -> String {
    format!("{}-{}-{}", retailer.slug(), region_id, sku)
}

/// Canonical unit of extraction: one regionally-priced product offer.
///
/// Invariants upheld by the adapters before a record is materialized:
/// - `0 < price_per_sqft <= 30`; out-of-range items are dropped, never stored.
/// - `veneer_thickness` is `Some` iff `product_type` is [`ProductType::Engineered`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedProduct {
    /// Canonical species name, e.g. `"White Oak"`.
    pub species: String,
    pub product_type: ProductType,
    /// Plank width in inches.
    pub width: f64,
    /// Total plank thickness in inches.
    pub thickness: f64,
    /// Nominal wear-layer value for engineered planks, derived from total
    /// thickness. Always `None` for solid and unfinished products.
    pub veneer_thickness: Option<f64>,
    pub finish: String,
    pub grade: String,
    /// Janka hardness rating for the species; 1000 when the species has no
    /// table entry.
    pub janka_hardness: i32,
    pub price_per_sqft: f64,
    pub brand: String,
    /// Canonical product page URL.
    pub url: String,
    /// Plank length in inches.
    pub length: f64,
    /// `{retailer-slug}-{region}-{sku}`; see [`external_id`].
    pub external_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn product_type_round_trips_through_str() {
        for t in [
            ProductType::Solid,
            ProductType::Engineered,
            ProductType::Unfinished,
        ] {
            assert_eq!(ProductType::from_str(t.as_str()).unwrap(), t);
        }
    }

    #[test]
    fn product_type_rejects_unknown() {
        assert!(ProductType::from_str("laminate").is_err());
    }

    #[test]
    fn retailer_labels_match_dashboard_spelling() {
        assert_eq!(Retailer::HomeDepot.label(), "Home Depot");
        assert_eq!(Retailer::Lowes.label(), "Lowe's");
    }

    #[test]
    fn retailer_parses_common_spellings() {
        assert_eq!(Retailer::from_str("hd").unwrap(), Retailer::HomeDepot);
        assert_eq!(Retailer::from_str("Lowes").unwrap(), Retailer::Lowes);
    }

    #[test]
    fn external_id_composes_retailer_region_and_sku() {
        assert_eq!(
            external_id(Retailer::HomeDepot, "midwest", "100323174"),
            "hd-midwest-100323174"
        );
        assert_eq!(
            external_id(Retailer::Lowes, "gulf-coast", "5001392471"),
            "lowes-gulf-coast-5001392471"
        );
    }

    #[test]
    fn product_type_serializes_lowercase() {
        let json = serde_json::to_string(&ProductType::Engineered).unwrap();
        assert_eq!(json, "\"engineered\"");
    }
}
