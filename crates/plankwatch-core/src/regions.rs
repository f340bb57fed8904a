//! Static registry mapping the 13 market regions to the retailer-specific
//! location tokens needed to obtain regionally-priced catalog data.
//!
//! Home Depot's search API takes a store id plus delivery zip; Lowe's sets
//! location through store-id cookies. Both tokens are carried here so an
//! adapter only ever needs a [`RegionStore`].

/// Identity of one delivery/pricing context.
///
/// Immutable, loaded at process start. A miss in [`lookup_region`] is a
/// configuration error; callers must treat it as fatal, never retry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionStore {
    pub region_id: &'static str,
    pub region_name: &'static str,
    pub zip: &'static str,
    pub hd_store_id: &'static str,
    pub lowes_store_id: &'static str,
}

/// All 13 pricing regions with representative zip codes and store ids.
pub const REGION_STORES: &[RegionStore] = &[
    RegionStore {
        region_id: "northeast",
        region_name: "Northeast",
        zip: "02101", // Boston, MA
        hd_store_id: "2664",
        lowes_store_id: "1835",
    },
    RegionStore {
        region_id: "north-atlantic",
        region_name: "North Atlantic",
        zip: "10001", // New York, NY
        hd_store_id: "6174",
        lowes_store_id: "1920",
    },
    RegionStore {
        region_id: "atlantic-coast",
        region_name: "Atlantic Coast",
        zip: "20001", // Washington, DC
        hd_store_id: "4616",
        lowes_store_id: "3327",
    },
    RegionStore {
        region_id: "southeast",
        region_name: "Southeast",
        zip: "30301", // Atlanta, GA
        hd_store_id: "0121",
        lowes_store_id: "2224",
    },
    RegionStore {
        region_id: "south-florida",
        region_name: "South Florida",
        zip: "33101", // Miami, FL
        hd_store_id: "0254",
        lowes_store_id: "2283",
    },
    RegionStore {
        region_id: "north-florida",
        region_name: "North Florida",
        zip: "32099", // Jacksonville, FL
        hd_store_id: "0227",
        lowes_store_id: "1584",
    },
    RegionStore {
        region_id: "gulf-coast",
        region_name: "Gulf Coast",
        zip: "77001", // Houston, TX
        hd_store_id: "0581",
        lowes_store_id: "0460",
    },
    RegionStore {
        region_id: "interior-texas",
        region_name: "Interior Texas",
        zip: "75201", // Dallas, TX
        hd_store_id: "0582",
        lowes_store_id: "1636",
    },
    RegionStore {
        region_id: "midwest",
        region_name: "Midwest",
        zip: "60601", // Chicago, IL
        hd_store_id: "1913",
        lowes_store_id: "2618",
    },
    RegionStore {
        region_id: "mountain-west",
        region_name: "Mountain West",
        zip: "80201", // Denver, CO
        hd_store_id: "1507",
        lowes_store_id: "0186",
    },
    RegionStore {
        region_id: "pacific-northwest",
        region_name: "Pacific Northwest",
        zip: "98101", // Seattle, WA
        hd_store_id: "4702",
        lowes_store_id: "2540",
    },
    RegionStore {
        region_id: "southern-california",
        region_name: "Southern California",
        zip: "90001", // Los Angeles, CA
        hd_store_id: "6604",
        lowes_store_id: "2700",
    },
    RegionStore {
        region_id: "great-plains",
        region_name: "Great Plains",
        zip: "66101", // Kansas City, KS
        hd_store_id: "2208",
        lowes_store_id: "1614",
    },
];

/// Looks up the [`RegionStore`] for a canonical region id.
#[must_use]
pub fn lookup_region(region_id: &str) -> Option<&'static RegionStore> {
    REGION_STORES.iter().find(|r| r.region_id == region_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registry_has_thirteen_regions() {
        assert_eq!(REGION_STORES.len(), 13);
    }

    #[test]
    fn region_ids_are_unique() {
        let ids: HashSet<&str> = REGION_STORES.iter().map(|r| r.region_id).collect();
        assert_eq!(ids.len(), REGION_STORES.len());
    }

    #[test]
    fn lookup_finds_known_region() {
        let store = lookup_region("pacific-northwest").expect("region should exist");
        assert_eq!(store.zip, "98101");
        assert_eq!(store.hd_store_id, "4702");
        assert_eq!(store.lowes_store_id, "2540");
    }

    #[test]
    fn lookup_miss_returns_none() {
        assert!(lookup_region("atlantis").is_none());
    }

    #[test]
    fn every_region_has_location_tokens() {
        for store in REGION_STORES {
            assert_eq!(store.zip.len(), 5, "{} zip", store.region_id);
            assert!(!store.hd_store_id.is_empty(), "{}", store.region_id);
            assert!(!store.lowes_store_id.is_empty(), "{}", store.region_id);
        }
    }
}
