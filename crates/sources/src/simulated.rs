//! Canned provider responses placed around the query center.
//!
//! Lets the whole pipeline run without network access or fixtures. Both
//! providers report "Luigi's Italian" a couple of meters apart, so a demo run
//! always exercises the cross-source merge.

use async_trait::async_trait;
use chrono::Utc;
use places::{GoogleRecord, Provider, RawRecord, YelpRecord};
use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::fetcher::{FetchArgs, PlaceFetcher};

/// Offsets (degrees) and attributes of one canned listing.
struct Listing {
    id: &'static str,
    name: &'static str,
    address: &'static str,
    dlat: f64,
    dlon: f64,
    tags: &'static [&'static str],
    rating: f64,
}

const GOOGLE_LISTINGS: &[(Listing, i64)] = &[
    (
        Listing {
            id: "g_1",
            name: "Luigi's Italian",
            address: "123 Pasta St",
            dlat: 0.001,
            dlon: 0.0012,
            tags: &["restaurant", "italian"],
            rating: 4.5,
        },
        2,
    ),
    (
        Listing {
            id: "g_2",
            name: "Green Leaf Vegetarian",
            address: "5 Garden Ave",
            dlat: 0.0005,
            dlon: -0.0006,
            tags: &["restaurant", "vegetarian"],
            rating: 4.2,
        },
        1,
    ),
];

const YELP_LISTINGS: &[(Listing, &str)] = &[
    (
        Listing {
            id: "y_9",
            name: "Luigi's Italian",
            address: "123 Pasta St",
            dlat: 0.00102,
            dlon: 0.00118,
            tags: &["italian", "pizza"],
            rating: 4.0,
        },
        "$$",
    ),
    (
        Listing {
            id: "y_11",
            name: "Tiny Taco",
            address: "88 Salsa Blvd",
            dlat: -0.0015,
            dlon: -0.0009,
            tags: &["mexican"],
            rating: 4.1,
        },
        "$",
    ),
];

fn sim_marker() -> Map<String, Value> {
    let mut extra = Map::new();
    extra.insert("raw".to_string(), json!({"sim": true}));
    extra
}

/// Simulated provider; ignores radius like the sandbox APIs it stands in for.
pub struct SimulatedFetcher {
    provider: Provider,
}

impl SimulatedFetcher {
    pub fn new(provider: Provider) -> Self {
        Self { provider }
    }

    fn records(&self, args: &FetchArgs) -> Vec<RawRecord> {
        let ts = Some(Utc::now().timestamp_millis() as f64 / 1000.0);
        match self.provider {
            Provider::Google => GOOGLE_LISTINGS
                .iter()
                .map(|(l, price_level)| {
                    RawRecord::Google(GoogleRecord {
                        id: Some(l.id.to_string()),
                        place_id: None,
                        name: l.name.to_string(),
                        address: l.address.to_string(),
                        lat: Some(args.lat + l.dlat),
                        lon: Some(args.lon + l.dlon),
                        price_level: Some(*price_level),
                        types: l.tags.iter().map(|t| t.to_string()).collect(),
                        rating: Some(l.rating),
                        ts,
                        extra: sim_marker(),
                    })
                })
                .collect(),
            Provider::Yelp => YELP_LISTINGS
                .iter()
                .map(|(l, price)| {
                    RawRecord::Yelp(YelpRecord {
                        id: Some(l.id.to_string()),
                        place_id: None,
                        name: l.name.to_string(),
                        address: l.address.to_string(),
                        lat: Some(args.lat + l.dlat),
                        lon: Some(args.lon + l.dlon),
                        price: Some(price.to_string()),
                        categories: l.tags.iter().map(|t| t.to_string()).collect(),
                        rating: Some(l.rating),
                        ts,
                        extra: sim_marker(),
                    })
                })
                .collect(),
        }
    }
}

#[async_trait]
impl PlaceFetcher for SimulatedFetcher {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn fetch(&self, args: &FetchArgs) -> Result<Vec<RawRecord>> {
        let mut records = self.records(args);
        records.truncate(args.limit);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use places::UserQuery;

    #[tokio::test]
    async fn listings_follow_the_center() {
        let args = FetchArgs::from_query(&UserQuery::new(40.7128, -74.0060, 800));
        let records = SimulatedFetcher::new(Provider::Google).fetch(&args).await.unwrap();

        assert_eq!(records.len(), 2);
        let RawRecord::Google(first) = &records[0] else {
            panic!("expected google record");
        };
        assert_eq!(first.name, "Luigi's Italian");
        assert!((first.lat.unwrap() - 40.7138).abs() < 1e-9);
        assert!(first.ts.is_some());
    }

    #[tokio::test]
    async fn yelp_uses_price_strings() {
        let args = FetchArgs::from_query(&UserQuery::new(0.0, 0.0, 800).with_limit_per_source(1));
        let records = SimulatedFetcher::new(Provider::Yelp).fetch(&args).await.unwrap();

        assert_eq!(records.len(), 1);
        let RawRecord::Yelp(first) = &records[0] else {
            panic!("expected yelp record");
        };
        assert_eq!(first.price.as_deref(), Some("$$"));
        assert_eq!(first.categories, vec!["italian", "pizza"]);
    }
}
