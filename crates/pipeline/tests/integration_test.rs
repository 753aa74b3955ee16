//! Integration tests for the pipeline.
//!
//! These tests run normalization, deduplication and scoring together on
//! realistic two-provider result sets.

use pipeline::{DedupeConfig, PipelineConfig, PlacePipeline, normalize_all};
use places::{BudgetBand, Provider, RawRecord, UserQuery};
use serde_json::json;

const CENTER: (f64, f64) = (40.7128, -74.0060);

fn records() -> Vec<RawRecord> {
    RawRecord::parse_many(
        &json!([
            {
                "provider": "google",
                "id": "g_1",
                "name": "Luigi's Italian",
                "address": "123 Pasta St",
                "lat": 40.7138,
                "lon": -74.0048,
                "price_level": 2,
                "types": ["restaurant", "italian"],
                "rating": 4.5,
                "ts": 1_700_000_000.0
            },
            {
                "provider": "google",
                "id": "g_2",
                "name": "Green Leaf Vegetarian",
                "address": "45 Garden Ave",
                "lat": 40.7133,
                "lon": -74.0066,
                "price_level": 1,
                "types": ["restaurant", "vegetarian"],
                "rating": 4.2,
                "ts": 1_700_000_000.0
            },
            {
                "provider": "yelp",
                "id": "y_9",
                "name": "Luigis Italian",
                "address": "123 Pasta Street",
                "lat": 40.71382,
                "lon": -74.00482,
                "price": "$$",
                "categories": ["italian", "pizza"],
                "rating": 4.0,
                "ts": 1_700_000_000.0
            },
            {
                "provider": "yelp",
                "id": "y_11",
                "name": "Tiny Taco",
                "address": "9 Salsa Rd",
                "lat": 40.7113,
                "lon": -74.0069,
                "price": "$",
                "categories": ["mexican"],
                "rating": 4.1,
                "ts": 1_700_000_000.0
            }
        ])
        .to_string(),
    )
    .unwrap()
}

fn italian_query() -> UserQuery {
    UserQuery::new(CENTER.0, CENTER.1, 800)
        .with_budget(BudgetBand::new(1, 2))
        .with_cuisines(["italian"])
}

#[test]
fn test_cross_source_listing_merges_into_google_anchor() {
    let places = PlacePipeline::default().process(records(), &italian_query());

    assert_eq!(places.len(), 3);
    let luigi = places
        .iter()
        .find(|p| p.name == "Luigi's Italian")
        .expect("merged Luigi's");

    assert_eq!(luigi.source, Provider::Google);
    assert_eq!(luigi.source_id, "g_1");
    assert_eq!(luigi.address, "123 Pasta St");
    assert_eq!(luigi.rating, Some(4.5));
    for tag in ["restaurant", "italian", "pizza"] {
        assert!(luigi.cuisines.contains(tag), "missing {tag}");
    }
    assert_eq!(luigi.source_count(), 2);
    assert_eq!(luigi.provenance()[1]["id"], json!("y_9"));
    assert!(!places.iter().any(|p| p.source_id == "y_9"));
}

#[test]
fn test_preferring_yelp_makes_it_the_anchor() {
    let mut reordered = records();
    reordered.rotate_left(2);

    let places = PlacePipeline::default().process(reordered, &italian_query());
    let luigi = places
        .iter()
        .find(|p| p.source_count() == 2)
        .expect("merged Luigi's");

    assert_eq!(luigi.source, Provider::Yelp);
    assert_eq!(luigi.name, "Luigis Italian");
    // the Google rating is higher and wins even though Yelp is the anchor
    assert_eq!(luigi.rating, Some(4.5));
}

#[test]
fn test_ranking_puts_the_matching_cuisine_first() {
    let places = PlacePipeline::default().process(records(), &italian_query());

    assert_eq!(places[0].name, "Luigi's Italian");
    for pair in places.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
    for place in &places {
        let distance = place.distance_m.unwrap();
        assert!(distance < 200.0, "{} is {distance} m away", place.name);
        let confidence = place.confidence.unwrap();
        assert!((0.0..=1.0).contains(&confidence));
    }
}

#[test]
fn test_strict_thresholds_keep_listings_apart() {
    let strict = PlacePipeline::new(DedupeConfig {
        name_threshold: 99.0,
        proximity_m: 40.0,
    });
    let places = strict.process(records(), &italian_query());
    assert_eq!(places.len(), 4);
}

#[test]
fn test_config_file_thresholds_flow_into_the_pipeline() {
    let config = PipelineConfig::from_toml_str("[dedupe]\nproximity_m = 1.0\n").unwrap();
    let places = PlacePipeline::new(config.dedupe).process(records(), &italian_query());
    // the two Luigi's listings are ~3 m apart
    assert_eq!(places.len(), 4);
}

#[test]
fn test_normalized_tags_respect_invariants() {
    for place in normalize_all(records()) {
        assert!(place.cuisines.iter().all(|t| !t.is_empty() && *t == t.to_lowercase()));
        assert!(place.price_level.is_none_or(|p| p <= 4));
    }
}
