//! Flattened, display-ready view of a ranked place.

use places::{Place, Provider};
use serde::Serialize;

/// What a caller shows for one result; drops the raw payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceSummary {
    pub rank: usize,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    pub price_level: Option<u8>,
    pub cuisines: Vec<String>,
    pub dietary_tags: Vec<String>,
    pub rating: Option<f64>,
    pub source: Provider,
    pub source_id: String,
    /// Rounded to whole meters
    pub distance_m: Option<u32>,
    pub confidence: Option<f64>,
    /// Provider listings folded into this result
    pub sources_merged: usize,
}

impl PlaceSummary {
    pub fn from_place(rank: usize, place: &Place) -> Self {
        Self {
            rank,
            name: place.name.clone(),
            address: place.address.clone(),
            lat: place.lat,
            lon: place.lon,
            price_level: place.price_level,
            cuisines: place.cuisines.iter().cloned().collect(),
            dietary_tags: place.dietary_tags.iter().cloned().collect(),
            rating: place.rating,
            source: place.source,
            source_id: place.source_id.clone(),
            distance_m: place.distance_m.map(|d| d.round() as u32),
            confidence: place.confidence,
            sources_merged: place.source_count(),
        }
    }

    /// `$` repeated per price tier; `?` when unknown
    pub fn price_label(&self) -> String {
        match self.price_level {
            Some(0) => "free".to_string(),
            Some(level) => "$".repeat(usize::from(level)),
            None => "?".to_string(),
        }
    }
}

/// Summaries for a ranked list, ranks starting at 1.
pub fn summarize(places: &[Place]) -> Vec<PlaceSummary> {
    places
        .iter()
        .enumerate()
        .map(|(i, place)| PlaceSummary::from_place(i + 1, place))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn place() -> Place {
        let mut place = Place {
            name: "Luigi's Italian".into(),
            address: "123 Pasta St".into(),
            lat: 40.7138,
            lon: -74.0048,
            price_level: Some(2),
            cuisines: BTreeSet::new(),
            dietary_tags: BTreeSet::new(),
            rating: Some(4.5),
            source: Provider::Google,
            source_id: "g_1".into(),
            last_checked: Utc::now(),
            raw: json!({"_merged_raw": [{"id": "g_1"}, {"id": "y_9"}]}),
            distance_m: Some(172.6),
            confidence: Some(0.948),
        };
        place.add_cuisine("pizza");
        place.add_cuisine("italian");
        place
    }

    #[test]
    fn test_summary_projection() {
        let summaries = summarize(&[place()]);
        let summary = &summaries[0];

        assert_eq!(summary.rank, 1);
        assert_eq!(summary.cuisines, vec!["italian", "pizza"]);
        assert_eq!(summary.distance_m, Some(173));
        assert_eq!(summary.sources_merged, 2);
        assert_eq!(summary.price_label(), "$$");
    }

    #[test]
    fn test_summary_json_has_no_raw_payload() {
        let value = serde_json::to_value(PlaceSummary::from_place(1, &place())).unwrap();
        assert!(value.get("raw").is_none());
        assert_eq!(value["source"], json!("google"));
        assert_eq!(value["confidence"], json!(0.948));
    }
}
