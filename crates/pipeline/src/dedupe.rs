//! Cross-source deduplication by fuzzy name and proximity.
//!
//! ## Algorithm
//! Single-pass, anchor-based clustering:
//! 1. Walk the places in arrival order (providers in preferred order, then
//!    each provider's own order)
//! 2. Compare the incoming place against the merged list built so far
//! 3. The first merged entry that is the same venue absorbs it; otherwise the
//!    place becomes a new anchor at the end of the list
//!
//! The first place seen for a venue is its anchor and keeps its identity
//! (name, address, source, id, coordinates); later duplicates only contribute
//! attributes. This makes the result order-sensitive on purpose: which
//! provider is preferred decides whose identity wins.
//!
//! Cost is O(n·m) for n places and m anchors.

use places::{MERGED_RAW_KEY, Place, planar_distance_m};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::DedupeConfig;
use crate::similarity::token_sort_ratio;

#[derive(Debug, Clone, Copy)]
pub struct Deduplicator {
    name_threshold: f64,
    proximity_m: f64,
}

impl Deduplicator {
    pub fn new(config: DedupeConfig) -> Self {
        Self {
            name_threshold: config.name_threshold,
            proximity_m: config.proximity_m,
        }
    }

    /// Configure the name similarity threshold (default: 85)
    pub fn with_name_threshold(mut self, threshold: f64) -> Self {
        self.name_threshold = threshold;
        self
    }

    /// Configure the proximity threshold in meters (default: 40)
    pub fn with_proximity_m(mut self, meters: f64) -> Self {
        self.proximity_m = meters;
        self
    }

    /// Whether two places are the same physical venue.
    ///
    /// Both bounds are inclusive: a pair exactly at the name threshold and
    /// exactly at the proximity threshold is a match.
    pub fn is_same_venue(&self, a: &Place, b: &Place) -> bool {
        let distance = planar_distance_m(a.lat, a.lon, b.lat, b.lon);
        // distance first: it is much cheaper than the similarity
        distance <= self.proximity_m && token_sort_ratio(&a.name, &b.name) >= self.name_threshold
    }

    /// Merge duplicates, preserving the order in which anchors first appeared.
    pub fn dedupe(&self, places: Vec<Place>) -> Vec<Place> {
        let input_len = places.len();
        let mut merged: Vec<Place> = Vec::with_capacity(input_len);

        for place in places {
            match merged
                .iter_mut()
                .find(|anchor| self.is_same_venue(anchor, &place))
            {
                Some(anchor) => merge_into(anchor, place),
                None => merged.push(place),
            }
        }

        debug!(
            input = input_len,
            output = merged.len(),
            "deduplicated places"
        );
        merged
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DedupeConfig::default())
    }
}

/// Fold `duplicate` into `anchor`.
///
/// - cuisine and dietary tags are unioned
/// - the rating only ever goes up (an unrated anchor adopts any rating)
/// - the duplicate's raw payload is appended to the anchor's provenance
pub fn merge_into(anchor: &mut Place, duplicate: Place) {
    debug!(
        anchor = %anchor.name,
        anchor_source = %anchor.source,
        duplicate_source = %duplicate.source,
        duplicate_id = %duplicate.source_id,
        "merging duplicate"
    );
    anchor.cuisines.extend(duplicate.cuisines);
    anchor.dietary_tags.extend(duplicate.dietary_tags);
    if let Some(rating) = duplicate.rating {
        if anchor.rating.is_none_or(|current| rating > current) {
            anchor.rating = Some(rating);
        }
    }
    append_provenance(&mut anchor.raw, duplicate.raw);
}

/// Push `incoming` onto the `_merged_raw` list of `raw`, seeding the list
/// with a copy of `raw` itself on the first merge.
fn append_provenance(raw: &mut Value, incoming: Value) {
    let has_list = raw
        .get(MERGED_RAW_KEY)
        .is_some_and(Value::is_array);
    if !has_list {
        let own = raw.clone();
        if !raw.is_object() {
            *raw = Value::Object(Map::new());
        }
        raw[MERGED_RAW_KEY] = Value::Array(vec![own]);
    }
    if let Some(list) = raw.get_mut(MERGED_RAW_KEY).and_then(Value::as_array_mut) {
        list.push(incoming);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use places::Provider;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn place(name: &str, lat: f64, lon: f64, source: Provider, id: &str) -> Place {
        Place {
            name: name.to_string(),
            address: format!("{name} address"),
            lat,
            lon,
            price_level: None,
            cuisines: BTreeSet::new(),
            dietary_tags: BTreeSet::new(),
            rating: None,
            source,
            source_id: id.to_string(),
            last_checked: Utc::now(),
            raw: json!({"provider": source.as_str(), "id": id}),
            distance_m: None,
            confidence: None,
        }
    }

    #[test]
    fn near_identical_listings_merge() {
        let mut google = place("Luigi's Italian", 40.7138, -74.0048, Provider::Google, "g_1");
        google.rating = Some(4.0);
        google.add_cuisine("italian");
        let mut yelp = place("Luigis Italian", 40.71381, -74.00481, Provider::Yelp, "y_9");
        yelp.rating = Some(4.5);
        yelp.add_cuisine("pizza");

        let merged = Deduplicator::default().dedupe(vec![google, yelp]);

        assert_eq!(merged.len(), 1);
        let luigi = &merged[0];
        assert_eq!(luigi.name, "Luigi's Italian");
        assert_eq!(luigi.source, Provider::Google);
        assert_eq!(luigi.rating, Some(4.5));
        assert!(luigi.cuisines.contains("italian") && luigi.cuisines.contains("pizza"));

        let provenance = luigi.provenance();
        assert_eq!(provenance.len(), 2);
        assert_eq!(provenance[0]["id"], json!("g_1"));
        assert_eq!(provenance[1]["id"], json!("y_9"));
        // the seeded snapshot does not nest the list inside itself
        assert!(provenance[0].get(MERGED_RAW_KEY).is_none());
    }

    #[test]
    fn same_name_far_apart_stays_separate() {
        let a = place("Joe's Pizza", 40.7300, -74.0000, Provider::Google, "a");
        let b = place("Joe's Pizza", 40.7400, -74.0000, Provider::Yelp, "b");
        assert_eq!(Deduplicator::default().dedupe(vec![a, b]).len(), 2);
    }

    #[test]
    fn different_names_same_spot_stay_separate() {
        let a = place("Tiny Taco", 40.7300, -74.0000, Provider::Google, "a");
        let b = place("Green Leaf Vegetarian", 40.7300, -74.0000, Provider::Yelp, "b");
        assert_eq!(Deduplicator::default().dedupe(vec![a, b]).len(), 2);
    }

    #[test]
    fn thresholds_are_inclusive() {
        let a = place("Luigi's Italian", 40.7138, -74.0048, Provider::Google, "a");
        let b = place("Luigis Italian", 40.71410, -74.00470, Provider::Yelp, "b");
        let distance = planar_distance_m(a.lat, a.lon, b.lat, b.lon);
        let similarity = token_sort_ratio(&a.name, &b.name);

        let exact = Deduplicator::default()
            .with_name_threshold(similarity)
            .with_proximity_m(distance);
        assert!(exact.is_same_venue(&a, &b));
        assert_eq!(exact.dedupe(vec![a.clone(), b.clone()]).len(), 1);

        let too_close = exact.with_proximity_m(distance - 0.001);
        assert!(!too_close.is_same_venue(&a, &b));

        let too_similar = exact.with_name_threshold(similarity + 0.001);
        assert!(!too_similar.is_same_venue(&a, &b));
        assert_eq!(too_similar.dedupe(vec![a, b]).len(), 2);
    }

    #[test]
    fn first_seen_anchor_keeps_identity_and_order() {
        let taco = place("Tiny Taco", 40.7000, -74.0000, Provider::Google, "t");
        let yelp_luigi = place("Luigi's Italian", 40.7138, -74.0048, Provider::Yelp, "y");
        let google_luigi = place("Luigi's Italian", 40.7138, -74.0048, Provider::Google, "g");

        let merged = Deduplicator::default().dedupe(vec![taco, yelp_luigi, google_luigi]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].source_id, "t");
        assert_eq!(merged[1].source_id, "y");
        assert_eq!(merged[1].source, Provider::Yelp);
    }

    #[test]
    fn later_duplicates_compare_against_anchors_only() {
        // b is within 40 m of a, c is within 40 m of b but 60 m from a.
        // Anchor-based clustering folds b into a, then compares c to a only.
        let a = place("Corner Cafe", 40.70000, -74.0, Provider::Google, "a");
        let b = place("Corner Cafe", 40.70030, -74.0, Provider::Yelp, "b");
        let c = place("Corner Cafe", 40.70054, -74.0, Provider::Yelp, "c");

        let merged = Deduplicator::default().dedupe(vec![a, b, c]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].source_id, "a");
        assert_eq!(merged[0].provenance().len(), 2);
        assert_eq!(merged[1].source_id, "c");
    }

    #[test]
    fn rating_never_decreases() {
        let mut anchor = place("A", 0.0, 0.0, Provider::Google, "a");
        anchor.rating = Some(4.5);
        let mut lower = place("A", 0.0, 0.0, Provider::Yelp, "b");
        lower.rating = Some(3.0);
        merge_into(&mut anchor, lower);
        assert_eq!(anchor.rating, Some(4.5));

        let unrated = place("A", 0.0, 0.0, Provider::Yelp, "c");
        merge_into(&mut anchor, unrated);
        assert_eq!(anchor.rating, Some(4.5));

        let mut blank = place("A", 0.0, 0.0, Provider::Google, "d");
        let mut rated = place("A", 0.0, 0.0, Provider::Yelp, "e");
        rated.rating = Some(2.0);
        merge_into(&mut blank, rated);
        assert_eq!(blank.rating, Some(2.0));
    }

    #[test]
    fn merged_tags_are_supersets() {
        let mut anchor = place("A", 0.0, 0.0, Provider::Google, "a");
        anchor.add_cuisine("italian");
        anchor.add_dietary_tag("vegetarian");
        let mut dup = place("A", 0.0, 0.0, Provider::Yelp, "b");
        dup.add_cuisine("pizza");
        dup.add_cuisine("italian");
        dup.add_dietary_tag("vegan");

        let before_anchor = (anchor.cuisines.clone(), anchor.dietary_tags.clone());
        let before_dup = (dup.cuisines.clone(), dup.dietary_tags.clone());
        merge_into(&mut anchor, dup);

        assert!(anchor.cuisines.is_superset(&before_anchor.0));
        assert!(anchor.cuisines.is_superset(&before_dup.0));
        assert!(anchor.dietary_tags.is_superset(&before_anchor.1));
        assert!(anchor.dietary_tags.is_superset(&before_dup.1));
        assert_eq!(anchor.cuisines.len(), 2);
    }

    #[test]
    fn provenance_accumulates_across_merges() {
        let mut anchor = place("A", 0.0, 0.0, Provider::Google, "a");
        merge_into(&mut anchor, place("A", 0.0, 0.0, Provider::Yelp, "b"));
        merge_into(&mut anchor, place("A", 0.0, 0.0, Provider::Yelp, "c"));

        let ids: Vec<&Value> = anchor.provenance().iter().map(|raw| &raw["id"]).collect();
        assert_eq!(ids, vec![&json!("a"), &json!("b"), &json!("c")]);
    }

    #[test]
    fn non_object_payload_is_still_tracked() {
        let mut anchor = place("A", 0.0, 0.0, Provider::Google, "a");
        anchor.raw = json!("opaque");
        merge_into(&mut anchor, place("A", 0.0, 0.0, Provider::Yelp, "b"));
        assert_eq!(anchor.provenance()[0], json!("opaque"));
        assert_eq!(anchor.provenance().len(), 2);
    }

    #[test]
    fn empty_input() {
        assert!(Deduplicator::default().dedupe(vec![]).is_empty());
    }
}
