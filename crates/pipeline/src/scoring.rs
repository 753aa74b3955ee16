//! Confidence scoring and ranking.
//!
//! ## Formula
//! ```text
//! confidence = round3(0.4 * match + 0.3 * rating + 0.2 * distance + 0.1 * price)
//! ```
//! - match: 1.0, times 0.6 when requested cuisines are all absent, times 0.85
//!   when requested dietary tags are all absent
//! - rating: (rating or 3.0) / 5
//! - distance: linear falloff from 1.0 at the center to 0.0 at twice the radius
//! - price: 1.0 when the price fits the requested band, else 0.7
//!
//! ## Performance Note
//! Places are scored in parallel with Rayon; the ranking sort that follows is
//! a stable sort, so exact ties keep their merged order.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use places::{Place, UserQuery, normalize_tag};
use rayon::prelude::*;
use tracing::debug;

const MATCH_WEIGHT: f64 = 0.4;
const RATING_WEIGHT: f64 = 0.3;
const DISTANCE_WEIGHT: f64 = 0.2;
const PRICE_WEIGHT: f64 = 0.1;

const CUISINE_MISS_PENALTY: f64 = 0.6;
const DIETARY_MISS_PENALTY: f64 = 0.85;
const NEUTRAL_RATING: f64 = 3.0;
const MAX_RATING: f64 = 5.0;
const OUT_OF_BAND_PRICE: f64 = 0.7;

/// Individual terms behind a confidence value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub match_multiplier: f64,
    pub rating_term: f64,
    pub distance_term: f64,
    pub price_term: f64,
}

impl ScoreBreakdown {
    /// Weighted sum rounded to three decimals.
    pub fn composite(&self) -> f64 {
        let raw = MATCH_WEIGHT * self.match_multiplier
            + RATING_WEIGHT * self.rating_term
            + DISTANCE_WEIGHT * self.distance_term
            + PRICE_WEIGHT * self.price_term;
        round3(raw)
    }
}

/// Scores places against one query.
#[derive(Debug, Clone, Copy)]
pub struct Scorer<'q> {
    query: &'q UserQuery,
}

impl<'q> Scorer<'q> {
    pub fn new(query: &'q UserQuery) -> Self {
        Self { query }
    }

    /// Compute the terms for one place at a known distance.
    pub fn breakdown(&self, place: &Place, distance_m: f64) -> ScoreBreakdown {
        let query = self.query;

        let mut match_multiplier = 1.0;
        if !query.cuisines.is_empty() && !any_present(&query.cuisines, &place.cuisines) {
            match_multiplier *= CUISINE_MISS_PENALTY;
        }
        if !query.dietary_restrictions.is_empty()
            && !any_present(&query.dietary_restrictions, &place.dietary_tags)
        {
            match_multiplier *= DIETARY_MISS_PENALTY;
        }

        let rating_term = place.rating.unwrap_or(NEUTRAL_RATING) / MAX_RATING;

        // a zero radius would divide by zero
        let falloff = 2.0 * f64::from(query.radius_m.max(1));
        let distance_term = (1.0 - distance_m / falloff).max(0.0);

        let price_term = if query.budget.contains(place.price_level) {
            1.0
        } else {
            OUT_OF_BAND_PRICE
        };

        ScoreBreakdown {
            match_multiplier,
            rating_term,
            distance_term,
            price_term,
        }
    }

    /// Fill `distance_m` and `confidence` on one place.
    pub fn score(&self, place: &mut Place) {
        let distance = place.distance_to(self.query.lat, self.query.lon);
        let confidence = self.breakdown(place, distance).composite();
        place.distance_m = Some(distance);
        place.confidence = Some(confidence);
    }

    /// Score every place, then order by confidence and rating, both descending.
    pub fn rank(&self, mut places: Vec<Place>) -> Vec<Place> {
        places.par_iter_mut().for_each(|place| self.score(place));
        places.sort_by(rank_order);
        debug!(count = places.len(), "ranked places");
        places
    }
}

/// Descending confidence, then descending rating; missing values count as 0.
fn rank_order(a: &Place, b: &Place) -> Ordering {
    let confidence = |p: &Place| p.confidence.unwrap_or(0.0);
    let rating = |p: &Place| p.rating.unwrap_or(0.0);
    confidence(b)
        .total_cmp(&confidence(a))
        .then_with(|| rating(b).total_cmp(&rating(a)))
}

/// Requested tags are compared in the same normalized form places store.
fn any_present(wanted: &[String], tags: &BTreeSet<String>) -> bool {
    wanted
        .iter()
        .filter_map(|tag| normalize_tag(tag))
        .any(|tag| tags.contains(&tag))
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use places::{BudgetBand, Provider};
    use serde_json::Value;

    const CENTER: (f64, f64) = (40.7128, -74.0060);

    fn place(name: &str, lat: f64, lon: f64) -> Place {
        Place {
            name: name.to_string(),
            address: String::new(),
            lat,
            lon,
            price_level: None,
            cuisines: BTreeSet::new(),
            dietary_tags: BTreeSet::new(),
            rating: None,
            source: Provider::Google,
            source_id: name.to_string(),
            last_checked: Utc::now(),
            raw: Value::Null,
            distance_m: None,
            confidence: None,
        }
    }

    fn query() -> UserQuery {
        UserQuery::new(CENTER.0, CENTER.1, 800)
            .with_budget(BudgetBand::new(1, 2))
            .with_cuisines(["italian"])
            .with_dietary_restrictions(["vegetarian"])
    }

    #[test]
    fn perfect_match_scores_one() {
        let query = query();
        let mut p = place("Perfect", CENTER.0, CENTER.1);
        p.add_cuisine("italian");
        p.add_dietary_tag("vegetarian");
        p.rating = Some(5.0);
        p.price_level = Some(2);

        Scorer::new(&query).score(&mut p);

        assert_eq!(p.distance_m, Some(0.0));
        assert_eq!(p.confidence, Some(1.0));
    }

    #[test]
    fn total_miss_uses_every_penalty() {
        let query = query();
        let scorer = Scorer::new(&query);
        let mut p = place("Nowhere", 10.0, 10.0);
        p.add_cuisine("mexican");
        p.price_level = Some(4);

        let terms = scorer.breakdown(&p, f64::INFINITY);
        assert!((terms.match_multiplier - 0.51).abs() < 1e-12);
        assert_eq!(terms.rating_term, 0.6);
        assert_eq!(terms.distance_term, 0.0);
        assert_eq!(terms.price_term, 0.7);
        // 0.4*0.51 + 0.3*0.6 + 0 + 0.1*0.7
        assert_eq!(terms.composite(), 0.454);

        scorer.score(&mut p);
        assert_eq!(p.confidence, Some(0.454));
    }

    #[test]
    fn unconstrained_query_does_not_penalize() {
        let query = UserQuery::new(CENTER.0, CENTER.1, 800);
        let p = place("Plain", CENTER.0, CENTER.1);
        let terms = Scorer::new(&query).breakdown(&p, 0.0);
        assert_eq!(terms.match_multiplier, 1.0);
        assert_eq!(terms.price_term, 1.0);
        // 0.4 + 0.18 + 0.2 + 0.1
        assert_eq!(terms.composite(), 0.88);
    }

    #[test]
    fn unknown_price_is_out_of_band() {
        let query = query();
        let p = place("Mystery", CENTER.0, CENTER.1);
        assert_eq!(Scorer::new(&query).breakdown(&p, 0.0).price_term, 0.7);
    }

    #[test]
    fn any_one_requested_tag_avoids_the_penalty() {
        let query = UserQuery::new(CENTER.0, CENTER.1, 800).with_cuisines(["thai", " Italian"]);
        let mut p = place("Luigi's", CENTER.0, CENTER.1);
        p.add_cuisine("italian");
        assert_eq!(Scorer::new(&query).breakdown(&p, 0.0).match_multiplier, 1.0);
    }

    #[test]
    fn distance_falls_off_linearly_to_twice_the_radius() {
        let query = UserQuery::new(CENTER.0, CENTER.1, 800);
        let scorer = Scorer::new(&query);
        let p = place("Any", CENTER.0, CENTER.1);
        assert_eq!(scorer.breakdown(&p, 0.0).distance_term, 1.0);
        assert_eq!(scorer.breakdown(&p, 800.0).distance_term, 0.5);
        assert_eq!(scorer.breakdown(&p, 1600.0).distance_term, 0.0);
        assert_eq!(scorer.breakdown(&p, 5000.0).distance_term, 0.0);
    }

    #[test]
    fn zero_radius_does_not_divide_by_zero() {
        let query = UserQuery::new(CENTER.0, CENTER.1, 0);
        let p = place("Any", CENTER.0, CENTER.1);
        let terms = Scorer::new(&query).breakdown(&p, 1.0);
        assert!(terms.distance_term.is_finite());
        assert_eq!(terms.distance_term, 0.5);
    }

    #[test]
    fn rank_orders_by_confidence_then_rating() {
        let query = UserQuery::new(CENTER.0, CENTER.1, 800);
        let far = place("Far", CENTER.0 + 0.01, CENTER.1);
        let mut near_low = place("NearLow", CENTER.0, CENTER.1);
        near_low.rating = Some(3.0);
        let near_unrated = place("NearUnrated", CENTER.0, CENTER.1);

        let ranked = Scorer::new(&query).rank(vec![far, near_low, near_unrated]);
        let names: Vec<&str> = ranked.iter().map(|p| p.name.as_str()).collect();

        // near_low and near_unrated tie on confidence (unrated scores as 3.0),
        // then the rating tie-break treats the missing rating as 0
        assert_eq!(names, vec!["NearLow", "NearUnrated", "Far"]);
        assert!(ranked.iter().all(|p| p.confidence.is_some() && p.distance_m.is_some()));
    }

    #[test]
    fn rank_is_stable_on_exact_ties() {
        let query = UserQuery::new(CENTER.0, CENTER.1, 800);
        let places: Vec<Place> = ["a", "b", "c", "d"]
            .iter()
            .map(|name| {
                let mut p = place(name, CENTER.0, CENTER.1);
                p.rating = Some(4.0);
                p
            })
            .collect();

        let ranked = Scorer::new(&query).rank(places);
        let names: Vec<&str> = ranked.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn confidence_stays_within_unit_interval() {
        let query = query();
        let scorer = Scorer::new(&query);
        for (rating, distance) in [(None, 0.0), (Some(0.0), 1e9), (Some(5.0), 400.0)] {
            let mut p = place("x", CENTER.0, CENTER.1);
            p.rating = rating;
            let c = scorer.breakdown(&p, distance).composite();
            assert!((0.0..=1.0).contains(&c), "confidence {c} out of range");
        }
    }
}
