//! One full processing round: normalize, deduplicate, score.
//!
//! Every round starts from raw records; nothing carries over from an earlier
//! round's merged list.

use places::{Place, RawRecord, UserQuery};
use tracing::debug;

use crate::config::DedupeConfig;
use crate::dedupe::Deduplicator;
use crate::normalize::normalize_all;
use crate::scoring::Scorer;

/// Runs the three stages over one batch of provider records.
///
/// ## Usage
/// ```ignore
/// let pipeline = PlacePipeline::new(config.dedupe);
/// let ranked = pipeline.process(records, &query);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PlacePipeline {
    deduplicator: Deduplicator,
}

impl PlacePipeline {
    pub fn new(dedupe: DedupeConfig) -> Self {
        Self {
            deduplicator: Deduplicator::new(dedupe),
        }
    }

    /// Turn raw records into a ranked, deduplicated place list.
    ///
    /// `records` must already be in preferred-source order: the first record
    /// seen for a venue becomes its anchor.
    pub fn process(&self, records: Vec<RawRecord>, query: &UserQuery) -> Vec<Place> {
        let fetched = records.len();

        let places = normalize_all(records);
        let normalized = places.len();

        let places = self.deduplicator.dedupe(places);
        let merged = places.len();

        let ranked = Scorer::new(query).rank(places);
        debug!(fetched, normalized, merged, radius_m = query.radius_m, "round processed");
        ranked
    }
}
