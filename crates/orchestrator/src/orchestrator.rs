//! # Place Search Orchestrator
//!
//! This module drives one search from query to ranked result set:
//! 1. Fetch raw records from every preferred provider (concurrently)
//! 2. Concatenate them in preferred-source order
//! 3. Normalize, deduplicate and score them on the blocking pool
//! 4. If too few places survived, widen the radius and start over
//! 5. Bundle the final round's places with run metadata
//!
//! ## Expansion
//! A round is repeated from scratch with `radius * radius_factor` (truncated
//! to whole meters) while all of these hold:
//! - the round produced fewer than `min_results` places
//! - the query allows expansion
//! - fewer than `max_expansions` expansions have happened
//!
//! Rounds never reuse the previous round's places. Each round works on its
//! own [`UserQuery`] value, so the caller's query is never mutated.

use std::time::Instant;

use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use pipeline::{ExpansionConfig, PipelineConfig, PlacePipeline};
use places::{Place, RawRecord, ResultSet, UserQuery};
use sources::{FetchArgs, FetcherRegistry};

/// Coordinates fetchers and the processing pipeline for place searches.
#[derive(Clone)]
pub struct PlaceSearchOrchestrator {
    registry: FetcherRegistry,
    pipeline: PlacePipeline,
    expansion: ExpansionConfig,
}

impl PlaceSearchOrchestrator {
    /// Create an orchestrator over a set of fetchers.
    ///
    /// # Arguments
    /// * `registry` - One fetcher per provider that may appear in a query
    /// * `config` - Dedupe thresholds and expansion policy
    pub fn new(registry: FetcherRegistry, config: PipelineConfig) -> Self {
        Self {
            registry,
            pipeline: PlacePipeline::new(config.dedupe),
            expansion: config.expansion,
        }
    }

    /// Main entry point: search around the query's center.
    ///
    /// An empty result is not an error; callers decide how to present it.
    ///
    /// # Errors
    /// Fails when the query itself is invalid or a processing task panics.
    /// Provider failures are logged and treated as empty contributions.
    #[instrument(
        skip(self, query),
        fields(lat = query.lat, lon = query.lon, radius_m = query.radius_m)
    )]
    pub async fn run(&self, query: UserQuery) -> Result<ResultSet> {
        let start_time = Instant::now();
        query.validate().context("Invalid search query")?;

        let mut current = query;
        let mut expansions: u32 = 0;
        let mut places = self.search_round(&current).await?;

        while self.should_expand(&current, places.len(), expansions) {
            let widened = widen_radius(current.radius_m, self.expansion.radius_factor);
            info!(
                found = places.len(),
                min_results = self.expansion.min_results,
                from_m = current.radius_m,
                to_m = widened,
                "Too few results, expanding search radius"
            );
            current = current.with_radius(widened);
            expansions += 1;
            places = self.search_round(&current).await?;
        }

        info!(
            results = places.len(),
            expansions,
            radius_m = current.radius_m,
            elapsed = ?start_time.elapsed(),
            "Search complete"
        );
        Ok(ResultSet::new(places, current, expansions))
    }

    /// Whether another round is warranted after one that produced `count` places
    fn should_expand(&self, query: &UserQuery, count: usize, expansions: u32) -> bool {
        count < self.expansion.min_results
            && query.expand_on_insufficient_results
            && expansions < self.expansion.max_expansions
    }

    /// One full fetch → normalize → dedupe → score round
    async fn search_round(&self, query: &UserQuery) -> Result<Vec<Place>> {
        let records = self.fetch_round(query).await;

        // CPU-bound; keep it off the async workers
        let pipeline = self.pipeline;
        let query = query.clone();
        tokio::task::spawn_blocking(move || pipeline.process(records, &query))
            .await
            .context("Processing task panicked")
    }

    /// Fetch from every preferred provider concurrently.
    ///
    /// Records come back grouped by provider in preferred-source order, each
    /// group in the provider's own order. A provider with no registered
    /// fetcher, or whose fetch fails, contributes nothing.
    async fn fetch_round(&self, query: &UserQuery) -> Vec<RawRecord> {
        let args = FetchArgs::from_query(query);

        let fetches: Vec<_> = query
            .preferred_sources
            .iter()
            .filter_map(|&provider| match self.registry.get(provider) {
                Some(fetcher) => Some(fetcher),
                None => {
                    warn!(%provider, "No fetcher registered, skipping provider");
                    None
                }
            })
            .map(|fetcher| {
                let args = &args;
                async move { (fetcher.provider(), fetcher.fetch(args).await) }
            })
            .collect();

        // join_all yields outcomes in input order
        let outcomes = join_all(fetches).await;

        let mut records = Vec::new();
        for (provider, outcome) in outcomes {
            match outcome {
                Ok(batch) => {
                    debug!(%provider, count = batch.len(), "provider returned records");
                    records.extend(batch);
                }
                Err(err) => {
                    warn!(%provider, error = %err, "Provider fetch failed");
                }
            }
        }
        records
    }
}

/// Next radius after one expansion, truncated to whole meters.
pub fn widen_radius(radius_m: u32, factor: f64) -> u32 {
    // saturates at u32::MAX
    (f64::from(radius_m) * factor) as u32
}
