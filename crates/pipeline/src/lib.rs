//! Processing core for place search results.
//!
//! This crate provides:
//! - Normalization of provider records into [`places::Place`]
//! - Fuzzy name similarity and cross-source deduplication
//! - Confidence scoring and ranking
//! - TOML configuration for the tunable thresholds
//!
//! ## Architecture
//! Each search round flows through three stages:
//! 1. The normalizer maps raw records onto places, dropping malformed ones
//! 2. The deduplicator folds listings of the same venue into one anchor
//! 3. The scorer sets distance and confidence, then ranks
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{PipelineConfig, PlacePipeline};
//!
//! let config = PipelineConfig::load("place-scout.toml")?;
//! let pipeline = PlacePipeline::new(config.dedupe);
//! let ranked = pipeline.process(records, &query);
//! ```

pub mod config;
pub mod dedupe;
pub mod error;
pub mod normalize;
pub mod place_pipeline;
pub mod scoring;
pub mod similarity;

// Re-export main types
pub use config::{DedupeConfig, ExpansionConfig, PipelineConfig};
pub use dedupe::{merge_into, Deduplicator};
pub use error::{ConfigError, Result};
pub use normalize::{normalize, normalize_all, normalize_at};
pub use place_pipeline::PlacePipeline;
pub use scoring::{ScoreBreakdown, Scorer};
pub use similarity::token_sort_ratio;
