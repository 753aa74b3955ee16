//! Core domain types for place aggregation.
//!
//! This module defines the fundamental data structures used throughout the system:
//! - [`Provider`]: the closed set of listing providers we know how to read
//! - [`UserQuery`]: what the caller is looking for and where
//! - [`Place`]: the canonical, provider-agnostic venue entity
//! - [`ResultSet`]: the ranked output of one orchestration call

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PlaceError, Result};
use crate::geo::planar_distance_m;

/// Highest price tier on the 0–4 ordinal scale.
pub const MAX_PRICE_LEVEL: u8 = 4;

/// Key under which a merged anchor keeps the raw payloads of its cluster.
pub const MERGED_RAW_KEY: &str = "_merged_raw";

// =============================================================================
// Provider
// =============================================================================

/// Listing providers with a known record shape.
///
/// Adding a provider means adding a variant here and a matching
/// [`RawRecord`](crate::raw::RawRecord) variant; every `match` on either
/// enum then points at the code that still needs a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Yelp,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Google, Provider::Yelp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Yelp => "yelp",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = PlaceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(Provider::Google),
            "yelp" => Ok(Provider::Yelp),
            other => Err(PlaceError::InvalidQuery(format!("unknown provider '{other}'"))),
        }
    }
}

// =============================================================================
// Query
// =============================================================================

/// Inclusive price band on the 0–4 scale. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetBand {
    pub min: Option<u8>,
    pub max: Option<u8>,
}

impl BudgetBand {
    pub fn new(min: u8, max: u8) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// True when at least one bound is set.
    pub fn is_constrained(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Whether a place's price level fits the band.
    ///
    /// An unknown price never fits a constrained band; an unconstrained band
    /// accepts everything.
    pub fn contains(&self, price_level: Option<u8>) -> bool {
        if !self.is_constrained() {
            return true;
        }
        let Some(level) = price_level else {
            return false;
        };
        self.min.is_none_or(|min| level >= min) && self.max.is_none_or(|max| level <= max)
    }
}

/// Structured search parameters.
///
/// A query value is never mutated during a search: every expansion round
/// derives a new value through [`UserQuery::with_radius`], so concurrent or
/// repeated searches over the same query cannot observe a half-widened radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserQuery {
    pub lat: f64,
    pub lon: f64,
    pub radius_m: u32,
    #[serde(default)]
    pub budget: BudgetBand,
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    /// Providers to query, in the order their results enter deduplication
    #[serde(default = "default_sources")]
    pub preferred_sources: Vec<Provider>,
    #[serde(default = "default_limit_per_source")]
    pub limit_per_source: usize,
    #[serde(default = "default_expand")]
    pub expand_on_insufficient_results: bool,
}

fn default_sources() -> Vec<Provider> {
    vec![Provider::Google, Provider::Yelp]
}

fn default_limit_per_source() -> usize {
    8
}

fn default_expand() -> bool {
    true
}

impl UserQuery {
    /// Create a query around a center with every optional field at its default
    pub fn new(lat: f64, lon: f64, radius_m: u32) -> Self {
        Self {
            lat,
            lon,
            radius_m,
            budget: BudgetBand::default(),
            cuisines: Vec::new(),
            dietary_restrictions: Vec::new(),
            preferred_sources: default_sources(),
            limit_per_source: default_limit_per_source(),
            expand_on_insufficient_results: default_expand(),
        }
    }

    pub fn with_budget(mut self, budget: BudgetBand) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_cuisines<I, S>(mut self, cuisines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cuisines = cuisines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dietary_restrictions<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dietary_restrictions = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sources(mut self, sources: Vec<Provider>) -> Self {
        self.preferred_sources = sources;
        self
    }

    pub fn with_limit_per_source(mut self, limit: usize) -> Self {
        self.limit_per_source = limit;
        self
    }

    pub fn with_expansion(mut self, enabled: bool) -> Self {
        self.expand_on_insufficient_results = enabled;
        self
    }

    /// Same query with a different radius.
    pub fn with_radius(&self, radius_m: u32) -> Self {
        Self {
            radius_m,
            ..self.clone()
        }
    }

    /// Check the center is a real coordinate pair.
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(PlaceError::InvalidQuery(format!(
                "latitude {} outside [-90, 90]",
                self.lat
            )));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(PlaceError::InvalidQuery(format!(
                "longitude {} outside [-180, 180]",
                self.lon
            )));
        }
        if let (Some(min), Some(max)) = (self.budget.min, self.budget.max) {
            if min > max {
                return Err(PlaceError::InvalidQuery(format!(
                    "budget min {min} is above max {max}"
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Place
// =============================================================================

/// Lower-case and trim a tag; `None` for tags that are empty afterwards.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim().to_lowercase();
    (!tag.is_empty()).then_some(tag)
}

/// Canonical venue entity.
///
/// Created by the normalizer, mutated by the deduplicator while merging and
/// by the scorer when it fills `distance_m` and `confidence`.
///
/// Tag sets are `BTreeSet`s and are only filled through [`Place::add_cuisine`]
/// and [`Place::add_dietary_tag`], so they never hold duplicates or empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    /// 0..=4 when known
    pub price_level: Option<u8>,
    pub cuisines: BTreeSet<String>,
    pub dietary_tags: BTreeSet<String>,
    /// 0.0..=5.0 when known
    pub rating: Option<f64>,
    pub source: Provider,
    pub source_id: String,
    pub last_checked: DateTime<Utc>,
    /// Provider payload this place was built from; gains a `_merged_raw`
    /// list once duplicates are folded into it.
    pub raw: Value,
    pub distance_m: Option<f64>,
    pub confidence: Option<f64>,
}

impl Place {
    pub fn add_cuisine(&mut self, tag: &str) {
        if let Some(tag) = normalize_tag(tag) {
            self.cuisines.insert(tag);
        }
    }

    pub fn add_dietary_tag(&mut self, tag: &str) {
        if let Some(tag) = normalize_tag(tag) {
            self.dietary_tags.insert(tag);
        }
    }

    /// Planar distance in meters from this place to a point
    pub fn distance_to(&self, lat: f64, lon: f64) -> f64 {
        planar_distance_m(self.lat, self.lon, lat, lon)
    }

    /// Raw payloads of every record merged into this place.
    ///
    /// Empty until the first merge; afterwards the anchor's own payload comes
    /// first, followed by each duplicate in merge order.
    pub fn provenance(&self) -> &[Value] {
        self.raw
            .get(MERGED_RAW_KEY)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of provider records behind this place (1 when never merged).
    pub fn source_count(&self) -> usize {
        self.provenance().len().max(1)
    }
}

// =============================================================================
// Result set
// =============================================================================

/// Metadata recorded alongside a ranked result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Query arguments used for the final round (radius already widened)
    pub query: UserQuery,
    pub expansions: u32,
    pub generated_at: DateTime<Utc>,
    pub num_results: usize,
}

/// Ranked places plus the metadata of the run that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub places: Vec<Place>,
    pub meta: ResultMetadata,
}

impl ResultSet {
    pub fn new(places: Vec<Place>, query: UserQuery, expansions: u32) -> Self {
        let num_results = places.len();
        Self {
            places,
            meta: ResultMetadata {
                query,
                expansions,
                generated_at: Utc::now(),
                num_results,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }
}
