//! The fetch collaborator seam.
//!
//! Each provider is reached through a [`PlaceFetcher`]. The orchestrator only
//! knows this trait: how a provider is called (HTTP, fixture file, canned
//! data) and how its errors look is the implementor's business.

use async_trait::async_trait;
use places::{BudgetBand, Provider, RawRecord, UserQuery};

use crate::error::Result;

/// Arguments handed to every fetcher in a round.
///
/// Derived from the round's query, so after an expansion the radius here is
/// already the widened one.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchArgs {
    pub lat: f64,
    pub lon: f64,
    pub radius_m: u32,
    pub limit: usize,
    pub cuisines: Vec<String>,
    pub budget: BudgetBand,
}

impl FetchArgs {
    pub fn from_query(query: &UserQuery) -> Self {
        Self {
            lat: query.lat,
            lon: query.lon,
            radius_m: query.radius_m,
            limit: query.limit_per_source,
            cuisines: query.cuisines.clone(),
            budget: query.budget,
        }
    }
}

/// A source of raw place records for one provider.
///
/// ## Design Note
/// - `Send + Sync` so fetchers can be shared behind `Arc` and called
///   concurrently within a round
/// - Returned records must be in the provider's own arrival order; the
///   deduplicator's anchor choice depends on it
#[async_trait]
pub trait PlaceFetcher: Send + Sync {
    /// Which provider this fetcher speaks for
    fn provider(&self) -> Provider;

    /// Fetch raw records around `args`' center.
    ///
    /// # Errors
    /// Any [`FetchError`](crate::FetchError); the caller treats it as an
    /// empty contribution from this provider.
    async fn fetch(&self, args: &FetchArgs) -> Result<Vec<RawRecord>>;
}
