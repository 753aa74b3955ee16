//! Registry of fetchers keyed by provider.

use std::collections::HashMap;
use std::sync::Arc;

use places::Provider;

use crate::fetcher::PlaceFetcher;

/// Owns the fetcher for each provider a search may use.
///
/// Built explicitly by the caller and handed to the orchestrator; there is no
/// process-wide default. Cloning is cheap (fetchers are shared via `Arc`).
///
/// ## Usage
/// ```ignore
/// let registry = FetcherRegistry::new()
///     .register(JsonFileFetcher::new(Provider::Google, "fixtures"))
///     .register(JsonFileFetcher::new(Provider::Yelp, "fixtures"));
/// ```
#[derive(Clone, Default)]
pub struct FetcherRegistry {
    fetchers: HashMap<Provider, Arc<dyn PlaceFetcher>>,
}

impl FetcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fetcher (builder pattern). A second fetcher for the same
    /// provider replaces the first.
    pub fn register(self, fetcher: impl PlaceFetcher + 'static) -> Self {
        self.register_shared(Arc::new(fetcher))
    }

    /// Add an already shared fetcher.
    pub fn register_shared(mut self, fetcher: Arc<dyn PlaceFetcher>) -> Self {
        self.fetchers.insert(fetcher.provider(), fetcher);
        self
    }

    pub fn get(&self, provider: Provider) -> Option<Arc<dyn PlaceFetcher>> {
        self.fetchers.get(&provider).cloned()
    }

    pub fn contains(&self, provider: Provider) -> bool {
        self.fetchers.contains_key(&provider)
    }

    /// Registered providers, sorted for stable output
    pub fn providers(&self) -> Vec<Provider> {
        let mut providers: Vec<Provider> = self.fetchers.keys().copied().collect();
        providers.sort();
        providers
    }

    pub fn len(&self) -> usize {
        self.fetchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fetchers.is_empty()
    }
}
