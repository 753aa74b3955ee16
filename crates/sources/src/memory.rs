//! In-memory fetcher returning a fixed record list.

use std::sync::Mutex;

use async_trait::async_trait;
use places::{Provider, RawRecord};
use tracing::debug;

use crate::error::Result;
use crate::fetcher::{FetchArgs, PlaceFetcher};

/// Returns the same records on every call, whatever the radius.
///
/// Keeps a log of the arguments it was called with, which is what tests
/// and dry runs usually want to look at afterwards.
pub struct StaticFetcher {
    provider: Provider,
    records: Vec<RawRecord>,
    calls: Mutex<Vec<FetchArgs>>,
}

impl StaticFetcher {
    pub fn new(provider: Provider, records: Vec<RawRecord>) -> Self {
        Self {
            provider,
            records,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Arguments of every call so far, oldest first
    pub fn calls(&self) -> Vec<FetchArgs> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl PlaceFetcher for StaticFetcher {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn fetch(&self, args: &FetchArgs) -> Result<Vec<RawRecord>> {
        match self.calls.lock() {
            Ok(mut calls) => calls.push(args.clone()),
            Err(poisoned) => poisoned.into_inner().push(args.clone()),
        }
        let records: Vec<RawRecord> = self.records.iter().take(args.limit).cloned().collect();
        debug!(provider = %self.provider, count = records.len(), "static fetch");
        Ok(records)
    }
}
