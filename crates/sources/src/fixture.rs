//! Fetcher backed by JSON fixture files.
//!
//! Each provider reads `<dir>/<provider>.json`, a JSON array of tagged raw
//! records. To behave like a real nearby-search endpoint it only returns
//! records inside the requested radius, so widening the radius can surface
//! more places.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use places::{Provider, RawRecord, planar_distance_m};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{FetchError, Result};
use crate::fetcher::{FetchArgs, PlaceFetcher};

pub struct JsonFileFetcher {
    provider: Provider,
    path: PathBuf,
}

impl JsonFileFetcher {
    /// Fetcher for `provider` reading `<dir>/<provider>.json`
    pub fn new(provider: Provider, dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(format!("{}.json", provider.as_str()));
        Self { provider, path }
    }

    /// Coordinates of a record, if it has both
    fn coordinates(record: &RawRecord) -> Option<(f64, f64)> {
        match record {
            RawRecord::Google(r) => r.lat.zip(r.lon),
            RawRecord::Yelp(r) => r.lat.zip(r.lon),
        }
    }
}

#[async_trait]
impl PlaceFetcher for JsonFileFetcher {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn fetch(&self, args: &FetchArgs) -> Result<Vec<RawRecord>> {
        let path = self.path.display().to_string();
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: path.clone(),
                source,
            })?;
        let values: Vec<Value> = serde_json::from_str(&contents).map_err(|source| {
            FetchError::Parse {
                path: path.clone(),
                source,
            }
        })?;
        let total = values.len();

        // Decode records one by one; unreadable ones are skipped
        let records = values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<RawRecord>(value) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(file = %path, index, error = %err, "skipping unreadable record");
                    None
                }
            });

        let radius = f64::from(args.radius_m);
        let nearby: Vec<RawRecord> = records
            .filter(|record| {
                if record.provider() != self.provider {
                    warn!(
                        file = %path,
                        expected = %self.provider,
                        found = %record.provider(),
                        "skipping record tagged for another provider"
                    );
                    return false;
                }
                // Records without coordinates are passed on so the
                // normalizer can reject them explicitly.
                Self::coordinates(record).is_none_or(|(lat, lon)| {
                    planar_distance_m(args.lat, args.lon, lat, lon) <= radius
                })
            })
            .take(args.limit)
            .collect();

        debug!(
            provider = %self.provider,
            total,
            returned = nearby.len(),
            radius_m = args.radius_m,
            "fixture fetch"
        );
        Ok(nearby)
    }
}
