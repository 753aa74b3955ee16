//! Provider-native record shapes.
//!
//! A fetch collaborator hands back records exactly as its provider names
//! things. Rather than probing arbitrary maps for whichever keys happen to be
//! present, each known shape is a variant of [`RawRecord`], selected by the
//! `provider` tag:
//!
//! ```json
//! {"provider": "google", "id": "g_1", "lat": 40.71, "lon": -74.0, "price_level": 2, "types": ["italian"]}
//! {"provider": "yelp",   "id": "y_9", "lat": 40.71, "lon": -74.0, "price": "$$",   "categories": ["pizza"]}
//! ```
//!
//! Coordinates are optional at this layer so that a record missing them can
//! still be read and then rejected explicitly by the normalizer. Keys the
//! shape does not know about are kept in `extra` so provenance stays complete.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::Provider;

/// Record shape of Google Places style providers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoogleRecord {
    pub id: Option<String>,
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "vicinity")]
    pub address: String,
    pub lat: Option<f64>,
    #[serde(alias = "lng")]
    pub lon: Option<f64>,
    /// Numeric price tier
    pub price_level: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub types: Vec<String>,
    pub rating: Option<f64>,
    /// Fetch time, seconds since the Unix epoch
    pub ts: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Record shape of Yelp style providers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YelpRecord {
    pub id: Option<String>,
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "address1")]
    pub address: String,
    #[serde(alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(alias = "longitude", alias = "lng")]
    pub lon: Option<f64>,
    /// Tier encoded as repeated currency symbols, e.g. `"$$"`
    pub price: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub categories: Vec<String>,
    pub rating: Option<f64>,
    /// Fetch time, seconds since the Unix epoch
    pub ts: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Providers send `null` for an absent tag list.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One record as returned by a fetch collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum RawRecord {
    Google(GoogleRecord),
    Yelp(YelpRecord),
}

impl RawRecord {
    pub fn provider(&self) -> Provider {
        match self {
            RawRecord::Google(_) => Provider::Google,
            RawRecord::Yelp(_) => Provider::Yelp,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RawRecord::Google(r) => &r.name,
            RawRecord::Yelp(r) => &r.name,
        }
    }

    /// Provider-native id, falling back to the generic place id, then `""`.
    pub fn source_id(&self) -> &str {
        let (id, place_id) = match self {
            RawRecord::Google(r) => (&r.id, &r.place_id),
            RawRecord::Yelp(r) => (&r.id, &r.place_id),
        };
        id.as_deref().or(place_id.as_deref()).unwrap_or("")
    }

    /// The record as a JSON object, `provider` tag included.
    pub fn to_payload(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Parse a JSON array of tagged records.
    pub fn parse_many(json: &str) -> Result<Vec<RawRecord>> {
        Ok(serde_json::from_str(json)?)
    }
}
