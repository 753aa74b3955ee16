//! Maps provider-native records onto the canonical [`Place`].
//!
//! ## Rules
//! - Price: a numeric tier is used as is; a tier string (`"$$"`) maps to its
//!   character count; anything else is unknown. Tiers outside 0..=4 are
//!   clamped (with a warning) so `Place::price_level` always honours its range.
//! - Cuisines: every category/type list the record carries, lower-cased and
//!   deduplicated.
//! - Dietary tags: providers do not report them; always empty here.
//! - Identifier: `id`, else `place_id`, else `""`.
//! - Timestamp: the record's `ts` if present, else the normalization time.
//! - Missing coordinates: [`PlaceError::MalformedRecord`]; there is no
//!   fallback position.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use places::{
    GoogleRecord, MAX_PRICE_LEVEL, Place, PlaceError, Provider, RawRecord, Result, YelpRecord,
};
use serde_json::Value;
use tracing::{debug, warn};

/// Normalize one record, stamping records without `ts` with the current time.
pub fn normalize(record: RawRecord) -> Result<Place> {
    normalize_at(record, Utc::now())
}

/// Normalize one record; `now` is used when the record carries no `ts`.
pub fn normalize_at(record: RawRecord, now: DateTime<Utc>) -> Result<Place> {
    let payload = record.to_payload()?;
    let source_id = record.source_id().to_string();
    match record {
        RawRecord::Google(google) => from_google(google, source_id, payload, now),
        RawRecord::Yelp(yelp) => from_yelp(yelp, source_id, payload, now),
    }
}

/// Normalize a batch, dropping (and logging) records that cannot be placed.
pub fn normalize_all(records: Vec<RawRecord>) -> Vec<Place> {
    let now = Utc::now();
    let total = records.len();
    let places: Vec<Place> = records
        .into_iter()
        .filter_map(|record| match normalize_at(record, now) {
            Ok(place) => Some(place),
            Err(err) => {
                warn!(error = %err, "dropping record");
                None
            }
        })
        .collect();
    debug!(total, kept = places.len(), "normalized records");
    places
}

fn from_google(
    record: GoogleRecord,
    source_id: String,
    payload: Value,
    now: DateTime<Utc>,
) -> Result<Place> {
    let (lat, lon) = require_coordinates(Provider::Google, &source_id, record.lat, record.lon)?;
    let price_level = record
        .price_level
        .map(|tier| clamp_price(Provider::Google, &source_id, tier));

    let mut place = empty_place(Provider::Google, source_id, lat, lon, payload);
    place.name = record.name;
    place.address = record.address;
    place.price_level = price_level;
    for tag in &record.types {
        place.add_cuisine(tag);
    }
    place.rating = record.rating.and_then(clamp_rating);
    place.last_checked = fetched_at(record.ts).unwrap_or(now);
    Ok(place)
}

fn from_yelp(
    record: YelpRecord,
    source_id: String,
    payload: Value,
    now: DateTime<Utc>,
) -> Result<Place> {
    let (lat, lon) = require_coordinates(Provider::Yelp, &source_id, record.lat, record.lon)?;
    let price_level = record.price.as_deref().map(|price| {
        let tier = i64::try_from(price.chars().count()).unwrap_or(i64::MAX);
        clamp_price(Provider::Yelp, &source_id, tier)
    });

    let mut place = empty_place(Provider::Yelp, source_id, lat, lon, payload);
    place.name = record.name;
    place.address = record.address;
    place.price_level = price_level;
    for tag in &record.categories {
        place.add_cuisine(tag);
    }
    place.rating = record.rating.and_then(clamp_rating);
    place.last_checked = fetched_at(record.ts).unwrap_or(now);
    Ok(place)
}

fn empty_place(provider: Provider, source_id: String, lat: f64, lon: f64, raw: Value) -> Place {
    Place {
        name: String::new(),
        address: String::new(),
        lat,
        lon,
        price_level: None,
        cuisines: BTreeSet::new(),
        dietary_tags: BTreeSet::new(),
        rating: None,
        source: provider,
        source_id,
        last_checked: DateTime::<Utc>::UNIX_EPOCH,
        raw,
        distance_m: None,
        confidence: None,
    }
}

fn require_coordinates(
    provider: Provider,
    source_id: &str,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<(f64, f64)> {
    let malformed = |reason: &str| PlaceError::MalformedRecord {
        provider,
        source_id: source_id.to_string(),
        reason: reason.to_string(),
    };
    let lat = lat.ok_or_else(|| malformed("missing latitude"))?;
    let lon = lon.ok_or_else(|| malformed("missing longitude"))?;
    if !lat.is_finite() || !lon.is_finite() {
        return Err(malformed("non-finite coordinates"));
    }
    Ok((lat, lon))
}

fn clamp_price(provider: Provider, source_id: &str, tier: i64) -> u8 {
    let clamped = tier.clamp(0, i64::from(MAX_PRICE_LEVEL));
    if clamped != tier {
        warn!(%provider, source_id, tier, clamped, "price tier outside 0..=4");
    }
    // within 0..=4 after the clamp
    clamped as u8
}

fn clamp_rating(rating: f64) -> Option<f64> {
    rating.is_finite().then(|| rating.clamp(0.0, 5.0))
}

/// Embedded fetch time (epoch seconds), if present and representable.
fn fetched_at(ts: Option<f64>) -> Option<DateTime<Utc>> {
    let ts = ts.filter(|ts| ts.is_finite())?;
    DateTime::from_timestamp_micros((ts * 1_000_000.0).round() as i64)
}
