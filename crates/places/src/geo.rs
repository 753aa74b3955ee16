//! Flat-earth distance helpers.
//!
//! Every distance in the system (duplicate proximity and distance from the
//! query center) uses the same local approximation: latitude and longitude
//! deltas are both converted to meters with a fixed 111 km per degree and
//! combined with the Euclidean norm. It ignores the cos(latitude) shrink of
//! longitude degrees; at city scale the error is acceptable for ranking.

/// Meters represented by one degree of latitude or longitude.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Planar distance in meters between two (lat, lon) points.
pub fn planar_distance_m(from_lat: f64, from_lon: f64, to_lat: f64, to_lon: f64) -> f64 {
    let dx = (from_lat - to_lat).abs() * METERS_PER_DEGREE;
    let dy = (from_lon - to_lon).abs() * METERS_PER_DEGREE;
    dx.hypot(dy)
}
