//! Geographic utilities: great-circle distance, track length, simplification.
//!
//! Distances use the haversine formula on a spherical Earth model. The
//! ~0.5% error versus an ellipsoidal model is fine for fitness tracking;
//! downstream pace and calorie figures are calibrated against it, so the
//! radius constant must not change.

use crate::{LocationSample, TrackPoint};

/// Mean Earth radius in kilometers (spherical model).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two samples in kilometers.
///
/// # Example
/// ```
/// use activity_tracker::{geo_utils::haversine_distance_km, LocationSample};
///
/// let london = LocationSample::new(51.5074, -0.1278, 0);
/// let paris = LocationSample::new(48.8566, 2.3522, 0);
/// let km = haversine_distance_km(&london, &paris);
/// assert!((km - 344.0).abs() < 2.0);
/// ```
pub fn haversine_distance_km(a: &LocationSample, b: &LocationSample) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Total length of a track in kilometers (sum of consecutive-pair distances).
pub fn track_length_km(samples: &[LocationSample]) -> f64 {
    samples
        .windows(2)
        .map(|pair| haversine_distance_km(&pair[0], &pair[1]))
        .sum()
}

/// Simplify a recorded track with Douglas-Peucker, for rendering or storage.
///
/// Sample metadata (timestamps, speed, accuracy) is dropped; the result is
/// a bare polyline. Uses the geo crate's implementation.
///
/// # Arguments
/// * `samples` - Recorded track
/// * `tolerance` - Maximum deviation from the original line, in degrees
///   (0.0001 is roughly 11 meters)
pub fn simplify_track(samples: &[LocationSample], tolerance: f64) -> Vec<TrackPoint> {
    use geo::{algorithm::simplify::Simplify, Coord, LineString};

    if samples.len() < 2 {
        return samples
            .iter()
            .map(|s| TrackPoint::new(s.latitude, s.longitude))
            .collect();
    }

    let coords: Vec<Coord<f64>> = samples
        .iter()
        .map(|s| Coord {
            x: s.longitude,
            y: s.latitude,
        })
        .collect();

    let line = LineString::new(coords);
    let simplified = line.simplify(&tolerance);

    simplified
        .coords()
        .map(|c| TrackPoint::new(c.y, c.x))
        .collect()
}
