//! # Activity Tracker
//!
//! Workout tracking engine for GPS fitness applications.
//!
//! This library turns a live stream of GPS fixes into running and final
//! workout statistics:
//! - Incremental distance accumulation (haversine, spherical Earth)
//! - Duration, pace, average/max speed and calorie derivation
//! - Full path retention for rendering and persistence
//!
//! The engine is push-driven and has no dependency on UI, storage, or
//! networking: a location source calls [`TrackingEngine::add_sample`],
//! a display timer polls [`TrackingEngine::current_stats`], and stopping
//! yields the finalized [`TrackingStats`] record.
//!
//! ## Quick Start
//!
//! ```rust
//! use activity_tracker::{ActivityType, LocationSample, TrackingEngine};
//!
//! let mut engine = TrackingEngine::new();
//! engine.start().unwrap();
//!
//! engine.add_sample(LocationSample::new(51.5074, -0.1278, 0));
//! engine.add_sample(LocationSample::new(51.5080, -0.1290, 1000));
//!
//! let live = engine.current_stats(ActivityType::Run);
//! println!("so far: {:.2} km", live.distance_km);
//!
//! let record = engine.stop(ActivityType::Run);
//! assert!(record.distance_km > 0.0);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, TrackError};

// Geographic utilities (haversine distance, track length, simplification)
pub mod geo_utils;
pub use geo_utils::{haversine_distance_km, simplify_track, track_length_km, EARTH_RADIUS_KM};

// Statistics derivation (pace, speed, calories)
pub mod stats;
pub use stats::{derive_stats, ActivityType, TrackingStats};

// Session lifecycle and sample ingestion
pub mod engine;
pub use engine::{Clock, SystemClock, TrackingEngine};

// ============================================================================
// Core Types
// ============================================================================

/// One GPS fix as delivered by the platform location source.
///
/// Speed and accuracy are source-reported, not derived; altitude is
/// carried through for consumers but never used in computation.
///
/// # Example
/// ```
/// use activity_tracker::LocationSample;
/// let fix = LocationSample::new(51.5074, -0.1278, 1700000000000).with_speed_mps(2.8);
/// assert!(fix.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Milliseconds since epoch, as reported by the source.
    pub timestamp_ms: i64,
    /// Horizontal uncertainty in meters, if reported.
    pub accuracy_m: Option<f64>,
    /// Instantaneous speed in m/s, if reported.
    pub speed_mps: Option<f64>,
    /// Altitude in meters, if reported.
    pub altitude_m: Option<f64>,
}

impl LocationSample {
    /// Create a sample with no optional metadata.
    pub fn new(latitude: f64, longitude: f64, timestamp_ms: i64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp_ms,
            accuracy_m: None,
            speed_mps: None,
            altitude_m: None,
        }
    }

    /// Attach a source-reported speed (m/s).
    pub fn with_speed_mps(mut self, speed_mps: f64) -> Self {
        self.speed_mps = Some(speed_mps);
        self
    }

    /// Attach a source-reported horizontal accuracy (meters).
    pub fn with_accuracy_m(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }

    /// Attach a source-reported altitude (meters).
    pub fn with_altitude_m(mut self, altitude_m: f64) -> Self {
        self.altitude_m = Some(altitude_m);
        self
    }

    /// Check if the fix has in-range, finite coordinates.
    ///
    /// Provided for callers that want to pre-filter a source; the engine
    /// itself trusts every sample it is handed.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A bare coordinate on a rendered track (no fix metadata).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl TrackPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Bounding box for a recorded track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from recorded samples.
    pub fn from_samples(samples: &[LocationSample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for s in samples {
            min_lat = min_lat.min(s.latitude);
            max_lat = max_lat.max(s.latitude);
            min_lng = min_lng.min(s.longitude);
            max_lng = max_lng.max(s.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> TrackPoint {
        TrackPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
