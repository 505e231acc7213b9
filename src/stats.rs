//! Workout statistics derivation.
//!
//! Converts raw session aggregates (accumulated distance, elapsed time,
//! peak reported speed) into the snapshot displayed to the user. Every
//! ratio branches to zero instead of dividing by zero: pace and speed are
//! rendered directly and must never come out as NaN or infinity. The
//! presentation layer shows `0` values as a placeholder ("--").

use serde::{Deserialize, Serialize};

/// Supported workout types. Affects the calorie rate only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Run,
    Bike,
    Walk,
}

impl ActivityType {
    /// Calories burned per kilometer for this activity.
    pub fn calorie_rate_kcal_per_km(self) -> f64 {
        match self {
            ActivityType::Run => 60.0,
            ActivityType::Bike => 30.0,
            ActivityType::Walk => 40.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::Run => "run",
            ActivityType::Bike => "bike",
            ActivityType::Walk => "walk",
        }
    }
}

/// Immutable snapshot of workout statistics.
///
/// Returned by [`TrackingEngine::current_stats`](crate::TrackingEngine::current_stats)
/// while a session is live and by [`TrackingEngine::stop`](crate::TrackingEngine::stop)
/// as the final record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingStats {
    /// Accumulated great-circle distance in kilometers.
    pub distance_km: f64,
    /// Wall-clock seconds elapsed since session start.
    pub duration_sec: u64,
    /// Minutes per kilometer (0 when no distance has been covered).
    pub pace_min_per_km: f64,
    /// Estimated energy expenditure, rounded to whole kilocalories.
    pub calories_kcal: u32,
    /// Average speed in km/h (0 when no distance or no elapsed time).
    pub avg_speed_kmh: f64,
    /// Highest source-reported speed in km/h (0 if no sample carried one).
    pub max_speed_kmh: f64,
}

impl TrackingStats {
    /// All-zero snapshot, returned when no session is active.
    pub fn zeroed() -> Self {
        Self {
            distance_km: 0.0,
            duration_sec: 0,
            pace_min_per_km: 0.0,
            calories_kcal: 0,
            avg_speed_kmh: 0.0,
            max_speed_kmh: 0.0,
        }
    }
}

impl Default for TrackingStats {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Derive a statistics snapshot from raw session aggregates.
///
/// # Arguments
/// * `distance_km` - Accumulated haversine distance
/// * `duration_sec` - Elapsed wall-clock seconds
/// * `max_speed_mps` - Highest source-reported speed, if any sample carried one
/// * `activity_type` - Selects the calorie rate
pub fn derive_stats(
    distance_km: f64,
    duration_sec: u64,
    max_speed_mps: Option<f64>,
    activity_type: ActivityType,
) -> TrackingStats {
    let pace_min_per_km = if distance_km > 0.0 {
        (duration_sec as f64 / 60.0) / distance_km
    } else {
        0.0
    };

    let avg_speed_kmh = if distance_km > 0.0 && duration_sec > 0 {
        distance_km / (duration_sec as f64 / 3600.0)
    } else {
        0.0
    };

    let calories_kcal =
        (distance_km * activity_type.calorie_rate_kcal_per_km()).round() as u32;

    // Source speeds are m/s; display units are km/h.
    let max_speed_kmh = max_speed_mps.map(|mps| mps * 3.6).unwrap_or(0.0);

    TrackingStats {
        distance_km,
        duration_sec,
        pace_min_per_km,
        calories_kcal,
        avg_speed_kmh,
        max_speed_kmh,
    }
}
