//! # Tracking Engine
//!
//! Stateful workout tracking engine. Owns the session lifecycle, ingests
//! location samples pushed by the platform location source, and keeps
//! running distance/speed aggregates that are cheap to snapshot from a
//! display timer.
//!
//! ## Architecture
//!
//! The engine is a plain owned value: whoever orchestrates a workout
//! creates one and holds it for the session's lifetime. It has no
//! knowledge of UI, persistence, or networking. Any producer that can
//! call [`TrackingEngine::add_sample`] satisfies the inbound contract;
//! any consumer may poll [`TrackingEngine::current_stats`] between
//! samples. The engine assumes single-writer access within one event
//! loop; it is not a concurrent data structure.
//!
//! ## Lifecycle
//!
//! - Idle → `start()` → Active
//! - Active → `add_sample(..)` → Active (aggregates updated)
//! - Active → `stop(..)` → Idle (final [`TrackingStats`] returned,
//!   session state discarded)

use log::{debug, info};

use crate::error::{Result, TrackError};
use crate::geo_utils::haversine_distance_km;
use crate::stats::{derive_stats, ActivityType, TrackingStats};
use crate::{Bounds, LocationSample};

// ============================================================================
// Clock
// ============================================================================

/// Source of wall-clock time for session duration.
///
/// The engine only ever asks "what time is it now"; abstracting that one
/// call keeps duration-dependent statistics testable.
pub trait Clock: Send {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Mutable state of one active workout.
///
/// Created by `start()`, mutated by `add_sample()`, consumed by `stop()`.
/// The full sample history is retained because the path is part of the
/// final activity record; distance is still accumulated incrementally so
/// snapshots never rescan the history.
#[derive(Debug, Clone)]
struct TrackingSession {
    started_at_ms: i64,
    samples: Vec<LocationSample>,
    /// Most recently accepted sample; the reference point for the next
    /// distance increment. Replaced wholesale on every accepted sample,
    /// even a zero-movement one.
    last_sample: Option<LocationSample>,
    /// Monotonically non-decreasing while active.
    distance_km: f64,
    /// Highest source-reported speed seen so far, m/s.
    max_speed_mps: Option<f64>,
}

impl TrackingSession {
    fn new(started_at_ms: i64) -> Self {
        Self {
            started_at_ms,
            samples: Vec::new(),
            last_sample: None,
            distance_km: 0.0,
            max_speed_mps: None,
        }
    }

    fn elapsed_sec(&self, now_ms: i64) -> u64 {
        ((now_ms - self.started_at_ms).max(0) / 1000) as u64
    }
}

// ============================================================================
// Tracking Engine
// ============================================================================

/// The workout tracking engine.
///
/// At most one session is active at a time. See the module docs for the
/// lifecycle and threading contract.
///
/// # Example
/// ```
/// use activity_tracker::{ActivityType, LocationSample, TrackingEngine};
///
/// let mut engine = TrackingEngine::new();
/// engine.start().unwrap();
/// engine.add_sample(LocationSample::new(51.5074, -0.1278, 0));
/// engine.add_sample(LocationSample::new(51.5080, -0.1278, 1000));
/// let stats = engine.stop(ActivityType::Run);
/// assert!(stats.distance_km > 0.0);
/// ```
pub struct TrackingEngine {
    session: Option<TrackingSession>,
    clock: Box<dyn Clock>,
}

impl TrackingEngine {
    /// Create an idle engine using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// Create an idle engine with a caller-supplied clock.
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            session: None,
            clock,
        }
    }

    /// Whether a session is currently active.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// When the active session began (milliseconds since epoch).
    pub fn started_at_ms(&self) -> Option<i64> {
        self.session.as_ref().map(|s| s.started_at_ms)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Begin a new tracking session.
    ///
    /// Resets accumulated distance and sample history and starts accepting
    /// samples. Fails with [`TrackError::AlreadyTracking`] if a session is
    /// already active; the running session is left untouched.
    pub fn start(&mut self) -> Result<()> {
        if let Some(session) = &self.session {
            return Err(TrackError::AlreadyTracking {
                started_at_ms: session.started_at_ms,
            });
        }

        let now_ms = self.clock.now_ms();
        self.session = Some(TrackingSession::new(now_ms));
        info!("[TrackingEngine] Session started at {} ms", now_ms);
        Ok(())
    }

    /// Finalize the session and return its statistics.
    ///
    /// Computes the same snapshot as [`current_stats`](Self::current_stats)
    /// one last time, then transitions to idle and discards all session
    /// state. The returned snapshot is the caller's only copy of the final
    /// numbers. Calling `stop` while idle is tolerated and returns a
    /// zeroed snapshot, so callers may stop defensively.
    pub fn stop(&mut self, activity_type: ActivityType) -> TrackingStats {
        let Some(session) = self.session.take() else {
            return TrackingStats::zeroed();
        };

        let stats = derive_stats(
            session.distance_km,
            session.elapsed_sec(self.clock.now_ms()),
            session.max_speed_mps,
            activity_type,
        );
        info!(
            "[TrackingEngine] Session stopped: {:.2} km, {} s, {} samples ({})",
            stats.distance_km,
            stats.duration_sec,
            session.samples.len(),
            activity_type.as_str()
        );
        stats
    }

    // ========================================================================
    // Sample Ingestion
    // ========================================================================

    /// Ingest one location sample.
    ///
    /// Appends the sample to the session history and adds the great-circle
    /// distance from the previously accepted sample to the running total.
    /// Samples are processed strictly in call order; no reordering,
    /// deduplication, accuracy gating, or outlier rejection is performed.
    ///
    /// A sample arriving while idle is silently discarded. Location
    /// callbacks routinely fire once more after a stop, and that late
    /// delivery must not fail.
    pub fn add_sample(&mut self, sample: LocationSample) {
        let Some(session) = &mut self.session else {
            debug!("[TrackingEngine] Sample while idle, discarded");
            return;
        };

        if let Some(last) = &session.last_sample {
            let leg_km = haversine_distance_km(last, &sample);
            session.distance_km += leg_km;
            debug!(
                "[TrackingEngine] Sample accepted: +{:.4} km, total {:.4} km",
                leg_km, session.distance_km
            );
        }

        if let Some(speed) = sample.speed_mps {
            session.max_speed_mps = Some(match session.max_speed_mps {
                Some(max) => max.max(speed),
                None => speed,
            });
        }

        session.samples.push(sample);
        // The reference point moves even when no distance was covered:
        // resting accumulates duration, never distance.
        session.last_sample = Some(sample);
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Statistics for the session as of now. Pure read.
    ///
    /// Returns a zeroed snapshot while idle. Safe to poll on a display
    /// timer between samples; never yields NaN or infinity.
    pub fn current_stats(&self, activity_type: ActivityType) -> TrackingStats {
        match &self.session {
            Some(session) => derive_stats(
                session.distance_km,
                session.elapsed_sec(self.clock.now_ms()),
                session.max_speed_mps,
                activity_type,
            ),
            None => TrackingStats::zeroed(),
        }
    }

    /// Defensive copy of the ordered sample history.
    ///
    /// Empty while idle. Mutating the returned vector has no effect on the
    /// engine's internal state.
    pub fn tracking_data(&self) -> Vec<LocationSample> {
        self.session
            .as_ref()
            .map(|s| s.samples.clone())
            .unwrap_or_default()
    }

    /// Bounding box of the recorded track, for viewport fitting.
    ///
    /// `None` while idle or before any sample has arrived.
    pub fn track_bounds(&self) -> Option<Bounds> {
        self.session
            .as_ref()
            .and_then(|s| Bounds::from_samples(&s.samples))
    }

    /// Current track as JSON, for handing to the persistence layer.
    pub fn track_json(&self) -> String {
        match &self.session {
            Some(session) => {
                serde_json::to_string(&session.samples).unwrap_or_else(|_| "[]".to_string())
            }
            None => "[]".to_string(),
        }
    }
}

impl Default for TrackingEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    /// Test clock backed by a shared counter.
    struct ManualClock(Arc<AtomicI64>);

    impl Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn manual_engine() -> (TrackingEngine, Arc<AtomicI64>) {
        let time = Arc::new(AtomicI64::new(0));
        let engine = TrackingEngine::with_clock(Box::new(ManualClock(time.clone())));
        (engine, time)
    }

    #[test]
    fn test_starts_idle() {
        let engine = TrackingEngine::new();
        assert!(!engine.is_active());
        assert!(engine.tracking_data().is_empty());
    }

    #[test]
    fn test_start_activates() {
        let (mut engine, _) = manual_engine();
        engine.start().unwrap();
        assert!(engine.is_active());
        assert_eq!(engine.started_at_ms(), Some(0));
    }

    #[test]
    fn test_double_start_rejected_and_session_preserved() {
        let (mut engine, time) = manual_engine();
        engine.start().unwrap();
        engine.add_sample(LocationSample::new(0.0, 0.0, 0));

        time.store(5000, Ordering::SeqCst);
        let err = engine.start().unwrap_err();
        assert_eq!(err, TrackError::AlreadyTracking { started_at_ms: 0 });

        // The original session keeps accumulating.
        engine.add_sample(LocationSample::new(0.0, 0.01, 5000));
        assert_eq!(engine.tracking_data().len(), 2);
        let stats = engine.current_stats(ActivityType::Run);
        assert!(stats.distance_km > 1.0);
    }

    #[test]
    fn test_sample_while_idle_is_noop() {
        let (mut engine, _) = manual_engine();
        engine.add_sample(LocationSample::new(0.0, 0.0, 0));
        assert!(engine.tracking_data().is_empty());
        assert_eq!(engine.current_stats(ActivityType::Run), TrackingStats::zeroed());
    }

    #[test]
    fn test_stop_while_idle_returns_zeroed() {
        let (mut engine, _) = manual_engine();
        let stats = engine.stop(ActivityType::Run);
        assert_eq!(stats, TrackingStats::zeroed());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut engine, time) = manual_engine();
        engine.start().unwrap();
        engine.add_sample(LocationSample::new(0.0, 0.0, 0));
        time.store(1000, Ordering::SeqCst);

        let first = engine.stop(ActivityType::Run);
        assert_eq!(first.duration_sec, 1);
        assert!(!engine.is_active());

        let second = engine.stop(ActivityType::Run);
        assert_eq!(second, TrackingStats::zeroed());
    }

    #[test]
    fn test_stop_clears_history() {
        let (mut engine, _) = manual_engine();
        engine.start().unwrap();
        engine.add_sample(LocationSample::new(0.0, 0.0, 0));
        engine.stop(ActivityType::Run);
        assert!(engine.tracking_data().is_empty());
        assert!(engine.track_bounds().is_none());
    }

    #[test]
    fn test_distance_is_monotonic() {
        let (mut engine, _) = manual_engine();
        engine.start().unwrap();

        let mut previous = 0.0;
        for i in 0..10 {
            // Wander east and back west; distance must still only grow.
            let lon = if i % 2 == 0 { 0.001 * i as f64 } else { -0.001 * i as f64 };
            engine.add_sample(LocationSample::new(0.0, lon, i * 1000));
            let distance = engine.current_stats(ActivityType::Run).distance_km;
            assert!(distance >= previous, "distance decreased at sample {}", i);
            previous = distance;
        }
    }

    #[test]
    fn test_zero_movement_adds_no_distance() {
        let (mut engine, _) = manual_engine();
        engine.start().unwrap();
        engine.add_sample(LocationSample::new(51.5074, -0.1278, 0));
        engine.add_sample(LocationSample::new(51.5074, -0.1278, 1000));
        engine.add_sample(LocationSample::new(51.5074, -0.1278, 2000));
        assert_eq!(engine.current_stats(ActivityType::Run).distance_km, 0.0);
    }

    #[test]
    fn test_stats_immediately_after_start() {
        let (mut engine, _) = manual_engine();
        engine.start().unwrap();

        let stats = engine.current_stats(ActivityType::Run);
        assert_eq!(stats.pace_min_per_km, 0.0);
        assert_eq!(stats.avg_speed_kmh, 0.0);
        assert_eq!(stats.calories_kcal, 0);
        assert!(stats.pace_min_per_km.is_finite());
        assert!(stats.avg_speed_kmh.is_finite());
    }

    #[test]
    fn test_max_speed_tracks_peak() {
        let (mut engine, _) = manual_engine();
        engine.start().unwrap();
        engine.add_sample(LocationSample::new(0.0, 0.0, 0).with_speed_mps(2.0));
        engine.add_sample(LocationSample::new(0.0, 0.001, 1000).with_speed_mps(5.0));
        engine.add_sample(LocationSample::new(0.0, 0.002, 2000).with_speed_mps(3.0));

        let stats = engine.current_stats(ActivityType::Run);
        assert!((stats.max_speed_kmh - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_tracking_data_is_defensive_copy() {
        let (mut engine, _) = manual_engine();
        engine.start().unwrap();
        engine.add_sample(LocationSample::new(0.0, 0.0, 0));

        let mut copy = engine.tracking_data();
        copy.push(LocationSample::new(1.0, 1.0, 1000));
        assert_eq!(engine.tracking_data().len(), 1);
    }

    #[test]
    fn test_track_json_round_trips() {
        let (mut engine, _) = manual_engine();
        assert_eq!(engine.track_json(), "[]");

        engine.start().unwrap();
        engine.add_sample(LocationSample::new(51.5074, -0.1278, 0));

        let parsed: Vec<LocationSample> = serde_json::from_str(&engine.track_json()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert!((parsed[0].latitude - 51.5074).abs() < 1e-9);
    }

    #[test]
    fn test_track_bounds() {
        let (mut engine, _) = manual_engine();
        engine.start().unwrap();
        assert!(engine.track_bounds().is_none());

        engine.add_sample(LocationSample::new(51.50, -0.13, 0));
        engine.add_sample(LocationSample::new(51.52, -0.11, 1000));

        let bounds = engine.track_bounds().unwrap();
        assert_eq!(bounds.min_lat, 51.50);
        assert_eq!(bounds.max_lat, 51.52);
        assert_eq!(bounds.min_lng, -0.13);
        assert_eq!(bounds.max_lng, -0.11);
    }

    #[test]
    fn test_restart_after_stop_resets_state() {
        let (mut engine, time) = manual_engine();
        engine.start().unwrap();
        engine.add_sample(LocationSample::new(0.0, 0.0, 0));
        engine.add_sample(LocationSample::new(0.0, 0.01, 1000));
        engine.stop(ActivityType::Run);

        time.store(10_000, Ordering::SeqCst);
        engine.start().unwrap();
        assert_eq!(engine.started_at_ms(), Some(10_000));
        assert_eq!(engine.current_stats(ActivityType::Run).distance_km, 0.0);
        assert!(engine.tracking_data().is_empty());
    }
}
