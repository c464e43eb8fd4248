//! Playback animator: drives a vehicle marker along a normalized route.
//!
//! [`RoutePlayback`] consumes a [`Route`] and emits a continuous stream
//! of interpolated vehicle states over a `tokio::sync::watch` channel —
//! position, bearing and speed blended between segment endpoints — plus
//! live metrics (current instruction, remaining distance, ETA) derived
//! on every frame. Each segment animates for a duration proportional to
//! its real-world length, so the marker moves at a believable pace
//! regardless of point spacing.
//!
//! ## Cancellation
//!
//! Supplying a new route or calling [`RoutePlayback::stop`] tears the
//! active animation down synchronously: the cancel flag is set before
//! the task is aborted, and the task re-checks the flag before every
//! send, so subscribers of a discarded playback never observe another
//! update.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Local;
use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};

use crate::error::{Result, RouteError};
use crate::geo_utils::{bearing_degrees, distance_km, lerp_angle, lerp_point};
use crate::{GeoPoint, Route};

/// Configuration for the playback animator.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Milliseconds of animation per kilometre of segment length.
    /// Default: 8000.0
    pub ms_per_km: f64,

    /// Lower clamp for a single segment's animation. Default: 500 ms
    pub min_segment_ms: u64,

    /// Upper clamp for a single segment's animation. Default: 5000 ms
    pub max_segment_ms: u64,

    /// Frame pacing between update notifications. Default: 16 ms,
    /// roughly one animation frame.
    pub frame_interval: Duration,

    /// Speed assumed when a route point carries no usable speed.
    /// Default: 30 km/h
    pub default_speed_kmh: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            ms_per_km: 8000.0,
            min_segment_ms: 500,
            max_segment_ms: 5000,
            frame_interval: Duration::from_millis(16),
            default_speed_kmh: 30.0,
        }
    }
}

/// Animator lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum PlaybackState {
    Idle,
    Running,
    Completed,
}

/// Interpolated vehicle state emitted on every frame.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleState {
    pub position: GeoPoint,
    /// Compass heading in degrees [0, 360)
    pub bearing_deg: f64,
    pub speed_kmh: f64,
    pub street_name: String,
    /// Index of the segment currently being animated
    pub segment_index: usize,
    /// Fraction 0..1 within the current segment
    pub progress: f64,
}

/// Live trip metrics, recomputed on every frame.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMetrics {
    /// The narration currently shown to the driver
    pub current_instruction: String,
    pub remaining_distance_km: f64,
    /// Estimated arrival as local clock time, "HH:MM"
    pub eta: String,
}

/// Payload delivered to playback subscribers.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackUpdate {
    pub state: PlaybackState,
    pub vehicle: VehicleState,
    pub metrics: LiveMetrics,
}

/// Handle to a running animation task.
///
/// Dropping the handle cancels the animation; no update is delivered
/// after cancellation.
pub struct PlaybackHandle {
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
    updates: watch::Receiver<PlaybackUpdate>,
}

impl PlaybackHandle {
    /// A new subscription to this playback's updates.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackUpdate> {
        self.updates.clone()
    }

    /// Cancel the animation. In-flight timer callbacks become no-ops.
    pub fn stop(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
    }

    /// Whether the animation task has finished (completed or cancelled).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The playback animator. Owns at most one active animation; supplying
/// a new route replaces and invalidates the previous one.
pub struct RoutePlayback {
    config: PlaybackConfig,
    current: Option<PlaybackHandle>,
}

impl RoutePlayback {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            config,
            current: None,
        }
    }

    /// Start animating a route, replacing any active playback.
    ///
    /// Returns a subscription yielding a [`PlaybackUpdate`] per frame;
    /// the channel starts at segment 0, progress 0. Must be called from
    /// within a tokio runtime. An empty route is rejected with
    /// [`RouteError::EmptyRoute`].
    pub fn play(&mut self, route: Route) -> Result<watch::Receiver<PlaybackUpdate>> {
        if route.is_empty() {
            return Err(RouteError::EmptyRoute);
        }
        self.stop();

        let initial_instruction = route.points()[0]
            .instruction
            .clone()
            .unwrap_or_default();
        let initial = if route.len() == 1 {
            completed_update(&route, &initial_instruction, &self.config)
        } else {
            frame_update(&route, 0, 0.0, &initial_instruction, &self.config)
        };
        let (tx, rx) = watch::channel(initial);

        let cancelled = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(run_animation(
            route,
            self.config.clone(),
            tx,
            Arc::clone(&cancelled),
        ));

        self.current = Some(PlaybackHandle {
            cancelled,
            task,
            updates: rx.clone(),
        });
        Ok(rx)
    }

    /// Tear down the active playback, if any. Synchronous and total: no
    /// further updates are delivered once this returns.
    pub fn stop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.stop();
        }
    }

    /// Current lifecycle state: `Idle` when nothing has been played (or
    /// after `stop`), otherwise the state of the latest update.
    pub fn state(&self) -> PlaybackState {
        match &self.current {
            None => PlaybackState::Idle,
            Some(handle) => handle.updates.borrow().state,
        }
    }
}

// ============================================================================
// Animation task
// ============================================================================

async fn run_animation(
    route: Route,
    config: PlaybackConfig,
    tx: watch::Sender<PlaybackUpdate>,
    cancelled: Arc<AtomicBool>,
) {
    let last = route.len() - 1;
    let mut current_instruction = route.points()[0]
        .instruction
        .clone()
        .unwrap_or_default();

    for index in 0..last {
        let points = route.points();
        let start = &points[index];
        let end = &points[index + 1];

        let segment_km = distance_km(&start.position(), &end.position());
        let duration_ms = (segment_km * config.ms_per_km)
            .clamp(config.min_segment_ms as f64, config.max_segment_ms as f64);
        let duration = Duration::from_millis(duration_ms.round() as u64);

        let started = Instant::now();
        let mut frames = interval(config.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            frames.tick().await;
            let t = (started.elapsed().as_secs_f64() / duration.as_secs_f64()).min(1.0);

            // Instruction changes only near the segment start, so it
            // does not flicker at segment boundaries.
            if t < 0.1 {
                if let Some(instruction) = &start.instruction {
                    current_instruction = instruction.clone();
                }
            }

            if cancelled.load(Ordering::SeqCst) {
                return;
            }
            let update = frame_update(&route, index, t, &current_instruction, &config);
            if tx.send(update).is_err() {
                debug!("all playback subscribers dropped, stopping animation");
                return;
            }
            if t >= 1.0 {
                break;
            }
        }
    }

    if cancelled.load(Ordering::SeqCst) {
        return;
    }
    let _ = tx.send(completed_update(&route, &current_instruction, &config));
    debug!("playback completed after {} segments", last);
}

fn effective_speed(speed_kmh: f64, config: &PlaybackConfig) -> f64 {
    if speed_kmh > 0.0 {
        speed_kmh
    } else {
        config.default_speed_kmh
    }
}

/// Format an arrival time `remaining_min` minutes from now as local
/// clock time.
fn format_eta(remaining_min: f64) -> String {
    let millis = (remaining_min.max(0.0) * 60_000.0) as i64;
    (Local::now() + chrono::Duration::milliseconds(millis))
        .format("%H:%M")
        .to_string()
}

fn frame_update(
    route: &Route,
    index: usize,
    t: f64,
    current_instruction: &str,
    config: &PlaybackConfig,
) -> PlaybackUpdate {
    let points = route.points();
    let start = &points[index];
    let end = &points[index + 1];

    let position = lerp_point(&start.position(), &end.position(), t);

    let fallback_bearing = || bearing_degrees(&start.position(), &end.position());
    let start_rotation = start.rotation_deg.unwrap_or_else(fallback_bearing);
    let end_rotation = end.rotation_deg.unwrap_or_else(fallback_bearing);
    let bearing_deg = lerp_angle(start_rotation, end_rotation, t);

    let start_speed = effective_speed(start.speed_kmh, config);
    let end_speed = effective_speed(end.speed_kmh, config);
    let speed_kmh = start_speed + (end_speed - start_speed) * t;

    let current_km = start.distance_from_start_km
        + (end.distance_from_start_km - start.distance_from_start_km) * t;
    let current_min =
        start.estimated_time_min + (end.estimated_time_min - start.estimated_time_min) * t;
    let remaining_distance_km = (route.total_distance_km() - current_km).max(0.0);
    let remaining_min = (route.total_minutes() - current_min).max(0.0);

    PlaybackUpdate {
        state: PlaybackState::Running,
        vehicle: VehicleState {
            position,
            bearing_deg,
            speed_kmh,
            street_name: start.street_name.clone(),
            segment_index: index,
            progress: t,
        },
        metrics: LiveMetrics {
            current_instruction: current_instruction.to_string(),
            remaining_distance_km,
            eta: format_eta(remaining_min),
        },
    }
}

fn completed_update(
    route: &Route,
    current_instruction: &str,
    config: &PlaybackConfig,
) -> PlaybackUpdate {
    let points = route.points();
    let final_point = &points[points.len() - 1];

    PlaybackUpdate {
        state: PlaybackState::Completed,
        vehicle: VehicleState {
            position: final_point.position(),
            bearing_deg: final_point.rotation_deg.unwrap_or(0.0),
            speed_kmh: effective_speed(final_point.speed_kmh, config),
            street_name: final_point.street_name.clone(),
            segment_index: points.len().saturating_sub(2),
            progress: 1.0,
        },
        metrics: LiveMetrics {
            current_instruction: current_instruction.to_string(),
            remaining_distance_km: 0.0,
            eta: format_eta(0.0),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoutePoint;

    fn point(latitude: f64, longitude: f64, km_from_start: f64) -> RoutePoint {
        RoutePoint {
            latitude,
            longitude,
            speed_kmh: 30.0,
            street_name: "Mission St".to_string(),
            instruction: None,
            distance_from_start_km: km_from_start,
            estimated_time_min: km_from_start * 2.0,
            rotation_deg: Some(0.0),
        }
    }

    /// Two points roughly 1 km apart along a meridian.
    fn one_km_route() -> Route {
        Route::from_points(vec![point(0.0, 0.0, 0.0), point(0.009, 0.0, 1.0)])
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_point_route_completes_after_clamped_duration() {
        let mut playback = RoutePlayback::new(PlaybackConfig::default());
        let mut updates = playback.play(one_km_route()).unwrap();

        let started = Instant::now();
        loop {
            updates.changed().await.unwrap();
            if updates.borrow().state == PlaybackState::Completed {
                break;
            }
        }
        let elapsed = started.elapsed();

        // 1 km * 8000 ms/km is clamped to the 5000 ms maximum
        assert!(elapsed >= Duration::from_millis(5000), "elapsed {:?}", elapsed);
        assert!(elapsed <= Duration::from_millis(5200), "elapsed {:?}", elapsed);
        assert_eq!(playback.state(), PlaybackState::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_frames_interpolate_position_and_metrics() {
        let mut playback = RoutePlayback::new(PlaybackConfig::default());
        let mut updates = playback.play(one_km_route()).unwrap();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let update = updates.borrow_and_update().clone();

        // Halfway through the single 5000 ms segment
        assert!(update.vehicle.progress > 0.4 && update.vehicle.progress < 0.6);
        assert!(update.vehicle.position.latitude > 0.003);
        assert!(update.vehicle.position.latitude < 0.006);
        assert!(update.metrics.remaining_distance_km < 0.7);
        assert_eq!(update.metrics.eta.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_stops_updates_mid_segment() {
        let mut playback = RoutePlayback::new(PlaybackConfig::default());
        let mut updates = playback.play(one_km_route()).unwrap();

        tokio::time::sleep(Duration::from_millis(1000)).await;
        let before = updates.borrow_and_update().clone();
        playback.stop();

        tokio::time::sleep(Duration::from_millis(2000)).await;
        let after = updates.borrow().clone();
        assert_eq!(before, after);
        assert_eq!(playback.state(), PlaybackState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_route_invalidates_previous_subscription() {
        let mut playback = RoutePlayback::new(PlaybackConfig::default());
        let mut first = playback.play(one_km_route()).unwrap();

        tokio::time::sleep(Duration::from_millis(1000)).await;
        let last_of_first = first.borrow_and_update().clone();

        let second_route = Route::from_points(vec![
            point(10.0, 10.0, 0.0),
            point(10.009, 10.0, 1.0),
        ]);
        let second = playback.play(second_route).unwrap();

        // The new subscription starts over at the new route's origin
        let update = second.borrow().clone();
        assert_eq!(update.vehicle.segment_index, 0);
        assert_eq!(update.vehicle.progress, 0.0);
        assert_eq!(update.vehicle.position.latitude, 10.0);

        // The discarded subscription never hears anything again
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(*first.borrow(), last_of_first);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_point_route_completes_immediately() {
        let mut playback = RoutePlayback::new(PlaybackConfig::default());
        let route = Route::from_points(vec![point(37.7647, -122.4192, 0.0)]);
        let mut updates = playback.play(route).unwrap();

        updates.changed().await.unwrap();
        let update = updates.borrow().clone();
        assert_eq!(update.state, PlaybackState::Completed);
        assert_eq!(update.vehicle.position.latitude, 37.7647);
        assert_eq!(update.metrics.remaining_distance_km, 0.0);
    }

    #[tokio::test]
    async fn test_empty_route_is_rejected() {
        let mut playback = RoutePlayback::new(PlaybackConfig::default());
        let result = playback.play(Route::from_points(Vec::new()));
        assert!(matches!(result, Err(RouteError::EmptyRoute)));
        assert_eq!(playback.state(), PlaybackState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_rotation_falls_back_to_segment_bearing() {
        let mut start = point(0.0, 0.0, 0.0);
        let mut end = point(0.009, 0.0, 1.0);
        start.rotation_deg = None;
        end.rotation_deg = None;

        let mut playback = RoutePlayback::new(PlaybackConfig::default());
        let updates = playback.play(Route::from_points(vec![start, end])).unwrap();

        // Due north
        let update = updates.borrow().clone();
        assert!(update.vehicle.bearing_deg.abs() < 1e-9);
    }
}
