//! Route normalization: from a sparse directions response (or
//! hand-authored waypoints) to a dense, metrics-annotated point sequence.
//!
//! Normalization happens in two stages:
//!
//! 1. **Annotate** (response path only): decode the overview polyline,
//!    drop encoding-noise duplicates, and assign each raw point to the
//!    narrated step it geographically belongs to, inheriting that step's
//!    speed, street name and instruction.
//! 2. **Densify and measure** (shared): subdivide every segment so none
//!    exceeds [`NormalizerConfig::max_segment_km`], then compute
//!    cumulative distance, cumulative travel time and the outgoing
//!    bearing for every point in a single pure pass.
//!
//! The output [`Route`] is immutable; the playback animator consumes it
//! as-is.

use log::debug;

use crate::directions::{street_name, strip_markup, DirectionsResponse};
use crate::error::{OptionExt, Result, RouteError};
use crate::geo_utils::{bearing_degrees, distance_km, lerp_point};
use crate::{GeoPoint, Route, RoutePoint, Waypoint};

/// Configuration for route normalization.
///
/// The duplicate and step-match thresholds are tuned constants inherited
/// from the shipping behavior; they are exposed here rather than
/// re-derived.
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Maximum densified segment length. Default: 0.02 km (20 m)
    pub max_segment_km: f64,

    /// Points closer than this to the previously kept point are treated
    /// as polyline encoding noise and dropped. Default: 0.00005 km
    pub duplicate_threshold_km: f64,

    /// A raw point belongs to a step when the step's own sub-path has a
    /// point within this distance. Default: 0.1 km
    pub step_match_threshold_km: f64,

    /// Lower clamp for step-derived speeds. Default: 10 km/h
    pub min_speed_kmh: f64,

    /// Upper clamp for step-derived speeds. Default: 80 km/h
    pub max_speed_kmh: f64,

    /// Speed assumed when a step lacks timing data, and the divisor of
    /// last resort when an average segment speed comes out zero.
    /// Default: 40 km/h
    pub default_speed_kmh: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_segment_km: 0.02,
            duplicate_threshold_km: 0.00005,
            step_match_threshold_km: 0.1,
            min_speed_kmh: 10.0,
            max_speed_kmh: 80.0,
            default_speed_kmh: 40.0,
        }
    }
}

/// Decode an encoded polyline (precision 5) into `GeoPoint`s.
fn decode_points(encoded: &str) -> Result<Vec<GeoPoint>> {
    let line = polyline::decode_polyline(encoded, 5).map_err(|e| RouteError::InvalidResponse {
        message: format!("polyline decode failed: {}", e),
    })?;
    Ok(line.coords().map(|c| GeoPoint::new(c.y, c.x)).collect())
}

/// Convert a directions response into annotated waypoints.
///
/// Walks the decoded overview path in order, dropping near-duplicate
/// points, and keeps a forward-only cursor into the step list so each
/// point is annotated with the speed, street name and instruction of the
/// step it geographically belongs to. The cursor never moves backward
/// and clamps at the last step once exhausted.
pub fn annotate_response(
    response: &DirectionsResponse,
    config: &NormalizerConfig,
) -> Result<Vec<Waypoint>> {
    let route = response.routes.first().ok_or_invalid("response has no routes")?;
    let leg = route.legs.first().ok_or_invalid("route has no legs")?;
    if leg.steps.is_empty() {
        return Err(RouteError::InvalidResponse {
            message: "route leg has no steps".to_string(),
        });
    }
    let overview = route
        .overview_polyline
        .as_ref()
        .ok_or_invalid("route has no overview polyline")?;

    let raw = decode_points(&overview.points)?;
    if raw.is_empty() {
        return Err(RouteError::InvalidResponse {
            message: "overview polyline decoded to no points".to_string(),
        });
    }

    // Decode each step's sub-path once up front; a step whose polyline
    // fails to decode matches nothing and the cursor skips past it.
    let step_paths: Vec<Vec<GeoPoint>> = leg
        .steps
        .iter()
        .map(|step| decode_points(&step.polyline.points).unwrap_or_default())
        .collect();

    let mut waypoints: Vec<Waypoint> = Vec::with_capacity(raw.len());
    let mut cursor = 0usize;
    let mut last_kept: Option<GeoPoint> = None;

    for point in raw.into_iter().filter(GeoPoint::is_valid) {
        if let Some(prev) = last_kept {
            if distance_km(&prev, &point) < config.duplicate_threshold_km {
                continue;
            }
        }

        while cursor < leg.steps.len() {
            let near = step_paths[cursor]
                .iter()
                .any(|sp| distance_km(&point, sp) < config.step_match_threshold_km);
            if near {
                break;
            }
            cursor += 1;
        }
        let step = &leg.steps[cursor.min(leg.steps.len() - 1)];

        let speed_kmh = match (step.distance, step.duration) {
            (Some(d), Some(t)) if t.value > 0.0 => {
                ((d.value / t.value) * 3.6).clamp(config.min_speed_kmh, config.max_speed_kmh)
            }
            _ => config.default_speed_kmh,
        };

        let instruction = step.html_instructions.as_deref().map(strip_markup);
        let street = instruction
            .as_deref()
            .map(street_name)
            .unwrap_or_else(|| "Road".to_string());

        waypoints.push(Waypoint {
            latitude: point.latitude,
            longitude: point.longitude,
            speed_kmh,
            street_name: street,
            instruction,
        });

        last_kept = Some(point);
    }

    debug!(
        "annotated {} waypoints across {} steps",
        waypoints.len(),
        leg.steps.len()
    );
    Ok(waypoints)
}

/// Densify a waypoint sequence and compute cumulative metrics.
///
/// Between every consecutive pair, `ceil(L / max_segment_km)` (minimum
/// 1) evenly spaced points are inserted; each inherits the segment
/// start's speed and street name, and only the first carries the
/// instruction so narration is not repeated. The original final waypoint
/// is appended unchanged.
///
/// Measurement is a pure second pass over the densified sequence:
/// cumulative distance, cumulative minutes (using the average of the
/// neighboring speeds, never dividing by zero), and the outgoing bearing
/// stored at the segment's *start* point. The final point copies the
/// second-to-last rotation, since it has no outgoing bearing of its own.
pub fn densify_and_measure(waypoints: &[Waypoint], config: &NormalizerConfig) -> Route {
    if waypoints.is_empty() {
        return Route::from_points(Vec::new());
    }

    let mut densified: Vec<Waypoint> = Vec::new();
    for pair in waypoints.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let segment_km = distance_km(&a.position(), &b.position());
        let parts = ((segment_km / config.max_segment_km).ceil() as usize).max(1);

        for p in 0..parts {
            let frac = p as f64 / parts as f64;
            let position = lerp_point(&a.position(), &b.position(), frac);
            densified.push(Waypoint {
                latitude: position.latitude,
                longitude: position.longitude,
                speed_kmh: a.speed_kmh,
                street_name: a.street_name.clone(),
                instruction: if p == 0 { a.instruction.clone() } else { None },
            });
        }
    }
    densified.push(waypoints[waypoints.len() - 1].clone());

    let n = densified.len();
    let mut cumulative_km = vec![0.0; n];
    let mut cumulative_min = vec![0.0; n];
    let mut rotation: Vec<Option<f64>> = vec![None; n];

    for i in 1..n {
        let prev = &densified[i - 1];
        let cur = &densified[i];
        let d = distance_km(&prev.position(), &cur.position());
        cumulative_km[i] = cumulative_km[i - 1] + d;

        let mut avg_speed = (prev.speed_kmh + cur.speed_kmh) / 2.0;
        if avg_speed <= 0.0 {
            avg_speed = if cur.speed_kmh > 0.0 {
                cur.speed_kmh
            } else {
                config.default_speed_kmh
            };
        }
        cumulative_min[i] = cumulative_min[i - 1] + d / avg_speed * 60.0;

        // The bearing stored at i-1 is the heading *leaving* i-1 toward i.
        rotation[i - 1] = Some(bearing_degrees(&prev.position(), &cur.position()));
    }
    if n >= 2 {
        rotation[n - 1] = rotation[n - 2];
    }

    let points = densified
        .into_iter()
        .enumerate()
        .map(|(i, w)| RoutePoint {
            latitude: w.latitude,
            longitude: w.longitude,
            speed_kmh: w.speed_kmh,
            street_name: w.street_name,
            instruction: w.instruction,
            distance_from_start_km: cumulative_km[i],
            estimated_time_min: cumulative_min[i],
            rotation_deg: rotation[i],
        })
        .collect();

    Route::from_points(points)
}

/// Full response path: annotate, then densify and measure.
pub fn normalize_response(response: &DirectionsResponse, config: &NormalizerConfig) -> Result<Route> {
    let waypoints = annotate_response(response, config)?;
    Ok(densify_and_measure(&waypoints, config))
}
