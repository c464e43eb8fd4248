//! # Route Playback
//!
//! Route processing and vehicle playback for a map-tracking dashboard.
//!
//! This library provides:
//! - Directions fetching with a deterministic mock fallback
//! - Route densification with cumulative distance/time/bearing annotation
//! - A smooth, speed-proportional playback animator with live metrics
//!
//! ## Features
//!
//! - **`server`** - Enable the actix-web directions proxy endpoint
//!
//! ## Quick Start
//!
//! ```rust
//! use route_playback::fallback;
//! use route_playback::normalizer::{densify_and_measure, NormalizerConfig};
//!
//! // Normalize the built-in fallback drive into a playable route
//! let route = densify_and_measure(fallback::waypoints(), &NormalizerConfig::default());
//!
//! assert!(route.len() > fallback::waypoints().len());
//! assert!(route.total_distance_km() > 1.0);
//! println!(
//!     "{} points, {:.2} km, {:.1} min",
//!     route.len(),
//!     route.total_distance_km(),
//!     route.total_minutes()
//! );
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, RouteError};

// Geographic utilities (distance, bearing, interpolation)
pub mod geo_utils;

// Wire types for the directions API boundary
pub mod directions;

// Route normalization (annotate, densify, measure)
pub mod normalizer;
pub use normalizer::{annotate_response, densify_and_measure, normalize_response, NormalizerConfig};

// The hand-authored fallback route
pub mod fallback;

// Directions-backed route provider with mock fallback
pub mod provider;
pub use provider::{ProviderConfig, RouteProvider};

// Playback animator
pub mod playback;
pub use playback::{
    LiveMetrics, PlaybackConfig, PlaybackHandle, PlaybackState, PlaybackUpdate, RoutePlayback,
    VehicleState,
};

// Directions proxy endpoint
#[cfg(feature = "server")]
pub mod proxy;
#[cfg(feature = "server")]
pub use proxy::{DirectionsProxy, ProxyConfig};

// ============================================================================
// Core Types
// ============================================================================

/// A raw coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use route_playback::GeoPoint;
/// let point = GeoPoint::new(37.7647, -122.4192); // Mission & 16th
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// An annotated but not yet measured point: the normalizer's
/// intermediate representation and the fallback route's authoring
/// format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f64,
    pub street_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

impl Waypoint {
    pub fn new(latitude: f64, longitude: f64, speed_kmh: f64, street_name: &str) -> Self {
        Self {
            latitude,
            longitude,
            speed_kmh,
            street_name: street_name.to_string(),
            instruction: None,
        }
    }

    pub fn with_instruction(mut self, instruction: &str) -> Self {
        self.instruction = Some(instruction.to_string());
        self
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// A fully annotated route point, produced exclusively by the
/// normalizer and immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePoint {
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f64,
    pub street_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    /// Cumulative distance from the route origin, km
    pub distance_from_start_km: f64,
    /// Cumulative travel time from the route origin, minutes
    pub estimated_time_min: f64,
    /// Outgoing heading toward the next point, degrees [0, 360). The
    /// final point carries the second-to-last point's heading; a
    /// single-point route has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_deg: Option<f64>,
}

impl RoutePoint {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// An ordered point sequence from origin to destination, with
/// precomputed totals.
///
/// Invariants: `distance_from_start_km` is non-decreasing across the
/// sequence, the first point's cumulative metrics are zero, and point
/// order is the travel direction. An empty route signals total failure
/// and is rejected by the playback animator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    points: Vec<RoutePoint>,
    total_distance_km: f64,
    total_minutes: f64,
}

impl Route {
    /// Build a route from measured points, reading the totals off the
    /// final point.
    pub fn from_points(points: Vec<RoutePoint>) -> Self {
        let total_distance_km = points.last().map(|p| p.distance_from_start_km).unwrap_or(0.0);
        let total_minutes = points.last().map(|p| p.estimated_time_min).unwrap_or(0.0);
        Self {
            points,
            total_distance_km,
            total_minutes,
        }
    }

    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<RoutePoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total route length in kilometres.
    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_km
    }

    /// Total estimated travel time in minutes.
    pub fn total_minutes(&self) -> f64 {
        self.total_minutes
    }
}

// ============================================================================
// Tests
// ============================================================================
