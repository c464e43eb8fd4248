//! Geographic utilities: distance, bearing and interpolation.
//!
//! These are the pure building blocks of the normalization and playback
//! pipeline. Distances are great-circle (Haversine); interpolation is
//! linear in latitude/longitude, which is adequate at the sub-kilometre
//! segment granularity used throughout this crate.

use crate::GeoPoint;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two points, in kilometres.
///
/// Symmetric, and exactly 0 for identical points.
///
/// # Example
/// ```
/// use route_playback::{geo_utils::distance_km, GeoPoint};
///
/// let london = GeoPoint::new(51.5074, -0.1278);
/// let paris = GeoPoint::new(48.8566, 2.3522);
/// let d = distance_km(&london, &paris);
/// assert!(d > 300.0 && d < 400.0);
/// ```
pub fn distance_km(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let d_lat = (p2.latitude - p1.latitude).to_radians();
    let d_lng = (p2.longitude - p1.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + p1.latitude.to_radians().cos()
            * p2.latitude.to_radians().cos()
            * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Initial compass bearing from `p1` toward `p2`, in degrees `[0, 360)`.
///
/// The direction is undefined for identical points; 0 is returned in
/// that case and callers must not rely on it.
pub fn bearing_degrees(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let start_lat = p1.latitude.to_radians();
    let start_lng = p1.longitude.to_radians();
    let end_lat = p2.latitude.to_radians();
    let end_lng = p2.longitude.to_radians();

    let d_lng = end_lng - start_lng;
    let y = d_lng.sin() * end_lat.cos();
    let x = start_lat.cos() * end_lat.sin() - start_lat.sin() * end_lat.cos() * d_lng.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Interpolate between two angles along the shortest arc, in degrees
/// `[0, 360)`.
///
/// Wraps correctly across the 0/360 boundary: `lerp_angle(350.0, 10.0,
/// 0.5)` is 0, never 180.
pub fn lerp_angle(a: f64, b: f64, t: f64) -> f64 {
    // Signed shortest delta in [-180, 180)
    let delta = (b - a + 540.0) % 360.0 - 180.0;
    (a + delta * t).rem_euclid(360.0)
}

/// Linear latitude/longitude interpolation between two points.
pub fn lerp_point(p1: &GeoPoint, p2: &GeoPoint, t: f64) -> GeoPoint {
    GeoPoint::new(
        p1.latitude + (p2.latitude - p1.latitude) * t,
        p1.longitude + (p2.longitude - p1.longitude) * t,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_identical_points_is_zero() {
        let p = GeoPoint::new(37.7647, -122.4192);
        assert_eq!(distance_km(&p, &p), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = GeoPoint::new(37.7647, -122.4192);
        let b = GeoPoint::new(37.7757, -122.4194);
        assert!((distance_km(&a, &b) - distance_km(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn test_distance_known_value() {
        // London to Paris, roughly 344 km great-circle
        let london = GeoPoint::new(51.5074, -0.1278);
        let paris = GeoPoint::new(48.8566, 2.3522);
        let d = distance_km(&london, &paris);
        assert!(d > 340.0 && d < 348.0, "got {}", d);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = GeoPoint::new(0.0, 0.0);
        let north = GeoPoint::new(1.0, 0.0);
        let east = GeoPoint::new(0.0, 1.0);

        assert!((bearing_degrees(&origin, &north) - 0.0).abs() < 1e-9);
        assert!((bearing_degrees(&origin, &east) - 90.0).abs() < 1e-9);
        assert!((bearing_degrees(&north, &origin) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_identical_points_is_zero() {
        let p = GeoPoint::new(37.7647, -122.4192);
        assert_eq!(bearing_degrees(&p, &p), 0.0);
    }

    #[test]
    fn test_lerp_angle_wraps_across_north() {
        assert_eq!(lerp_angle(350.0, 10.0, 0.5), 0.0);
        assert_eq!(lerp_angle(10.0, 350.0, 0.5), 0.0);
    }

    #[test]
    fn test_lerp_angle_endpoints() {
        for &(a, b) in &[(0.0, 90.0), (350.0, 10.0), (123.4, 321.0), (90.0, 270.0)] {
            assert!((lerp_angle(a, b, 0.0) - a.rem_euclid(360.0)).abs() < 1e-9);
            assert!((lerp_angle(a, b, 1.0) - b.rem_euclid(360.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_lerp_point_midpoint() {
        let a = GeoPoint::new(10.0, 20.0);
        let b = GeoPoint::new(12.0, 24.0);
        let mid = lerp_point(&a, &b, 0.5);
        assert_eq!(mid.latitude, 11.0);
        assert_eq!(mid.longitude, 22.0);
    }
}
