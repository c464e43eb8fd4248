//! The hand-authored fallback route.
//!
//! Whenever the live directions fetch fails or returns unusable data,
//! the provider degrades to this fixed drive from the Mission District
//! to downtown San Francisco, following real streets. The waypoints are
//! sparse; [`crate::normalizer::densify_and_measure`] turns them into a
//! playable route like any fetched one.

use once_cell::sync::Lazy;

use crate::Waypoint;

static FALLBACK_WAYPOINTS: Lazy<Vec<Waypoint>> = Lazy::new(|| {
    vec![
        Waypoint::new(37.7647, -122.4192, 30.0, "Mission St")
            .with_instruction("Start at Mission & 16th"),
        Waypoint::new(37.7651, -122.4198, 20.0, "16th St")
            .with_instruction("Turn right onto 16th St"),
        Waypoint::new(37.7652, -122.4207, 25.0, "16th St")
            .with_instruction("Continue on 16th St"),
        Waypoint::new(37.7653, -122.4212, 25.0, "16th St"),
        Waypoint::new(37.7654, -122.4217, 20.0, "16th St")
            .with_instruction("Approaching Mission St"),
        Waypoint::new(37.7655, -122.4226, 15.0, "16th St"),
        Waypoint::new(37.7656, -122.4231, 10.0, "16th St")
            .with_instruction("Prepare to turn left"),
        Waypoint::new(37.7657, -122.4236, 15.0, "Mission St")
            .with_instruction("Turn left onto Mission St"),
        Waypoint::new(37.7662, -122.4235, 25.0, "Mission St"),
        Waypoint::new(37.7666, -122.4234, 30.0, "Mission St")
            .with_instruction("Continue on Mission St"),
        Waypoint::new(37.7671, -122.4233, 30.0, "Mission St"),
        Waypoint::new(37.7676, -122.4232, 25.0, "Mission St")
            .with_instruction("Approaching 14th St"),
        Waypoint::new(37.7681, -122.4231, 30.0, "Mission St"),
        Waypoint::new(37.7685, -122.4230, 30.0, "Mission St")
            .with_instruction("Pass Duboce Ave"),
        Waypoint::new(37.7690, -122.4229, 30.0, "Mission St"),
        Waypoint::new(37.7694, -122.4228, 25.0, "Mission St")
            .with_instruction("Approaching Market St"),
        Waypoint::new(37.7699, -122.4227, 20.0, "Mission St"),
        Waypoint::new(37.7703, -122.4226, 15.0, "Mission St")
            .with_instruction("Prepare to turn right"),
        Waypoint::new(37.7712, -122.4224, 15.0, "Market St")
            .with_instruction("Turn right onto Market St"),
        Waypoint::new(37.7716, -122.4221, 25.0, "Market St"),
        Waypoint::new(37.7721, -122.4218, 30.0, "Market St")
            .with_instruction("Continue on Market St"),
        Waypoint::new(37.7725, -122.4215, 30.0, "Market St"),
        Waypoint::new(37.7730, -122.4212, 25.0, "Market St")
            .with_instruction("Approaching 8th St"),
        Waypoint::new(37.7734, -122.4209, 30.0, "Market St"),
        Waypoint::new(37.7739, -122.4206, 30.0, "Market St")
            .with_instruction("Pass 7th St"),
        Waypoint::new(37.7743, -122.4203, 25.0, "Market St"),
        Waypoint::new(37.7748, -122.4200, 20.0, "Market St")
            .with_instruction("Approaching destination"),
        Waypoint::new(37.7752, -122.4197, 15.0, "Market St"),
        Waypoint::new(37.7757, -122.4194, 10.0, "Market St")
            .with_instruction("Arriving at Market & 5th"),
    ]
});

/// The fallback waypoints, Mission & 16th to Market & 5th.
pub fn waypoints() -> &'static [Waypoint] {
    &FALLBACK_WAYPOINTS
}
