//! Fetch a route (falling back to the mock drive when no directions
//! endpoint is running) and print playback updates to stdout.
//!
//! Run with: `cargo run --example playback`

use route_playback::{
    PlaybackConfig, PlaybackState, ProviderConfig, RoutePlayback, RouteProvider,
};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let provider = RouteProvider::new(ProviderConfig::default()).expect("HTTP client");
    let route = provider.fetch_route(37.7647, -122.4192, 37.7757, -122.4194).await;
    println!(
        "route: {} points, {:.2} km, {:.1} min estimated",
        route.len(),
        route.total_distance_km(),
        route.total_minutes()
    );

    let mut playback = RoutePlayback::new(PlaybackConfig::default());
    let mut updates = playback.play(route).expect("non-empty route");

    while updates.changed().await.is_ok() {
        let update = updates.borrow().clone();
        println!(
            "({:.5}, {:.5}) {:>5.1} km/h  bearing {:>5.1}  {:.2} km left, eta {}  {}",
            update.vehicle.position.latitude,
            update.vehicle.position.longitude,
            update.vehicle.speed_kmh,
            update.vehicle.bearing_deg,
            update.metrics.remaining_distance_km,
            update.metrics.eta,
            update.metrics.current_instruction,
        );
        if update.state == PlaybackState::Completed {
            println!("arrived");
            break;
        }
    }
}
