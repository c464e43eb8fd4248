//! Run the directions proxy on localhost.
//!
//! Requires `GOOGLE_MAPS_API_KEY` in the environment.
//! Run with: `cargo run --example proxy_server --features server`

use route_playback::{DirectionsProxy, ProxyConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let config = match ProxyConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    let proxy = DirectionsProxy::new(config).expect("HTTP client");
    println!("directions proxy listening on http://127.0.0.1:8080/route");
    proxy.serve(("127.0.0.1", 8080)).await
}
