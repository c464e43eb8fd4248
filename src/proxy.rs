//! Directions proxy endpoint.
//!
//! A single `POST /route` that validates the client's start/end
//! coordinates and forwards them to the upstream directions API, keeping
//! the API key server-side. The upstream JSON body passes through
//! verbatim on success; failures map to the small error envelope the
//! mobile client expects.
//!
//! Unlike the route provider, there is no safe fallback at this
//! boundary: a missing API key is a configuration error surfaced
//! immediately, not degraded silently.

use std::time::Duration;

use actix_web::{web, App, HttpResponse, HttpServer};
use log::{error, warn};
use serde::Deserialize;
use serde_json::json;

use crate::error::{Result, RouteError};

/// Configuration for the directions proxy.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Upstream directions API endpoint.
    pub upstream: String,
    /// API key appended to every upstream request.
    pub api_key: String,
    /// Upstream request timeout. Default: 30 s
    pub timeout: Duration,
}

impl ProxyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            upstream: "https://maps.googleapis.com/maps/api/directions/json".to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Read the API key from `GOOGLE_MAPS_API_KEY`. A missing or empty
    /// key is a [`RouteError::ConfigError`].
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_MAPS_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| RouteError::ConfigError {
                message: "GOOGLE_MAPS_API_KEY is not configured".to_string(),
            })?;
        Ok(Self::new(api_key))
    }
}

/// The proxy service: configuration plus a pooled upstream client.
pub struct DirectionsProxy {
    config: ProxyConfig,
    client: reqwest::Client,
}

impl DirectionsProxy {
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RouteError::ConfigError {
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self { config, client })
    }

    /// Bind and run the proxy server. Blocks until shutdown.
    pub async fn serve(self, addr: (&str, u16)) -> std::io::Result<()> {
        let proxy = web::Data::new(self);
        HttpServer::new(move || App::new().configure(configure(proxy.clone())))
            .bind(addr)?
            .run()
            .await
    }

    async fn forward(&self, start: (f64, f64), end: (f64, f64)) -> Result<serde_json::Value> {
        if self.config.api_key.is_empty() {
            return Err(RouteError::ConfigError {
                message: "directions API key is not configured".to_string(),
            });
        }

        // Six decimal places, matching what the upstream API expects
        let origin = format!("{:.6},{:.6}", start.0, start.1);
        let destination = format!("{:.6},{:.6}", end.0, end.1);
        let url = format!(
            "{}?origin={}&destination={}&mode=driving&key={}",
            self.config.upstream, origin, destination, self.config.api_key
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RouteError::TransportFailure {
                message: e.to_string(),
                status_code: e.status().map(|s| s.as_u16()),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RouteError::TransportFailure {
                message: format!("directions API returned {}", status),
                status_code: Some(status.as_u16()),
            });
        }

        let data: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| RouteError::InvalidResponse {
                    message: format!("failed to decode directions body: {}", e),
                })?;

        if let Some(message) = data.get("error_message").and_then(|v| v.as_str()) {
            warn!("directions API error message: {}", message);
        }
        let api_status = data.get("status").and_then(|v| v.as_str()).unwrap_or("");
        if api_status != "OK" {
            return Err(RouteError::InvalidResponse {
                message: format!("directions API status {}", api_status),
            });
        }

        Ok(data)
    }
}

/// Register the proxy routes on an actix app.
pub fn configure(proxy: web::Data<DirectionsProxy>) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(proxy.clone())
            .service(web::resource("/route").route(web::post().to(route_handler)));
    }
}

/// Incoming body with every field optional, so validation can answer
/// 400 instead of a deserialization error.
#[derive(Debug, Deserialize)]
struct ProxyRequest {
    start: Option<ProxyLatLng>,
    end: Option<ProxyLatLng>,
}

#[derive(Debug, Deserialize)]
struct ProxyLatLng {
    lat: Option<f64>,
    lng: Option<f64>,
}

fn validate(body: &ProxyRequest) -> Option<((f64, f64), (f64, f64))> {
    let coords = |point: &Option<ProxyLatLng>| -> Option<(f64, f64)> {
        let point = point.as_ref()?;
        let lat = point.lat.filter(|v| v.is_finite())?;
        let lng = point.lng.filter(|v| v.is_finite())?;
        Some((lat, lng))
    };
    Some((coords(&body.start)?, coords(&body.end)?))
}

async fn route_handler(
    proxy: web::Data<DirectionsProxy>,
    body: web::Json<ProxyRequest>,
) -> HttpResponse {
    let Some((start, end)) = validate(&body) else {
        return HttpResponse::BadRequest().json(json!({
            "error": "Invalid start/end coordinates"
        }));
    };

    match proxy.forward(start, end).await {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(err) => {
            error!("directions proxy failure: {}", err);
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to fetch route",
                "details": err.to_string(),
            }))
        }
    }
}
