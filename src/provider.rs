//! Route provider: fetch, normalize, fall back.
//!
//! [`RouteProvider`] owns a pooled HTTP client and orchestrates one
//! route load: POST the start/end coordinates to the directions
//! endpoint, validate and normalize the response, and degrade to the
//! deterministic fallback route on *any* failure. `fetch_route` never
//! returns an error — a failed fetch is a warning in the log and a mock
//! drive on the map, not a broken dashboard.
//!
//! There is deliberately no hidden global here: callers construct the
//! provider and own it.

use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;

use crate::directions::{DirectionsResponse, LatLng, RouteRequest};
use crate::error::{Result, RouteError};
use crate::fallback;
use crate::normalizer::{densify_and_measure, normalize_response, NormalizerConfig};
use crate::Route;

/// Success sentinel in the directions response `status` field.
const STATUS_OK: &str = "OK";

/// Configuration for the route provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// The directions proxy endpoint to POST to.
    pub endpoint: String,
    /// Request timeout. Default: 30 s
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/route".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Directions-backed route source with mock fallback.
pub struct RouteProvider {
    client: Client,
    config: ProviderConfig,
    normalizer: NormalizerConfig,
}

impl RouteProvider {
    /// Create a new provider with a pooled HTTP client.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RouteError::ConfigError {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            config,
            normalizer: NormalizerConfig::default(),
        })
    }

    /// Replace the normalizer configuration.
    pub fn with_normalizer(mut self, normalizer: NormalizerConfig) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Fetch a route between two coordinates. Never fails: any transport,
    /// response or processing problem is logged and answered with the
    /// densified fallback route.
    pub async fn fetch_route(
        &self,
        start_lat: f64,
        start_lng: f64,
        end_lat: f64,
        end_lng: f64,
    ) -> Route {
        match self
            .try_fetch_route(start_lat, start_lng, end_lat, end_lng)
            .await
        {
            Ok(route) => {
                debug!(
                    "fetched route: {} points, {:.2} km",
                    route.len(),
                    route.total_distance_km()
                );
                route
            }
            Err(err) => {
                warn!("route fetch failed, using fallback route: {}", err);
                densify_and_measure(fallback::waypoints(), &self.normalizer)
            }
        }
    }

    /// The fallible fetch path, for callers that want the error instead
    /// of the fallback.
    pub async fn try_fetch_route(
        &self,
        start_lat: f64,
        start_lng: f64,
        end_lat: f64,
        end_lng: f64,
    ) -> Result<Route> {
        let request = RouteRequest {
            start: LatLng { lat: start_lat, lng: start_lng },
            end: LatLng { lat: end_lat, lng: end_lng },
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| RouteError::TransportFailure {
                message: e.to_string(),
                status_code: e.status().map(|s| s.as_u16()),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RouteError::TransportFailure {
                message: format!("directions endpoint returned {}", status),
                status_code: Some(status.as_u16()),
            });
        }

        let body: DirectionsResponse =
            response
                .json()
                .await
                .map_err(|e| RouteError::InvalidResponse {
                    message: format!("failed to decode directions body: {}", e),
                })?;

        if body.status != STATUS_OK {
            return Err(RouteError::InvalidResponse {
                message: body
                    .error_message
                    .unwrap_or_else(|| format!("directions status {}", body.status)),
            });
        }
        if body.routes.first().and_then(|r| r.legs.first()).is_none() {
            return Err(RouteError::InvalidResponse {
                message: "response carries no route leg".to_string(),
            });
        }

        let route = normalize_response(&body, &self.normalizer)?;
        if route.is_empty() {
            return Err(RouteError::EmptyRoute);
        }
        Ok(route)
    }
}
