//! Wire types for the driving-directions API boundary.
//!
//! The request body is the `{start: {lat, lng}, end: {lat, lng}}` shape
//! the proxy endpoint accepts; the response mirrors the relevant subset
//! of a generic directions provider (status sentinel, routes with an
//! overview polyline, legs with narrated steps). Everything the pipeline
//! does not read is left undeserialized.

use serde::{Deserialize, Serialize};

/// A raw `{lat, lng}` coordinate pair as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Request body for the directions proxy endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: LatLng,
    pub end: LatLng,
}

/// Top-level directions response. `status` is `"OK"` on success; any
/// other value is treated as a failed fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionsResponse {
    pub status: String,
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// A single route alternative.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectionsRoute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview_polyline: Option<EncodedPolyline>,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

/// One leg of a route (origin to destination with no via points).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteLeg {
    #[serde(default)]
    pub steps: Vec<RouteStep>,
}

/// A narrated step: its own sub-path, distance/duration and the HTML
/// instruction text shown to the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStep {
    pub polyline: EncodedPolyline,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<StepMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<StepMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_instructions: Option<String>,
}

/// An encoded polyline (Google polyline algorithm, precision 5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncodedPolyline {
    pub points: String,
}

/// A `{value}` metric; metres for distance, seconds for duration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StepMetric {
    pub value: f64,
}

// ============================================================================
// Narration helpers
// ============================================================================

/// Strip HTML markup from an instruction string, keeping only the text.
pub fn strip_markup(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}

/// Extract a street name from markup-stripped instruction text.
///
/// Directions narration reads like "Turn left on Mission St"; the text
/// after the first " on " is the street. Falls back to `"Road"` when the
/// narration carries no street.
pub fn street_name(instruction: &str) -> String {
    instruction
        .split(" on ")
        .nth(1)
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Road".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup("Turn <b>left</b> on <div style=\"x\">Mission St</div>"),
            "Turn left on Mission St"
        );
        assert_eq!(strip_markup("no markup"), "no markup");
    }

    #[test]
    fn test_street_name() {
        assert_eq!(street_name("Turn left on Mission St"), "Mission St");
        assert_eq!(street_name("Make a U-turn"), "Road");
        // Only the text between the first and second " on " is the street
        assert_eq!(street_name("Continue on Market St on the right"), "Market St");
    }

    #[test]
    fn test_response_deserializes_with_missing_fields() {
        let json = r#"{"status": "ZERO_RESULTS"}"#;
        let response: DirectionsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "ZERO_RESULTS");
        assert!(response.routes.is_empty());
        assert!(response.error_message.is_none());
    }

    #[test]
    fn test_route_request_wire_shape() {
        let request = RouteRequest {
            start: LatLng { lat: 37.7647, lng: -122.4192 },
            end: LatLng { lat: 37.7757, lng: -122.4194 },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["start"]["lat"], 37.7647);
        assert_eq!(json["end"]["lng"], -122.4194);
    }
}
