//! Unified error handling for the route-playback library.
//!
//! This module provides a consistent error type for all route-playback
//! operations. The route provider absorbs most of these into the mock
//! fallback route; only configuration problems are surfaced to callers.

use std::fmt;

/// Unified error type for route-playback operations.
#[derive(Debug, Clone)]
pub enum RouteError {
    /// Network or HTTP-level failure talking to the directions endpoint
    TransportFailure {
        message: String,
        status_code: Option<u16>,
    },
    /// The directions endpoint answered, but the body is unusable
    /// (wrong status sentinel, missing route/leg/polyline data)
    InvalidResponse { message: String },
    /// A route normalized to zero usable points
    EmptyRoute,
    /// Missing required credential or endpoint configuration
    ConfigError { message: String },
    /// Generic internal error
    Internal { message: String },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::TransportFailure {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "Transport failure ({}): {}", code, message)
                } else {
                    write!(f, "Transport failure: {}", message)
                }
            }
            RouteError::InvalidResponse { message } => {
                write!(f, "Invalid directions response: {}", message)
            }
            RouteError::EmptyRoute => {
                write!(f, "Route contains no usable points")
            }
            RouteError::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            RouteError::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for RouteError {}

/// Result type alias for route-playback operations.
pub type Result<T> = std::result::Result<T, RouteError>;

/// Extension trait for converting Option to RouteError.
pub trait OptionExt<T> {
    /// Convert Option to Result with an invalid-response error.
    fn ok_or_invalid(self, message: &str) -> Result<T>;

    /// Convert Option to Result with a generic internal error.
    fn ok_or_internal(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_invalid(self, message: &str) -> Result<T> {
        self.ok_or_else(|| RouteError::InvalidResponse {
            message: message.to_string(),
        })
    }

    fn ok_or_internal(self, message: &str) -> Result<T> {
        self.ok_or_else(|| RouteError::Internal {
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RouteError::TransportFailure {
            message: "connection refused".to_string(),
            status_code: Some(503),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("connection refused"));

        assert_eq!(
            RouteError::EmptyRoute.to_string(),
            "Route contains no usable points"
        );
    }

    #[test]
    fn test_option_ext() {
        let none: Option<i32> = None;
        let result = none.ok_or_invalid("response has no routes");
        assert!(matches!(result, Err(RouteError::InvalidResponse { .. })));
    }
}
