use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;

use crate::entities::SearchArea;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("bearing {bearing:.3} does not cross the reachable area: {reason}")]
    NoIntersection { bearing: f64, reason: String },

    #[error("no reachable area for a {minutes} minute budget")]
    UnreachableArea {
        minutes: u32,
        #[source]
        source: Option<Box<Error>>,
    },

    #[error("no '{category}' candidate inside the reachable area (searched {area})")]
    NoCandidate { category: String, area: SearchArea },

    #[error("{provider} provider error: {kind}")]
    Provider {
        provider: &'static str,
        kind: ProviderFailure,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderFailure {
    Network,
    MalformedResponse,
    Rejected,
    Upstream,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network failure",
            Self::MalformedResponse => "malformed response",
            Self::Rejected => "request rejected",
            Self::Upstream => "upstream failure",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Codes below 100 are internal failures and are never echoed to clients.
    pub fn code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::Geometry(_) => 5,
            Self::NoIntersection { .. } => 6,
            Self::Provider { kind, .. } => match kind {
                ProviderFailure::Network => 3,
                ProviderFailure::MalformedResponse => 4,
                ProviderFailure::Upstream => 7,
                ProviderFailure::Rejected => 102,
            },
            Self::InvalidInput(_) => 101,
            Self::UnreachableArea { .. } => 110,
            Self::NoCandidate { .. } => 111,
        }
    }

    pub fn is_no_candidate(&self) -> bool {
        matches!(self, Self::NoCandidate { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let code = self.code();
        let message = self.to_string();
        let (status, error_message) = match &self {
            Self::Provider { .. } if code < 100 => {
                (StatusCode::BAD_GATEWAY, "Upstream Provider Error")
            }
            _ if code < 100 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            Self::UnreachableArea { .. } | Self::NoCandidate { .. } => {
                (StatusCode::NOT_FOUND, message.as_str())
            }
            Self::Provider { .. } => (StatusCode::BAD_GATEWAY, message.as_str()),
            _ => (StatusCode::BAD_REQUEST, message.as_str()),
        };

        let body = Json(json!({
            "code": code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn geometry_error(reason: impl Into<String>) -> Error {
    Error::Geometry(reason.into())
}

pub fn no_intersection_error(bearing: f64, reason: impl Into<String>) -> Error {
    Error::NoIntersection {
        bearing,
        reason: reason.into(),
    }
}

pub fn unreachable_area_error(minutes: u32, source: Option<Error>) -> Error {
    Error::UnreachableArea {
        minutes,
        source: source.map(Box::new),
    }
}

pub fn no_candidate_error(category: &str, area: SearchArea) -> Error {
    Error::NoCandidate {
        category: category.into(),
        area,
    }
}

pub fn provider_error(provider: &'static str, kind: ProviderFailure) -> Error {
    Error::Provider { provider, kind }
}

pub fn invalid_input_error(reason: impl Into<String>) -> Error {
    Error::InvalidInput(reason.into())
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    let kind = if err.is_decode() {
        ProviderFailure::MalformedResponse
    } else if err.is_status() {
        ProviderFailure::Upstream
    } else {
        ProviderFailure::Network
    };

    provider_error("mapbox", kind)
}

#[test]
fn provider_failures_keep_network_and_payload_apart() {
    let network = provider_error("mapbox", ProviderFailure::Network);
    let malformed = provider_error("mapbox", ProviderFailure::MalformedResponse);

    assert!(network.code() < 100);
    assert!(malformed.code() < 100);
    assert_ne!(network.code(), malformed.code());
    assert_eq!(
        malformed.to_string(),
        "mapbox provider error: malformed response"
    );
}

#[test]
fn every_provider_failure_has_its_own_code() {
    let codes: Vec<i32> = [
        ProviderFailure::Network,
        ProviderFailure::MalformedResponse,
        ProviderFailure::Rejected,
        ProviderFailure::Upstream,
    ]
    .into_iter()
    .map(|kind| provider_error("mapbox", kind).code())
    .collect();

    for (i, code) in codes.iter().enumerate() {
        assert!(!codes[i + 1..].contains(code), "code {} is shared", code);
    }
    assert_eq!(provider_error("mapbox", ProviderFailure::Upstream).code(), 7);
}

#[test]
fn unreachable_area_exposes_geometry_source() {
    use std::error::Error as _;

    let err = unreachable_area_error(30, Some(geometry_error("gap in boundary")));

    let source = err.source().map(|s| s.to_string());
    assert_eq!(source.as_deref(), Some("geometry error: gap in boundary"));
    assert!(!err.is_no_candidate());
}

#[test]
fn client_errors_map_to_client_statuses() {
    let response = invalid_input_error("duration must be positive").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = unreachable_area_error(15, None).into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = provider_error("mapbox", ProviderFailure::Network).into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let response = geometry_error("ring is degenerate").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
