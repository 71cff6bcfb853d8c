//! Relay error taxonomy and its HTTP mapping.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response;

/// Everything that can stop a relay request from being forwarded.
///
/// Every variant is turned into a response inside the request task; none of
/// them escape to the server.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The `url` query parameter is missing or empty.
    #[error("Missing url query parameter")]
    MissingTarget,

    /// The target could not be parsed as an absolute URL.
    #[error("invalid target url: {0}")]
    InvalidTarget(#[from] url::ParseError),

    /// Upstream did not answer before the fetch deadline.
    #[error("upstream did not respond within {0:?}")]
    UpstreamTimeout(Duration),

    /// DNS, connect, TLS or protocol failure talking to upstream.
    #[error("upstream fetch failed: {0}")]
    Upstream(#[source] reqwest::Error),

    /// Failure after the upstream answered (reading the body, building the response).
    #[error("internal relay error: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingTarget => StatusCode::BAD_REQUEST,
            RelayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RelayError::InvalidTarget(_) | RelayError::Upstream(_) | RelayError::Internal(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Metrics label.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::MissingTarget => "client_error",
            RelayError::UpstreamTimeout(_) => "upstream_timeout",
            RelayError::InvalidTarget(_) | RelayError::Upstream(_) => "upstream_failure",
            RelayError::Internal(_) => "internal_error",
        }
    }

    fn body(&self) -> &'static str {
        match self {
            RelayError::MissingTarget => "Missing url query parameter",
            RelayError::UpstreamTimeout(_) => "Upstream timed out",
            RelayError::InvalidTarget(_) | RelayError::Upstream(_) => "Proxy fetch error",
            RelayError::Internal(_) => response::INTERNAL_ERROR_BODY,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let mut res = (self.status(), self.body()).into_response();
        // Only a rejected request goes out without CORS.
        if !matches!(self, RelayError::MissingTarget) {
            response::apply_cors(res.headers_mut());
        }
        res
    }
}
