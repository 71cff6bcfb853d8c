//! Response header handling.
//!
//! # Responsibilities
//! - Permissive CORS headers for relay responses
//! - Copy the allow-listed upstream headers to the client
//! - Canned responses (preflight, not found, internal error)

use std::any::Any;

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Diagnostic header naming the upstream a response came from.
pub const X_PROXIED_FROM: HeaderName = HeaderName::from_static("x-proxied-from");

pub const INTERNAL_ERROR_BODY: &str = "Proxy error";

/// Insert the four CORS headers, replacing any upstream values.
pub fn apply_cors(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET,OPTIONS"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
}

/// Copy each header in `names` from `upstream` to `out` when present.
pub fn mirror_headers(upstream: &HeaderMap, names: &[HeaderName], out: &mut HeaderMap) {
    for name in names {
        if let Some(value) = upstream.get(name) {
            out.insert(name.clone(), value.clone());
        }
    }
}

/// CORS preflight answer: 204, CORS headers, no body.
pub fn preflight() -> Response {
    let mut res = StatusCode::NO_CONTENT.into_response();
    apply_cors(res.headers_mut());
    res
}

/// Answer for paths nothing else handled.
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// `CatchPanicLayer` hook: a panicking handler becomes a 502.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %detail, "Relay handler panicked");
    (StatusCode::BAD_GATEWAY, INTERNAL_ERROR_BODY).into_response()
}
