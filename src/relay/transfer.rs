//! Delivery of non-playlist upstream bodies.
//!
//! Two strategies:
//! - `Streaming` pipes upstream chunks to the client as they arrive, so
//!   large media and ranged (206) responses are never held in memory.
//! - `Buffered` reads the whole body first and sends it in one piece.
//!
//! `Transfer::probe` picks one per response.

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue};
use futures_util::TryStreamExt;

use crate::relay::error::RelayError;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Streaming,
    Buffered,
}

impl Transfer {
    /// Choose how to deliver `upstream`.
    ///
    /// Streaming needs to be enabled and the body must not be known to be
    /// empty; anything else is buffered.
    pub fn probe(streaming_enabled: bool, upstream: &reqwest::Response) -> Self {
        if streaming_enabled && upstream.content_length() != Some(0) {
            Transfer::Streaming
        } else {
            Transfer::Buffered
        }
    }

    /// Turn the upstream body into the client body.
    ///
    /// The buffered path sets `content-type` on `headers` again, defaulting
    /// to `application/octet-stream`.
    pub async fn deliver(
        self,
        upstream: reqwest::Response,
        headers: &mut HeaderMap,
    ) -> Result<Body, RelayError> {
        match self {
            Transfer::Streaming => {
                let url = upstream.url().to_string();
                let stream = upstream.bytes_stream().inspect_err(move |e| {
                    tracing::warn!(upstream = %url, error = %e, "Upstream stream broke mid-transfer");
                });
                Ok(Body::from_stream(stream))
            }
            Transfer::Buffered => {
                let content_type = upstream
                    .headers()
                    .get(CONTENT_TYPE)
                    .cloned()
                    .unwrap_or_else(|| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));

                let bytes = upstream
                    .bytes()
                    .await
                    .map_err(|e| RelayError::Internal(format!("reading upstream body: {}", e)))?;

                headers.insert(CONTENT_TYPE, content_type);
                Ok(Body::from(bytes))
            }
        }
    }
}
