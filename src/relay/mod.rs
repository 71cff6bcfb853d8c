//! Playlist/media relay.
//!
//! # Data Flow
//! ```text
//! GET /m3u-proxy?url=<target>
//!     → OPTIONS? answer 204 preflight
//!     → extract target (400 when missing)
//!     → security::headers (inbound headers minus Host / hop-by-hop)
//!     → upstream.rs (one GET, bounded by the fetch timeout)
//!     → mirror allow-listed headers, add CORS + X-Proxied-From
//!     → playlist? playlist.rs rewrite : transfer.rs stream or buffer
//! ```
//!
//! Each request is independent; the only shared state is the immutable
//! settings and the upstream client.

pub mod error;
pub mod playlist;
pub mod transfer;
pub mod upstream;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use url::Url;

use crate::config::RelaySettings;
use crate::http::request::RequestIdExt;
use crate::http::response::{self, X_PROXIED_FROM};
use crate::observability::metrics;
use crate::security::headers::upstream_headers;

pub use error::RelayError;
pub use transfer::Transfer;

/// The relay handler and everything it needs per request.
pub struct Relay {
    path: String,
    fetch_timeout: Duration,
    streaming: bool,
    mirrored: Vec<HeaderName>,
    client: reqwest::Client,
}

impl Relay {
    /// Build the relay from validated settings.
    pub fn new(settings: &RelaySettings) -> Result<Self, reqwest::Error> {
        let mirrored = settings
            .mirrored_headers
            .iter()
            .filter_map(|name| HeaderName::from_bytes(name.as_bytes()).ok())
            .collect();

        Ok(Self {
            path: settings.path.clone(),
            fetch_timeout: settings.fetch_timeout(),
            streaming: settings.streaming,
            mirrored,
            client: upstream::build_client(settings)?,
        })
    }

    pub fn matches(&self, uri: &Uri) -> bool {
        uri.path().starts_with(&self.path)
    }

    /// Answer one relay request. Never fails: errors become responses.
    pub async fn handle(&self, request: Request) -> Response {
        let start = Instant::now();
        let request_id = request.request_id().to_string();

        if request.method() == Method::OPTIONS {
            tracing::debug!(request_id = %request_id, "Answering CORS preflight");
            metrics::record_relay("preflight", 204, start);
            return response::preflight();
        }

        // Only owned parts cross the await: the inbound body is not Sync.
        let target = target_param(request.uri());
        let outbound = upstream_headers(request.headers());
        let uri = request.uri().clone();
        drop(request);

        match self.relay(target, outbound, &request_id).await {
            Ok(res) => {
                metrics::record_relay("relayed", res.status().as_u16(), start);
                res
            }
            Err(err) => {
                match &err {
                    RelayError::MissingTarget => {
                        tracing::warn!(request_id = %request_id, uri = %uri, "Relay request without url parameter");
                    }
                    other => {
                        tracing::error!(request_id = %request_id, error = %other, "Upstream fetch failed or timed out");
                    }
                }
                metrics::record_relay(err.outcome(), err.status().as_u16(), start);
                err.into_response()
            }
        }
    }

    async fn relay(
        &self,
        target: Option<String>,
        outbound: HeaderMap,
        request_id: &str,
    ) -> Result<Response, RelayError> {
        let target = target.ok_or(RelayError::MissingTarget)?;
        tracing::info!(request_id = %request_id, upstream = %target, "Fetching upstream");

        let target_url = Url::parse(&target)?;
        let upstream = upstream::fetch(&self.client, target_url.clone(), outbound, self.fetch_timeout).await?;

        let mut status = upstream.status();
        let content_type = upstream
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_ascii_lowercase();

        let mut headers = HeaderMap::new();
        response::mirror_headers(upstream.headers(), &self.mirrored, &mut headers);
        response::apply_cors(&mut headers);
        match HeaderValue::from_str(&target) {
            Ok(value) => {
                headers.insert(X_PROXIED_FROM, value);
            }
            Err(_) => {
                tracing::debug!(request_id = %request_id, "Target not representable as a header value");
            }
        }

        tracing::debug!(
            request_id = %request_id,
            status = %status,
            content_type = %content_type,
            "Upstream responded"
        );

        let body = if playlist::is_playlist(&content_type, &target) {
            let text = upstream
                .text()
                .await
                .map_err(|e| RelayError::Internal(format!("reading playlist: {}", e)))?;
            let rewritten = playlist::rewrite(&text, &target_url, &self.path);

            // Mirrored framing headers describe the upstream bytes, not the rewrite.
            // The rewrite is always the whole playlist, so a 206 becomes a 200.
            headers.remove(CONTENT_LENGTH);
            headers.remove(CONTENT_RANGE);
            headers.remove(ACCEPT_RANGES);
            if status == StatusCode::PARTIAL_CONTENT {
                status = StatusCode::OK;
            }
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static(playlist::PLAYLIST_CONTENT_TYPE),
            );
            Body::from(rewritten)
        } else {
            let transfer = Transfer::probe(self.streaming, &upstream);
            if transfer == Transfer::Buffered {
                tracing::debug!(request_id = %request_id, "Buffering upstream body");
            }
            transfer.deliver(upstream, &mut headers).await?
        };

        let mut res = Response::new(body);
        *res.status_mut() = status;
        *res.headers_mut() = headers;
        Ok(res)
    }
}

/// First `url` query parameter, percent-decoded; `None` when absent or empty.
pub fn target_param(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Intercept requests under the relay path; everything else goes to `next`.
pub async fn relay_middleware(
    State(relay): State<Arc<Relay>>,
    request: Request,
    next: Next,
) -> Response {
    if !relay.matches(request.uri()) {
        return next.run(request).await;
    }
    relay.handle(request).await
}
