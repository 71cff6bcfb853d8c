//! Outbound client and the single bounded fetch per relay request.

use std::time::Duration;

use axum::http::HeaderMap;
use url::Url;

use crate::config::RelaySettings;
use crate::relay::error::RelayError;
use crate::resilience::{with_timeout, Bounded};

/// Build the shared upstream client.
///
/// Environment proxies are ignored: the relay itself is the proxy.
pub fn build_client(settings: &RelaySettings) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(settings.user_agent.as_str())
        .no_proxy()
        .build()
}

/// Issue one `GET` to `target`, bounded by `limit` until response headers arrive.
///
/// On timeout the request future is dropped, which aborts the request and
/// closes its connection.
pub async fn fetch(
    client: &reqwest::Client,
    target: Url,
    headers: HeaderMap,
    limit: Duration,
) -> Result<reqwest::Response, RelayError> {
    let request = client.get(target).headers(headers).send();

    match with_timeout(limit, request).await {
        Ok(response) => Ok(response),
        Err(Bounded::TimedOut(after)) => Err(RelayError::UpstreamTimeout(after)),
        Err(Bounded::Failed(e)) => Err(RelayError::Upstream(e)),
    }
}
