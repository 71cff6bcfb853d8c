//! Header filtering between the client and the upstream.
//!
//! # Responsibilities
//! - Build the upstream request headers from the inbound ones
//! - Drop `Host` so the upstream sees its own virtual host
//! - Strip hop-by-hop and body framing headers
//!
//! # Design Decisions
//! - Everything else is forwarded verbatim (Range, Cookie, Authorization...)
//! - `accept-encoding` is withheld: bodies are relayed without transcoding,
//!   so upstream must answer with identity encoding

use axum::http::{HeaderMap, HeaderName};

/// Inbound headers never sent upstream.
const WITHHELD: &[&str] = &[
    "host",
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "te",
    "trailer",
    "upgrade",
    "content-length",
    "accept-encoding",
];

fn is_forwardable(name: &HeaderName) -> bool {
    !WITHHELD.contains(&name.as_str())
}

/// Copy the forwardable subset of `inbound`, keeping repeated values.
pub fn upstream_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound.iter() {
        if is_forwardable(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}
