//! Development relay for HLS playlists and media.
//!
//! Serves `GET|OPTIONS /m3u-proxy?url=<absolute-url>`: fetches the target
//! server-side, adds permissive CORS headers, rewrites playlist manifests so
//! segment and key fetches come back through the relay, and streams
//! everything else.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod resilience;
pub mod security;

pub use config::schema::RelayConfig;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
pub use relay::{Relay, RelayError};
