//! m3u-relay
//!
//! ```text
//!   player ── GET /m3u-proxy?url=… ──▶ relay ── GET … ──▶ upstream
//!   player ◀── CORS + rewritten / streamed body ── relay
//!   other paths ──▶ static dir or 404
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use m3u_relay::config::{self, validation::validate_config, ConfigError, RelayConfig};
use m3u_relay::observability::{logging, metrics};
use m3u_relay::{RelayServer, Shutdown};

#[derive(Parser)]
#[command(name = "m3u-relay", version)]
#[command(about = "Development relay for HLS playlists and media", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long, env = "M3U_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Host to bind, overriding the configured bind address.
    #[arg(long, env = "M3U_RELAY_HOST")]
    host: Option<String>,

    /// Port to bind, overriding the configured bind address.
    #[arg(short, long, env = "M3U_RELAY_PORT")]
    port: Option<u16>,
}

fn load(cli: &Cli) -> Result<RelayConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => RelayConfig::default(),
    };
    config
        .listener
        .override_host_port(cli.host.as_deref(), cli.port);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load(&cli)?;

    logging::init_logging(&config.observability);

    tracing::info!("m3u-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        relay_path = %config.relay.path,
        fetch_timeout_secs = config.relay.fetch_timeout_secs,
        streaming = config.relay.streaming,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let _signals = shutdown.trigger_on_signal();

    let server = RelayServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
