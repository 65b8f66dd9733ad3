//! Gem Cache - pull-through caching proxy for gem servers

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::Config;
use gem_api::{AppState, create_router};
use gem_core::{GemCache, GemService, SourceSelector, Upstream};
use gem_proxy::UpstreamClient;
use gem_storage::LocalStorage;

/// Gem Cache - pull-through caching proxy for gem servers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "GEM_CACHE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "GEM_CACHE_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    init_logging(&config.logging.level, &config.logging.format);

    info!("Starting Gem Cache v{}", env!("CARGO_PKG_VERSION"));

    // Metrics recorder must be installed before any counter is touched
    let metrics_handle = if config.metrics.enabled {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(Arc::new(handle)),
            Err(e) => {
                warn!("Failed to install metrics recorder: {}", e);
                None
            }
        }
    } else {
        None
    };

    // Collaborators are built once and shared by every request
    let storage = Arc::new(LocalStorage::new(&config.storage.path).await?);
    let client = Arc::new(UpstreamClient::new(config.upstream.client_config())?);
    let cache = Arc::new(GemCache::new(storage, client));

    let selector = SourceSelector::new(Upstream::new(config.upstream.default_url.clone()));
    let gems = Arc::new(GemService::new(selector, cache));

    let state = AppState::new(gems);

    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);
    info!("Default upstream: {}", config.upstream.default_url);
    info!("Gem storage: {}", config.storage.path);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
