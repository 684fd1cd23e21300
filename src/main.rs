//! Newsreel — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsreel::api::{self, AppState};
use newsreel::config::AppConfig;
use newsreel::metrics::Metrics;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("newsreel=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments. This enables
    // NEWSREEL_CONFIG_PATH and provider API keys from .env.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = AppConfig::load_default();
    let metrics = Metrics::init(config.limits.max_script_chars);
    let port = config.server.port;

    let state = AppState::from_config(config);
    let router = api::create_router(state).merge(metrics.router());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "newsreel listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
