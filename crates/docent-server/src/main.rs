mod configuration;
mod error;
mod routes;
mod state;

use anyhow::Context;
use docent::providers::openrouter::OpenRouterProvider;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up OPENROUTER_API_KEY and friends from a local .env
    dotenv::dotenv().ok();

    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let settings = configuration::Settings::new().context("Failed to load settings")?;

    let provider = OpenRouterProvider::new(settings.provider.into_config())
        .context("Failed to create provider")?;
    info!(
        "Relaying to {} with model {}",
        provider.config().host,
        provider.config().model
    );

    // Create app state
    let state = state::AppState::new(
        Arc::new(provider),
        settings.chat.max_duration(),
        settings.translation.options(),
    );

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Run server
    let addr = settings
        .server
        .socket_addr()
        .context("Invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
