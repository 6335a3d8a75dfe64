pub mod admin;
pub mod api;
pub mod authorization;
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod notifications;
pub mod workflow;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Process entry point: logging, configuration, database, HTTP server.
/// Runs until Ctrl-C, then drains in-flight requests.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let settings = config::ServerConfig::from_env();
    let core = core_state::CoreState::from_config(&settings);
    core.initialize()?;

    let mut server = api::start_server(Arc::new(core), settings.bind).await?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for Ctrl-C: {e}");
    }
    server.shutdown();
    server.stopped().await;
    Ok(())
}
