use std::sync::Arc;

mod app;
mod application;
mod domain;
mod infrastructure;
mod presentation;

#[cfg(test)]
mod test_support;

use app::AppState;
use infrastructure::config::AppConfig;
use infrastructure::logging::logger;
use presentation::routes::build_router;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    if let Err(error) = logger::init_logger(&config.log_dir) {
        eprintln!("Failed to initialize logger: {}", error);
    }

    tracing::info!("Starting theme-admin");

    let listen_addr = config.server.listen_addr.clone();
    let state = Arc::new(AppState::new(config).await?);
    tracing::info!("Themes directory: {:?}", state.data_directory.themes());

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("theme-admin stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", error);
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received");
}
