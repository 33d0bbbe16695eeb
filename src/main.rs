use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use whatsapp_agent::{config::Config, dispatch::Dispatcher, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("whatsapp_agent=info".parse()?),
        )
        .init();

    info!("Starting WhatsApp messaging agent");

    // Load configuration from environment and resolve the delivery mode once
    let config = Config::from_env();
    let mode = config.delivery_mode();
    info!("Delivery mode: {}", mode.name());
    if mode.is_demo() {
        info!("Twilio credentials not configured, messages will only be logged");
    }

    let dispatcher = Arc::new(Dispatcher::new(&config).context("Failed to build dispatcher")?);
    let app = server::router(dispatcher);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind to {}", addr))?;

    info!("✓ Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
