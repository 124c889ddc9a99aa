//! Notification demo server.
//!
//! Hosts the Push Relay Endpoint and an in-process simulated client
//! session that exercises the full install / subscription / delivery
//! handshake end-to-end.

mod app;
mod config;
mod demo;
mod server;

use tracing_subscriber::EnvFilter;

use webpush::{PushClient, VapidKeys, VapidSigner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Step 1: Tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    load_dotenv();

    // Step 2: Configuration — missing VAPID keys abort startup here.
    let config = config::AppConfig::from_env()?;
    let keys = VapidKeys::from_base64(&config.vapid_private_key, &config.vapid_public_key)
        .map_err(|e| anyhow::anyhow!("invalid VAPID configuration: {e}"))?;
    let push = PushClient::new(VapidSigner::new(keys, config.vapid_contact.clone()));

    // Step 3: Demo session + shared state
    let demo = demo::DemoSession::new(&config);
    let state = app::SharedState::new(config, push, demo);

    tracing::info!(
        port = state.server_port(),
        dry_run = state.config().dry_run_mode,
        "Starting notification demo server"
    );

    // Step 4: Web server
    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");
    state.shutdown_token().cancel();
    server_handle.await?;
    Ok(())
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}
