//! Chatrelay server library.
//!
//! Provides a reusable server function to serve the relay either for the
//! binary, or for the integration tests.

#![deny(missing_docs)]

mod health;

use std::net::SocketAddr;

use anyhow::anyhow;
use axum::{Router, routing::get};
use config::Config;
use tokio::net::TcpListener;

/// Configuration for serving the relay.
pub struct ServeConfig {
    /// The socket address (IP and port) the server will bind to
    pub listen_address: SocketAddr,
    /// The deserialized chatrelay TOML configuration.
    pub config: Config,
}

/// Starts and runs the chatrelay server with the provided configuration.
pub async fn serve(ServeConfig { listen_address, config }: ServeConfig) -> anyhow::Result<()> {
    let relay_path = config.relay.path.clone();

    let relay_router = relay::router(config.relay).map_err(|e| anyhow!("Failed to initialize relay endpoint: {e}"))?;

    let app = Router::new().merge(relay_router).route("/health", get(health::health));

    let listener = TcpListener::bind(listen_address)
        .await
        .map_err(|e| anyhow!("Failed to bind to {listen_address}: {e}"))?;

    log::info!("Relay endpoint available at: http://{listen_address}{relay_path}");

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow!("Failed to start HTTP server: {e}"))?;

    Ok(())
}
