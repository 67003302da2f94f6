//! Chatrelay configuration structures to map the chatrelay.toml configuration.

#![deny(missing_docs)]

mod loader;
mod relay;

use std::{net::SocketAddr, path::Path};

pub use relay::RelayConfig;
use serde::Deserialize;

/// Main configuration structure for the chatrelay application.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Relay endpoint configuration settings.
    #[serde(default)]
    pub relay: RelayConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }

    /// Validates that the configuration carries an upstream credential.
    pub fn validate(&self) -> anyhow::Result<()> {
        loader::validate_has_credential(self)
    }
}

/// HTTP server configuration settings.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// The socket address the server should listen on.
    pub listen_address: Option<SocketAddr>,
}
