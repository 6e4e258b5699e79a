//! Server configuration for the clonebox service.
//!
//! This module defines HTTP server binding settings.

use serde::Deserialize;
use std::net::SocketAddr;

/// Server binding settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on (the `PORT` environment variable wins).
    pub port: u16,
}

impl ServerSettings {
    /// Converts host and port to a `SocketAddr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not an IP address.
    pub fn bind_address(&self) -> anyhow::Result<SocketAddr> {
        let ip = self
            .host
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid IP address '{}': {e}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}
