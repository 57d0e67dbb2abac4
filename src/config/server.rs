use std::net::SocketAddr;

use anyhow::{Context, Result};

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    /// Allow any origin; observers are typically browser pages on another port
    pub cors_enabled: bool,
    /// Events buffered per SSE observer before it lags
    pub event_capacity: usize,
}

impl ServerConfig {
    /// Parse a `host:port` listen address
    ///
    /// # Errors
    ///
    /// Returns an error if `addr` is not a socket address.
    pub fn with_listen_addr(addr: &str) -> Result<Self> {
        let listen_addr = addr
            .parse()
            .with_context(|| format!("Invalid listen address '{addr}'"))?;
        Ok(Self {
            listen_addr,
            ..Self::default()
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3002)),
            cors_enabled: true,
            event_capacity: crate::status_events::bus::DEFAULT_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::DEFAULT_LISTEN_ADDR;

    #[test]
    fn default_matches_listen_constant() {
        let parsed = ServerConfig::with_listen_addr(DEFAULT_LISTEN_ADDR).expect("valid default");
        assert_eq!(parsed.listen_addr, ServerConfig::default().listen_addr);
    }

    #[test]
    fn rejects_garbage_address() {
        assert!(ServerConfig::with_listen_addr("localhost").is_err());
    }
}
