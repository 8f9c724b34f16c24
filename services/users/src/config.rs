//! Server configuration

use std::net::SocketAddr;

use anyhow::Result;

/// Backend holding the user rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address
    pub addr: SocketAddr,
    /// Largest accepted request body in bytes (default: 10 MiB)
    pub max_upload_bytes: usize,
    /// Backend for user rows (default: postgres)
    pub store: StoreKind,
}

impl ServerConfig {
    /// Create a new ServerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SERVER_ADDR`: Listen address (default: "0.0.0.0:8080")
    /// - `MAX_UPLOAD_BYTES`: Request body limit for the user routes (default: 10485760)
    /// - `USER_STORE`: `postgres` or `memory` (default: "postgres")
    pub fn from_env() -> Result<Self> {
        let addr = std::env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid SERVER_ADDR: {}", e))?;

        let max_upload_bytes = std::env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10 * 1024 * 1024);

        let store = match std::env::var("USER_STORE").as_deref() {
            Err(_) | Ok("postgres") => StoreKind::Postgres,
            Ok("memory") => StoreKind::Memory,
            Ok(other) => anyhow::bail!("Unknown USER_STORE: {}", other),
        };

        Ok(ServerConfig {
            addr,
            max_upload_bytes,
            store,
        })
    }
}
