//! Credential verification for the configured admin principal

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use tracing::info;

/// Admin principal configuration
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
    pub role: String,
}

impl AdminConfig {
    /// Create a new AdminConfig from environment variables
    ///
    /// # Environment Variables
    /// - `ADMIN_USERNAME`: Login name of the admin principal
    /// - `ADMIN_PASSWORD`: Password of the admin principal
    /// - `ADMIN_ROLE`: Role carried in issued tokens (default: "ADMIN")
    pub fn from_env() -> Result<Self> {
        let username = std::env::var("ADMIN_USERNAME")
            .map_err(|_| anyhow::anyhow!("ADMIN_USERNAME environment variable not set"))?;
        let password = std::env::var("ADMIN_PASSWORD")
            .map_err(|_| anyhow::anyhow!("ADMIN_PASSWORD environment variable not set"))?;
        let role = std::env::var("ADMIN_ROLE").unwrap_or_else(|_| "ADMIN".to_string());

        Ok(AdminConfig {
            username,
            password,
            role,
        })
    }
}

/// An authenticated principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub role: String,
}

/// Checks a username/password pair
pub trait CredentialVerifier: Send + Sync {
    /// Return the principal when the credentials are valid
    fn verify(&self, username: &str, password: &str) -> Option<Principal>;
}

/// Single in-memory admin principal, password kept only as an argon2 hash
pub struct AdminCredentials {
    username: String,
    role: String,
    password_hash: String,
}

impl AdminCredentials {
    /// Hash the configured password and build the verifier
    pub fn new(config: AdminConfig) -> Result<Self> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let password_hash = Argon2::default()
            .hash_password(config.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        info!("Admin principal '{}' registered", config.username);

        Ok(Self {
            username: config.username,
            role: config.role,
            password_hash,
        })
    }
}

impl CredentialVerifier for AdminCredentials {
    fn verify(&self, username: &str, password: &str) -> Option<Principal> {
        if username != self.username {
            return None;
        }

        let parsed_hash = PasswordHash::new(&self.password_hash).ok()?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .ok()?;

        Some(Principal {
            username: self.username.clone(),
            role: self.role.clone(),
        })
    }
}
