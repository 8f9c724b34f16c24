//! Common library for the user records service
//!
//! This crate provides shared functionality used across the services of
//! the workspace: database connectivity, error types and the photo asset
//! store.

pub mod database;
pub mod error;
pub mod storage;

/// Example usage of the database and storage modules
///
/// ```rust,no_run
/// use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
/// use common::storage::{FileStore, StorageConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig::from_env()?;
///     let pool = init_pool(&config).await?;
///     run_migrations(&pool).await?;
///     println!("Database health check: {}", health_check(&pool).await?);
///
///     let store = FileStore::init(StorageConfig::from_env().root).await?;
///     let path = store.save(b"bytes", Some("avatar.png")).await?;
///     store.delete(Some(&path)).await?;
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
