use std::sync::Arc;

use anyhow::Result;
use auth::{AdminConfig, AdminCredentials, AuthState, JwtConfig, JwtService};
use common::{
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
    storage::{FileStore, StorageConfig},
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use users::{
    AppState, UserService,
    config::{ServerConfig, StoreKind},
    create_router,
    repositories::{InMemoryUserRepository, PgUserRepository, UserRepository},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting users service");

    let server_config = ServerConfig::from_env()?;

    let repository: Arc<dyn UserRepository> = match server_config.store {
        StoreKind::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            // Check database connectivity
            if health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            run_migrations(&pool).await?;
            Arc::new(PgUserRepository::new(pool))
        }
        StoreKind::Memory => {
            warn!("Using in-memory user store, data is lost on shutdown");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    let file_store = FileStore::init(StorageConfig::from_env().root).await?;

    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;
    let verifier = AdminCredentials::new(AdminConfig::from_env()?)?;

    let app_state = AppState {
        user_service: UserService::new(repository, file_store),
        auth: AuthState {
            jwt_service,
            verifier: Arc::new(verifier),
        },
        upload_limit: server_config.max_upload_bytes,
    };

    info!("Users service initialized successfully");

    // Start the web server
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_config.addr).await?;
    info!("Users service listening on {}", server_config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Users service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
