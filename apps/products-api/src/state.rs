//! Application state management

use database::postgres::{DatabaseConnection, connect_from_config_with_retry, run_migrations};
use domain_products::InMemoryProductRepository;
use eyre::eyre;
use migration::Migrator;
use tracing::{info, warn};

use crate::config::{Config, StorageBackend, StorageConfig};

/// The storage backend selected at startup
#[derive(Clone)]
pub enum Storage {
    /// Shared by every clone, so all routes see one catalog
    Memory(InMemoryProductRepository),
    Postgres(DatabaseConnection),
}

impl Storage {
    pub async fn connect(config: &StorageConfig, app_name: &str) -> eyre::Result<Self> {
        match config.backend {
            StorageBackend::Memory => {
                info!("Using in-memory product storage");
                Ok(Storage::Memory(InMemoryProductRepository::new()))
            }
            StorageBackend::Postgres => {
                let postgres = config
                    .postgres
                    .clone()
                    .ok_or_else(|| eyre!("postgres storage selected without a DATABASE_URL"))?;

                let db = connect_from_config_with_retry(postgres, None).await?;
                info!("Successfully connected to PostgreSQL");

                if config.run_migrations {
                    run_migrations::<Migrator>(&db, app_name).await?;
                }

                Ok(Storage::Postgres(db))
            }
        }
    }

    /// Release backend resources during shutdown.
    pub async fn close(self) {
        if let Storage::Postgres(db) = self {
            info!("Shutting down: closing PostgreSQL connections");
            match db.close().await {
                Ok(()) => info!("PostgreSQL connection pool closed"),
                Err(e) => warn!("Failed to close PostgreSQL pool: {}", e),
            }
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Storage,
}
