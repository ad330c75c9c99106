//! Configuration for Products API

use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_parse, server::ServerConfig};
use database::postgres::PostgresConfig;
use strum::{Display, EnumString};

pub use core_config::Environment;

/// Where products are stored, chosen once at startup from `STORAGE_BACKEND`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Apply pending migrations after connecting (`DB_RUN_MIGRATIONS`)
    pub run_migrations: bool,
    /// Present only for the postgres backend
    pub postgres: Option<PostgresConfig>,
}

impl FromEnv for StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let backend: StorageBackend = env_parse("STORAGE_BACKEND", "memory")?;

        // DATABASE_URL is only required when it is going to be used.
        let postgres = match backend {
            StorageBackend::Memory => None,
            StorageBackend::Postgres => Some(PostgresConfig::from_env()?),
        };

        Ok(Self {
            backend,
            run_migrations: env_parse("DB_RUN_MIGRATIONS", "true")?,
            postgres,
        })
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Comma-separated origins; unset means no cross-origin access
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let cors_allowed_origin = std::env::var("CORS_ALLOWED_ORIGIN")
            .ok()
            .filter(|origins| !origins.trim().is_empty());

        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            cors_allowed_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_memory_storage() {
        temp_env::with_vars(
            [
                ("STORAGE_BACKEND", None::<&str>),
                ("DATABASE_URL", None),
                ("DB_RUN_MIGRATIONS", None),
                ("CORS_ALLOWED_ORIGIN", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.storage.backend, StorageBackend::Memory);
                assert!(config.storage.postgres.is_none());
                assert!(config.storage.run_migrations);
                assert_eq!(config.cors_allowed_origin, None);
                assert_eq!(config.app.name, "products_api");
            },
        );
    }

    #[test]
    fn test_postgres_backend_requires_database_url() {
        temp_env::with_vars(
            [("STORAGE_BACKEND", Some("Postgres")), ("DATABASE_URL", None)],
            || {
                let err = StorageConfig::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "DATABASE_URL"));
            },
        );
    }

    #[test]
    fn test_postgres_backend_from_env() {
        temp_env::with_vars(
            [
                ("STORAGE_BACKEND", Some("postgres")),
                ("DATABASE_URL", Some("postgres://localhost/products")),
                ("DB_RUN_MIGRATIONS", Some("false")),
            ],
            || {
                let storage = StorageConfig::from_env().unwrap();
                assert_eq!(storage.backend, StorageBackend::Postgres);
                assert!(!storage.run_migrations);
                assert_eq!(
                    storage.postgres.unwrap().url(),
                    "postgres://localhost/products"
                );
            },
        );
    }

    #[test]
    fn test_unknown_backend_is_a_parse_error() {
        temp_env::with_var("STORAGE_BACKEND", Some("sqlite"), || {
            let err = StorageConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { ref key, .. } if key == "STORAGE_BACKEND"));
        });
    }

    #[test]
    fn test_blank_cors_origin_is_unset() {
        temp_env::with_vars(
            [("STORAGE_BACKEND", None), ("CORS_ALLOWED_ORIGIN", Some("  "))],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.cors_allowed_origin, None);
            },
        );
    }
}
