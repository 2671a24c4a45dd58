use std::path::PathBuf;

use config::{Config, ConfigError, Environment, Source};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Sqlite,
    Postgres,
    InMemory,
}

/// Process settings, read from environment variables on top of the defaults below
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub storage_backend: StorageBackend,
    /// Shortcut kept from earlier deployments, overrides `storage_backend` when true
    pub use_in_memory_db: bool,
    pub sqlite_path: PathBuf,
    pub db_host: String,
    pub db_username: String,
    pub db_password: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_source(Environment::default())
    }

    fn from_source<S>(source: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("storage_backend", "sqlite")?
            .set_default("use_in_memory_db", false)?
            .set_default("sqlite_path", "db.sqlite")?
            .set_default("db_host", "127.0.0.1")?
            .set_default("db_username", "postgres")?
            .set_default("db_password", "postgres")?
            .add_source(source)
            .build()?
            .try_deserialize()
    }

    pub fn backend(&self) -> StorageBackend {
        if self.use_in_memory_db {
            StorageBackend::InMemory
        } else {
            self.storage_backend
        }
    }
}
