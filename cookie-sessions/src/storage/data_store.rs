use std::str::FromStr;

use sqlx::{Pool, Postgres, Sqlite};

use crate::storage::errors::StorageError;

/// Handle on the relational store backing users and sessions.
///
/// Constructed explicitly and passed into the stores that need it; pools are
/// cheap to clone.
#[derive(Clone, Debug)]
pub enum DataStore {
    Sqlite(Pool<Sqlite>),
    Postgres(Pool<Postgres>),
}

impl DataStore {
    /// Connect lazily to the given backend. `kind` is `"sqlite"` or
    /// `"postgres"`; `url` is the corresponding connection string.
    pub fn connect(kind: &str, url: &str) -> Result<Self, StorageError> {
        tracing::info!("Initializing data store with type: {kind}, url: {url}");

        match kind {
            "sqlite" => {
                let opts = sqlx::sqlite::SqliteConnectOptions::from_str(url)
                    .map_err(|e| StorageError::Config(e.to_string()))?
                    .create_if_missing(true);

                Ok(Self::Sqlite(sqlx::sqlite::SqlitePool::connect_lazy_with(
                    opts,
                )))
            }
            "postgres" => {
                let pool = sqlx::PgPool::connect_lazy(url)
                    .map_err(|e| StorageError::Config(e.to_string()))?;

                Ok(Self::Postgres(pool))
            }
            t => Err(StorageError::Config(format!(
                "Unsupported store type: {t}. Supported types are 'sqlite' and 'postgres'"
            ))),
        }
    }

    /// Connect from `DATA_STORE_TYPE` / `DATA_STORE_URL` environment
    /// variables.
    pub fn from_env() -> Result<Self, StorageError> {
        dotenvy::dotenv().ok();

        let kind = std::env::var("DATA_STORE_TYPE")
            .map_err(|_| StorageError::Config("DATA_STORE_TYPE must be set".to_string()))?;
        let url = std::env::var("DATA_STORE_URL")
            .map_err(|_| StorageError::Config("DATA_STORE_URL must be set".to_string()))?;

        Self::connect(&kind, &url)
    }

    pub fn as_sqlite(&self) -> Option<&Pool<Sqlite>> {
        match self {
            Self::Sqlite(pool) => Some(pool),
            Self::Postgres(_) => None,
        }
    }

    pub fn as_postgres(&self) -> Option<&Pool<Postgres>> {
        match self {
            Self::Sqlite(_) => None,
            Self::Postgres(pool) => Some(pool),
        }
    }
}
