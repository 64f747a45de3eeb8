//! Database primitives: environment-driven settings and the shared pool.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use thiserror::Error;

/// Shared Postgres pool alias.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
    #[error("invalid value for environment variable {0}")]
    InvalidEnv(&'static str),
    #[error(transparent)]
    Connect(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

/// Connection settings read from the process environment. Host, database,
/// user and password are required; port and pool size have defaults.
#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn from_env() -> DbResult<Self> {
        Ok(Self {
            host: env_required("POSTGRES_HOST")?,
            port: env_parsed("POSTGRES_PORT", 5432)?,
            name: env_required("POSTGRES_DB")?,
            user: env_required("POSTGRES_USER")?,
            password: env_required("POSTGRES_PASSWORD")?,
            max_connections: env_parsed("POSTGRES_MAX_CONNECTIONS", 5)?,
        })
    }

    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}

/// Open a bounded pool. Acquisition and release are scoped per statement by
/// the pool itself; callers share one `DbPool` for the process lifetime.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let mut options = ConnectOptions::new(settings.connection_url());
    options
        .max_connections(settings.max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    Database::connect(options).await.map_err(DbError::from)
}

fn env_required(key: &'static str) -> DbResult<String> {
    std::env::var(key).map_err(|_| DbError::MissingEnv(key))
}

fn env_parsed<T: std::str::FromStr>(key: &'static str, default: T) -> DbResult<T> {
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| DbError::InvalidEnv(key)),
        Err(_) => Ok(default),
    }
}
