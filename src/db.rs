use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::migrator::Migrator;

/// Alias used throughout the crate for the shared connection handle.
pub type DbPool = DatabaseConnection;

/// Database pool settings.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
    pub sqlx_logging: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            max_connections: 16,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
            sqlx_logging: false,
        }
    }
}

impl DbConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            connect_timeout: Duration::from_secs(config.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(config.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(config.db_acquire_timeout_secs),
            sqlx_logging: config.is_development(),
        }
    }
}

/// Establishes a database connection pool.
pub async fn establish_connection(database_url: &str, config: DbConfig) -> Result<DbPool, DbErr> {
    let mut opts = ConnectOptions::new(database_url.to_owned());
    opts.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout)
        .acquire_timeout(config.acquire_timeout)
        .sqlx_logging(config.sqlx_logging);

    let pool = Database::connect(opts).await.map_err(|e| {
        error!("Failed to connect to database: {}", e);
        e
    })?;

    info!("Database connection established");
    Ok(pool)
}

/// Establishes a connection pool using the application configuration.
pub async fn establish_connection_from_app_config(config: &AppConfig) -> Result<DbPool, DbErr> {
    establish_connection(config.database_url(), DbConfig::from_app_config(config)).await
}

/// Applies all pending embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbErr> {
    info!("Running database migrations");
    Migrator::up(pool, None).await?;
    info!("Database migrations complete");
    Ok(())
}

/// Verifies that the database is reachable.
pub async fn check_connection(pool: &DbPool) -> Result<(), DbErr> {
    pool.ping().await
}
