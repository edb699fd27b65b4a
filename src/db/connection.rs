//! Database connection management using sqlx

use crate::cli::ConnectionSettings;
use crate::error::{GeoRefError, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub type DbPool = PgPool;

/// Open a single-connection pool and check it with `SELECT 1`.
///
/// `target` names the database in error messages ("fact", "master").
pub async fn open_pool(settings: &ConnectionSettings, target: &str) -> Result<PgPool> {
    let connection_error = |e: sqlx::Error| GeoRefError::Connection {
        target: target.to_string(),
        message: e.to_string(),
    };

    let options = match settings {
        ConnectionSettings::Uri(uri) => PgConnectOptions::from_str(uri).map_err(connection_error)?,
        ConnectionSettings::Discrete {
            host,
            port,
            database,
            user,
            password,
        } => PgConnectOptions::new()
            .host(host)
            .port(*port)
            .database(database)
            .username(user)
            .password(password),
    };

    info!("Connecting to {} database at {}", target, settings.describe());

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await
        .map_err(connection_error)?;

    // Test the connection
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(connection_error)?;

    Ok(pool)
}

/// Close the pool, waiting for its connection to be released.
pub async fn close_pool(pool: &PgPool, target: &str) {
    pool.close().await;
    info!("Closed {} database connection", target);
}
