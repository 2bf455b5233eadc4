//! Database connection management.

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::secrets::DatabaseCredentials;
use crate::{Error, Result};

/// Connection options, letting host/port/dbname in the secret override the config.
pub fn connect_options(config: &DatabaseConfig, creds: &DatabaseCredentials) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(creds.host.as_deref().unwrap_or(&config.host))
        .port(creds.port.unwrap_or(5432))
        .database(creds.dbname.as_deref().unwrap_or(&config.name))
        .username(&creds.username)
        .password(&creds.password)
}

/// Create a database connection pool.
///
/// One invocation handles one request, so the pool stays small.
pub async fn create_pool(config: &DatabaseConfig, creds: &DatabaseCredentials) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(connect_options(config, creds))
        .await
        .map_err(Error::Database)
}
