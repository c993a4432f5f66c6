use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::database::CURRENT_SCHEMA;
use crate::error::AppError;

#[instrument(skip(config), fields(database_url = %config.database_url))]
pub async fn connect(config: &AppConfig) -> Result<Pool<Sqlite>, AppError> {
    info!("Connecting to SQLite database");

    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Creates any missing tables. Existing tables are left untouched.
#[instrument(skip(pool))]
pub async fn initialize_schema(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    info!("Ensuring database schema");

    sqlx::raw_sql(CURRENT_SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create schema: {}", e)))?;

    Ok(())
}
