//! Storage implementations.

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::config::StorageConfig;
use crate::error::Result;

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStore;

/// Initialize storage based on configuration.
///
/// Opens (creating if missing) the SQLite database, applies the schema, and
/// returns the shared entity store.
pub async fn init_storage(config: &StorageConfig) -> Result<Arc<SqliteStore>> {
    info!("Storage: sqlite at {}", config.path);

    if let Some(parent) = std::path::Path::new(&config.path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| sqlx::Error::Io(e))?;
        }
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", config.path))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    let store = Arc::new(SqliteStore::new(pool));
    store.init().await?;

    Ok(store)
}
