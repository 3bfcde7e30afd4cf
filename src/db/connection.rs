use std::time::Duration;

use anyhow::Context;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};

use crate::config::DatabaseConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the pool and brings the `users`, `pharmacies` and `medicines`
/// tables in line with the entity definitions.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(cfg.url.clone());
    options
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_idle)
        .connect_timeout(CONNECT_TIMEOUT)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .context("failed to connect to the directory store")?;
    tracing::info!(
        backend = ?db.get_database_backend(),
        max_connections = cfg.max_connections,
        "directory store connected"
    );

    db.get_schema_registry("medtrack_server::db::entities::*")
        .sync(&db)
        .await
        .context("failed to sync directory store schema")?;
    tracing::info!("directory store schema in sync");
    Ok(db)
}
