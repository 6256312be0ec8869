pub mod migrate;
pub mod seed;
pub mod user;

use anyhow::Context;

use crate::config::{config, AppConfig};
use crate::database::DatabaseManager;

/// Validated process config plus an open pool
pub(crate) async fn connect() -> anyhow::Result<(&'static AppConfig, DatabaseManager)> {
    let config = config();
    config.validate().context("invalid configuration")?;

    let manager = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    Ok((config, manager))
}
