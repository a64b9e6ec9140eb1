pub mod config;
pub mod provision;
pub mod search;
pub mod smoke;
pub mod status;

pub use provision::run_provision;
pub use search::run_search;
pub use smoke::run_smoke_test;
pub use status::show_status;

use anyhow::{Context, Result};
use autovec_store::{Config, MongoStore};

/// Connect to the configured database.
pub async fn connect(config: &Config) -> Result<MongoStore> {
    MongoStore::connect(&config.connection_uri, &config.database)
        .await
        .with_context(|| format!("Failed to connect to {}", config.connection_uri))
}
