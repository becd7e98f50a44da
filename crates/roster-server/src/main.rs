//! Roster Server — application entry point.
//!
//! Connects to SurrealDB, applies pending migrations and holds a ready
//! [`UserDirectoryService`] until interrupted.

use std::env;
use std::error::Error;

use roster_db::{DbConfig, DbManager, SurrealDirectoryStore};
use roster_directory::{DirectoryConfig, UserDirectoryService};
use roster_identity::{IdentityConfig, IdentityManager};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Defaults overlaid with `ROSTER_MAX_PAGE_SIZE`.
fn directory_config() -> DirectoryConfig {
    let mut config = DirectoryConfig::default();
    if let Ok(raw) = env::var("ROSTER_MAX_PAGE_SIZE") {
        match raw.parse() {
            Ok(size) => config.max_page_size = size,
            Err(_) => warn!(value = %raw, "Ignoring invalid ROSTER_MAX_PAGE_SIZE"),
        }
    }
    config
}

/// Defaults overlaid with `ROSTER_PASSWORD_PEPPER`.
fn identity_config() -> IdentityConfig {
    IdentityConfig {
        pepper: env::var("ROSTER_PASSWORD_PEPPER").ok(),
        ..IdentityConfig::default()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("roster=info".parse()?))
        .json()
        .init();

    info!("Starting Roster server...");

    let db_config = DbConfig::from_env();
    let db = DbManager::connect(&db_config).await?;
    roster_db::run_migrations(db.client()).await?;

    let directory = directory_config();
    info!(max_page_size = directory.max_page_size, "Directory configured");

    let _service = UserDirectoryService::new(
        SurrealDirectoryStore::new(db.client().clone()),
        IdentityManager::new(identity_config()),
        directory,
    );
    info!("User directory ready");

    tokio::signal::ctrl_c().await?;

    info!("Roster server stopped.");
    Ok(())
}
