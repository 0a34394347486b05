//! Canteen Backend
//!
//! Meal enlistment and menu service for a student cafeteria.

use canteen::{api, auth, core, db};

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (handles CLI args, env vars, and config file)
    let config = match core::config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print error to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let _logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!("Starting Canteen Backend v{}", canteen::VERSION);
    info!(
        host = %config.server.host,
        port = config.server.port,
        api_base = %config.server.api_base,
        "Server configuration"
    );
    info!(path = ?config.database.path, "Database configuration");

    info!("Initializing database...");
    let pool_size = u32::try_from(config.database.connection_pool_size)
        .context("connection_pool_size does not fit in u32")?;
    let db = Arc::new(db::DatabaseManager::new(
        &config.database.path,
        pool_size,
        Duration::from_millis(config.database.busy_timeout),
    )?);
    info!("Database initialized successfully");

    let keys = auth::AuthKeys::new(
        config.security.student_token_secret.clone(),
        config.security.admin_token_secret.clone(),
    );
    let state = api::AppState::new(db, keys, config.security.password_cost);

    auth::ensure_bootstrap_admin(&state.admin_repo, &config.bootstrap, state.password_cost).await?;
    state.login_decoy.digest().await?;

    let server_url = format!(
        "http://{}:{}{}",
        config.server.host, config.server.port, config.server.api_base
    );
    let server = api::ApiServer::new(&config, state);

    info!(url = %server_url, "Server ready - starting to serve requests");

    // Start serving (this will block until shutdown signal)
    server.serve().await?;

    Ok(())
}
