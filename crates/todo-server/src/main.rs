//! Todo Server Binary
//!
//! Standalone server for the todo API.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use todo_core::TodoConfig;
use todo_server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = TodoConfig::load()?;
    let state = Arc::new(AppState::with_persistence(config.server.resolved_db_path())?);

    serve(&config.server.addr, state).await
}
