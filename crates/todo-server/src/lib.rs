//! Todo Server - HTTP API for the todo list
//!
//! JSON CRUD routes over a single SQLite table. Clients treat this server
//! as the source of truth whenever it is reachable.

pub mod error;
pub mod http;
pub mod persistence;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    http::StatusCode,
    routing::{delete, get, patch, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use error::{api_error, ApiError};
use persistence::Repository;

/// Shared application state
pub struct AppState {
    pub repository: Mutex<Repository>,
}

impl AppState {
    /// Create with a SQLite database at `db_path`
    pub fn with_persistence(db_path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let repository = Repository::new(&db_path)?;
        tracing::info!("Opened todo database at {:?}", db_path.as_ref());
        Ok(Self {
            repository: Mutex::new(repository),
        })
    }

    /// Create backed by an in-memory database
    pub fn in_memory() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            repository: Mutex::new(Repository::in_memory()?),
        })
    }

    /// Lock the repository for one request
    pub fn repository(&self) -> Result<MutexGuard<'_, Repository>, ApiError> {
        self.repository.lock().map_err(|e| {
            tracing::error!("Repository mutex poisoned: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Repository unavailable")
        })
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/todos", get(http::list_todos).post(http::create_todo))
        .route("/api/todos/clear-completed", delete(http::clear_completed))
        .route(
            "/api/todos/{id}",
            put(http::update_todo).delete(http::delete_todo),
        )
        .route("/api/todos/{id}/toggle", patch(http::toggle_todo))
        .route("/api/status", get(http::get_status))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_on(listener, state).await
}

/// Serve on an already bound listener
pub async fn serve_on(
    listener: tokio::net::TcpListener,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    tracing::info!("Todo server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
