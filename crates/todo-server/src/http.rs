//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use todo_core::item::{is_blank, NewTodo, TodoItem, TodoPatch};

use crate::error::{api_error, ApiError};
use crate::AppState;

fn not_found(id: i64) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("Todo not found: {}", id))
}

/// List all todos, newest first
pub async fn list_todos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TodoItem>>, ApiError> {
    let repo = state.repository()?;
    Ok(Json(repo.list_todos()?))
}

/// Create a todo
pub async fn create_todo(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewTodo>,
) -> Result<Json<TodoItem>, ApiError> {
    if is_blank(&request.text) {
        return Err(api_error(StatusCode::BAD_REQUEST, "Todo text must not be empty"));
    }

    let repo = state.repository()?;
    let todo = repo.insert_todo(&request)?;
    tracing::info!("Created todo {}", todo.id);
    Ok(Json(todo))
}

/// Apply a partial update (`text`, `completed` and/or `date`)
pub async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<TodoPatch>,
) -> Result<Json<TodoItem>, ApiError> {
    if patch.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Nothing to update"));
    }
    if patch.text.as_deref().is_some_and(is_blank) {
        return Err(api_error(StatusCode::BAD_REQUEST, "Todo text must not be empty"));
    }

    let repo = state.repository()?;
    repo.update_todo(id, &patch)?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// Flip the completion flag
pub async fn toggle_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<TodoItem>, ApiError> {
    let repo = state.repository()?;
    repo.toggle_todo(id)?.map(Json).ok_or_else(|| not_found(id))
}

/// Delete a todo
pub async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let repo = state.repository()?;
    if !repo.delete_todo(id)? {
        return Err(not_found(id));
    }

    tracing::info!("Deleted todo {}", id);
    Ok(Json(serde_json::json!({
        "message": "Todo deleted",
        "id": id
    })))
}

/// Delete every completed todo
pub async fn clear_completed(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let repo = state.repository()?;
    let deleted = repo.clear_completed()?;

    tracing::info!("Cleared {} completed todo(s)", deleted);
    Ok(Json(serde_json::json!({
        "message": "Completed todos cleared",
        "deleted": deleted
    })))
}

/// Counts reported by the status endpoint
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub version: &'static str,
    pub total: usize,
    pub completed: usize,
}

/// Get server status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let repo = state.repository()?;
    let todos = repo.list_todos()?;

    Ok(Json(StatusResponse {
        version: todo_core::version(),
        total: todos.len(),
        completed: todos.iter().filter(|t| t.completed).count(),
    }))
}
