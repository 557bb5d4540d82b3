//! Remote store abstraction
//!
//! The authoritative CRUD service. Any failure, transport or status, means
//! the store is unreachable for that one operation: no retry, no backoff.

#[cfg(feature = "native")]
pub mod http;
mod memory;

#[cfg(feature = "native")]
pub use http::HttpRemoteStore;
pub use memory::InMemoryRemote;

use crate::error::RemoteError;
use crate::item::{NewTodo, TodoItem, TodoPatch};

/// Contract the reconciler consumes
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// All items, most recently created first
    async fn list(&self) -> Result<Vec<TodoItem>, RemoteError>;

    /// Insert an item; the store assigns the id
    async fn create(&self, todo: &NewTodo) -> Result<TodoItem, RemoteError>;

    /// Apply a partial update
    async fn update(&self, id: i64, patch: &TodoPatch) -> Result<TodoItem, RemoteError>;

    /// Flip completion
    async fn toggle(&self, id: i64) -> Result<TodoItem, RemoteError>;

    /// Delete one item. `NotFound` is terminal, like success.
    async fn delete(&self, id: i64) -> Result<(), RemoteError>;

    /// Delete every completed item, returning how many went
    async fn clear_completed(&self) -> Result<usize, RemoteError>;
}
