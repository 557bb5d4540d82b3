//! Todo Core - offline-tolerant todo list
//!
//! This crate provides everything the todo client needs apart from the
//! screen itself:
//!
//! - **Item**: `TodoItem` with server-assigned or locally generated ids
//! - **Storage**: string-keyed slot storage and the `LocalCache` kept in it
//! - **Theme**: light/dark preference persisted in its own slot
//! - **Remote**: the `RemoteStore` contract, an HTTP client (`native`
//!   feature) and an in-memory store
//! - **View**: rendered rows and keyed diffs between renders
//! - **Reconciler**: remote-first mutations with local fallback
//! - **Config**: server and client settings from TOML and the environment
//!
//! # Precedence
//!
//! ```text
//! remote store (reachable, non-empty)  >  local cache  >  nothing
//! ```

pub mod config;
pub mod error;
pub mod item;
pub mod reconciler;
pub mod remote;
pub mod storage;
pub mod theme;
pub mod view;

pub use config::{ClientConfig, ConfigError, ServerConfig, TodoConfig};
pub use error::{RemoteError, Result, StorageError, TodoError};
pub use item::{Deadline, NewTodo, TodoId, TodoItem, TodoPatch};
pub use reconciler::{Applied, EditSession, Reconciler, SyncPath};
#[cfg(feature = "native")]
pub use remote::HttpRemoteStore;
pub use remote::{InMemoryRemote, RemoteStore};
pub use storage::{FileStorage, LocalCache, MemoryStorage, SlotStorage};
pub use theme::Theme;
pub use view::{Row, Source, ViewChange, ViewState};

/// Returns the version of todo-core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
