//! Persistence layer for the todo table
//!
//! Provides SQLite-backed storage for todo items.

mod repository;
mod schema;

pub use repository::Repository;
pub use schema::{Schema, SCHEMA_VERSION};
