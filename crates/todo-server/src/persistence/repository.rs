//! Repository for CRUD operations on todo items

use std::path::Path;

use rusqlite::{params, OptionalExtension};

use super::schema::{Schema, SCHEMA_VERSION};
use crate::error::Result;
use todo_core::item::{Deadline, NewTodo, TodoId, TodoItem, TodoPatch};

const SELECT_TODO: &str = "SELECT id, text, date, completed FROM todos";

/// Repository for persisting todo items
pub struct Repository {
    conn: rusqlite::Connection,
}

impl Repository {
    /// Create a new repository with the given database path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = rusqlite::Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Create an in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Initialize the database schema
    fn initialize(&self) -> Result<()> {
        if self.get_schema_version().is_none() {
            self.conn.execute_batch(Schema::create_tables())?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )?;
        }
        Ok(())
    }

    fn get_schema_version(&self) -> Option<u32> {
        self.conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY applied_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .ok()
    }

    // ==================== Todo Operations ====================

    /// All items, most recently created first
    pub fn list_todos(&self) -> Result<Vec<TodoItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY created_at DESC, id DESC", SELECT_TODO))?;

        let todos = stmt
            .query_map([], Self::row_to_todo)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(todos)
    }

    /// Get an item by id
    pub fn get_todo(&self, id: i64) -> Result<Option<TodoItem>> {
        let todo = self
            .conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_TODO), [id], Self::row_to_todo)
            .optional()?;
        Ok(todo)
    }

    /// Insert an item and return it with its assigned id
    pub fn insert_todo(&self, todo: &NewTodo) -> Result<TodoItem> {
        self.conn.execute(
            "INSERT INTO todos (text, date) VALUES (?1, ?2)",
            params![todo.text, todo.date.map(|d| d.to_string())],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(TodoItem::new(TodoId::Remote(id), todo.text.clone(), todo.date))
    }

    /// Apply a partial update; `None` when the id does not exist
    pub fn update_todo(&self, id: i64, patch: &TodoPatch) -> Result<Option<TodoItem>> {
        let Some(mut todo) = self.get_todo(id)? else {
            return Ok(None);
        };
        patch.apply_to(&mut todo);

        self.conn.execute(
            "UPDATE todos SET text = ?1, date = ?2, completed = ?3 WHERE id = ?4",
            params![
                todo.text,
                todo.date.map(|d| d.to_string()),
                todo.completed,
                id
            ],
        )?;
        Ok(Some(todo))
    }

    /// Flip completion; `None` when the id does not exist
    pub fn toggle_todo(&self, id: i64) -> Result<Option<TodoItem>> {
        let changed = self.conn.execute(
            "UPDATE todos SET completed = NOT completed WHERE id = ?1",
            [id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.get_todo(id)
    }

    /// Delete an item, returning whether it existed
    pub fn delete_todo(&self, id: i64) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM todos WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    /// Delete every completed item, returning how many went
    pub fn clear_completed(&self) -> Result<usize> {
        let deleted = self.conn.execute("DELETE FROM todos WHERE completed = 1", [])?;
        Ok(deleted)
    }

    fn row_to_todo(row: &rusqlite::Row) -> rusqlite::Result<TodoItem> {
        let id: i64 = row.get(0)?;
        let text: String = row.get(1)?;
        let date_str: Option<String> = row.get(2)?;
        let completed: bool = row.get(3)?;

        let date = match date_str.filter(|s| !s.trim().is_empty()) {
            Some(s) => Some(s.parse::<Deadline>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?),
            None => None,
        };

        Ok(TodoItem {
            id: TodoId::Remote(id),
            text,
            date,
            completed,
        })
    }
}
