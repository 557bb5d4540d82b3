//! Local cache of todo items
//!
//! The whole list lives in one slot as a JSON array and is rewritten on
//! every mutation. No incremental patches.

use super::SlotStorage;
use crate::error::StorageError;
use crate::item::{TodoId, TodoItem, TodoPatch};
use crate::theme::{self, Theme};

/// Slot holding the serialized item list
pub const TODOS_SLOT: &str = "todos";

/// Fallback copy of the todo list kept on this device
#[derive(Debug)]
pub struct LocalCache<S> {
    storage: S,
}

impl<S: SlotStorage> LocalCache<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Read the cached list; a missing slot is an empty list
    pub fn load(&self) -> Result<Vec<TodoItem>, StorageError> {
        match self.storage.read(TODOS_SLOT)? {
            Some(json) if !json.trim().is_empty() => Ok(serde_json::from_str(&json)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Overwrite the cached list
    pub fn save(&mut self, items: &[TodoItem]) -> Result<(), StorageError> {
        let json = serde_json::to_string(items)?;
        self.storage.write(TODOS_SLOT, &json)?;
        tracing::trace!("Cached {} item(s)", items.len());
        Ok(())
    }

    /// A local id that collides with nothing in `items`
    pub fn fresh_id(items: &[TodoItem]) -> TodoId {
        loop {
            let id = TodoId::generate_local();
            if !items.iter().any(|item| item.id == id) {
                return id;
            }
        }
    }

    /// Append an item
    pub fn append(&mut self, item: TodoItem) -> Result<(), StorageError> {
        let mut items = self.load()?;
        items.push(item);
        self.save(&items)
    }

    /// Replace the entry with the same id, or insert it first when absent
    /// (the remote store lists newest first)
    pub fn upsert(&mut self, item: TodoItem) -> Result<(), StorageError> {
        let mut items = self.load()?;
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => items.insert(0, item),
        }
        self.save(&items)
    }

    /// Flip completion of an entry; `None` when the id is not cached
    pub fn toggle(&mut self, id: &TodoId) -> Result<Option<TodoItem>, StorageError> {
        self.modify(id, |item| item.completed = !item.completed)
    }

    /// Apply a patch to an entry; `None` when the id is not cached
    pub fn patch(
        &mut self,
        id: &TodoId,
        patch: &TodoPatch,
    ) -> Result<Option<TodoItem>, StorageError> {
        self.modify(id, |item| patch.apply_to(item))
    }

    /// Remove an entry. Returns false, without writing, when it is absent.
    pub fn remove(&mut self, id: &TodoId) -> Result<bool, StorageError> {
        let mut items = self.load()?;
        let before = items.len();
        items.retain(|item| &item.id != id);
        if items.len() == before {
            return Ok(false);
        }
        self.save(&items)?;
        Ok(true)
    }

    /// Remove every completed entry, returning how many went
    pub fn clear_completed(&mut self) -> Result<usize, StorageError> {
        let mut items = self.load()?;
        let before = items.len();
        items.retain(|item| !item.completed);
        let removed = before - items.len();
        if removed > 0 {
            self.save(&items)?;
        }
        Ok(removed)
    }

    /// Stored theme preference
    pub fn theme(&self) -> Theme {
        theme::load(&self.storage)
    }

    /// Persist the theme preference in its own slot
    pub fn set_theme(&mut self, value: Theme) -> Result<(), StorageError> {
        theme::save(&mut self.storage, value)
    }

    fn modify(
        &mut self,
        id: &TodoId,
        f: impl FnOnce(&mut TodoItem),
    ) -> Result<Option<TodoItem>, StorageError> {
        let mut items = self.load()?;
        let Some(item) = items.iter_mut().find(|item| &item.id == id) else {
            return Ok(None);
        };
        f(item);
        let updated = item.clone();
        self.save(&items)?;
        Ok(Some(updated))
    }
}
