//! In-process remote store with a reachability switch

use std::sync::Mutex;

use super::RemoteStore;
use crate::error::RemoteError;
use crate::item::{NewTodo, TodoId, TodoItem, TodoPatch};

#[derive(Debug)]
struct Inner {
    /// Newest first, matching the list order of the real store
    items: Vec<TodoItem>,
    next_id: i64,
    reachable: bool,
    calls: usize,
}

/// Remote store kept in memory.
///
/// Behaves like the HTTP store: ids count up from 1, listing is newest
/// first, and every call fails with `Unavailable` while switched off.
#[derive(Debug)]
pub struct InMemoryRemote {
    inner: Mutex<Inner>,
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: Vec::new(),
                next_id: 1,
                reachable: true,
                calls: 0,
            }),
        }
    }

    /// A store that fails every call
    pub fn unreachable() -> Self {
        let store = Self::new();
        store.set_reachable(false);
        store
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.lock().reachable = reachable;
    }

    /// Snapshot of the stored items, newest first
    pub fn items(&self) -> Vec<TodoItem> {
        self.lock().items.clone()
    }

    /// Number of calls made, reachable or not
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Poisoning is ignored; every critical section leaves `Inner` consistent
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn with_store<T>(
        &self,
        f: impl FnOnce(&mut Inner) -> Result<T, RemoteError>,
    ) -> Result<T, RemoteError> {
        let mut inner = self.lock();
        inner.calls += 1;
        if !inner.reachable {
            return Err(RemoteError::Unavailable);
        }
        f(&mut inner)
    }
}

fn find(inner: &mut Inner, id: i64) -> Result<&mut TodoItem, RemoteError> {
    inner
        .items
        .iter_mut()
        .find(|item| item.id == TodoId::Remote(id))
        .ok_or(RemoteError::NotFound)
}

impl RemoteStore for InMemoryRemote {
    async fn list(&self) -> Result<Vec<TodoItem>, RemoteError> {
        self.with_store(|inner| Ok(inner.items.clone()))
    }

    async fn create(&self, todo: &NewTodo) -> Result<TodoItem, RemoteError> {
        self.with_store(|inner| {
            let item = TodoItem::new(TodoId::Remote(inner.next_id), todo.text.clone(), todo.date);
            inner.next_id += 1;
            inner.items.insert(0, item.clone());
            Ok(item)
        })
    }

    async fn update(&self, id: i64, patch: &TodoPatch) -> Result<TodoItem, RemoteError> {
        self.with_store(|inner| {
            let item = find(inner, id)?;
            patch.apply_to(item);
            Ok(item.clone())
        })
    }

    async fn toggle(&self, id: i64) -> Result<TodoItem, RemoteError> {
        self.with_store(|inner| {
            let item = find(inner, id)?;
            item.completed = !item.completed;
            Ok(item.clone())
        })
    }

    async fn delete(&self, id: i64) -> Result<(), RemoteError> {
        self.with_store(|inner| {
            let before = inner.items.len();
            inner.items.retain(|item| item.id != TodoId::Remote(id));
            if inner.items.len() == before {
                Err(RemoteError::NotFound)
            } else {
                Ok(())
            }
        })
    }

    async fn clear_completed(&self) -> Result<usize, RemoteError> {
        self.with_store(|inner| {
            let before = inner.items.len();
            inner.items.retain(|item| !item.completed);
            Ok(before - inner.items.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_and_order() {
        let store = InMemoryRemote::new();
        let first = store.create(&NewTodo::new("first", None)).await.unwrap();
        let second = store.create(&NewTodo::new("second", None)).await.unwrap();
        assert_eq!(first.id, TodoId::Remote(1));
        assert_eq!(second.id, TodoId::Remote(2));

        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].text, "second");
        assert_eq!(listed[1].text, "first");
    }

    #[tokio::test]
    async fn test_not_found() {
        let store = InMemoryRemote::new();
        assert!(store.toggle(5).await.unwrap_err().is_not_found());
        assert!(store.delete(5).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_unreachable_counts_calls() {
        let store = InMemoryRemote::unreachable();
        assert!(matches!(store.list().await, Err(RemoteError::Unavailable)));
        assert_eq!(store.calls(), 1);
        store.set_reachable(true);
        assert!(store.list().await.unwrap().is_empty());
    }
}
