//! Client reconciler
//!
//! Keeps the rendered list, the remote store and the local cache consistent
//! on a best-effort basis. Precedence: the remote store wins whenever it is
//! reachable and has something to say; the local cache covers everything
//! else.
//!
//! - **Load**: remote list if the call succeeds with a non-empty result,
//!   otherwise the cache. Offline changes to remote items are replayed
//!   before the remote list is adopted.
//! - **Create / Toggle / Edit**: remote first, cache on failure. Remote
//!   results are written through to the cache.
//! - **Delete / Clear completed**: cache first, re-render from the cache,
//!   then tell the remote store. Remote failure never reverts the view.
//!
//! Every operation takes `&mut self`, so a reconciler has at most one
//! request in flight and a second submit cannot race the first.

use serde::Serialize;

use crate::error::{Result, TodoError};
use crate::item::{is_blank, Deadline, NewTodo, TodoId, TodoItem, TodoPatch};
use crate::remote::RemoteStore;
use crate::storage::{LocalCache, SlotStorage};
use crate::theme::Theme;
use crate::view::{self, Row, Source, ViewChange, ViewState};

/// Which path an operation took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPath {
    /// The remote store accepted the change
    Remote,
    /// The change was applied to the local cache only
    Local,
    /// Nothing was attempted (rejected input, nothing to commit)
    Skipped,
}

/// Outcome of one reconciler operation
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub path: SyncPath,
    /// The item created or changed, when there is one
    pub item: Option<TodoItem>,
    /// What changed in the rendered list
    pub changes: Vec<ViewChange>,
}

impl Applied {
    fn skipped() -> Self {
        Self {
            path: SyncPath::Skipped,
            item: None,
            changes: Vec::new(),
        }
    }

    fn new(path: SyncPath, item: Option<TodoItem>, changes: Vec<ViewChange>) -> Self {
        tracing::debug!(?path, changes = changes.len(), "view updated");
        Self {
            path,
            item,
            changes,
        }
    }
}

/// An in-progress inline edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub id: TodoId,
    /// Text when the edit started
    pub original: String,
    /// Current buffer contents
    pub buffer: String,
}

impl EditSession {
    /// Whether committing would change anything
    pub fn is_committable(&self) -> bool {
        !is_blank(&self.buffer) && self.buffer != self.original
    }
}

/// Coordinates the view, the remote store and the local cache
pub struct Reconciler<R, S> {
    remote: R,
    cache: LocalCache<S>,
    view: ViewState,
    edit: Option<EditSession>,
}

impl<R: RemoteStore, S: SlotStorage> Reconciler<R, S> {
    pub fn new(remote: R, storage: S) -> Self {
        Self {
            remote,
            cache: LocalCache::new(storage),
            view: ViewState::new(),
            edit: None,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn cache(&self) -> &LocalCache<S> {
        &self.cache
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// Rows for the current view, with the edit buffer substituted in
    pub fn rows(&self) -> Vec<Row> {
        let editing = self
            .edit
            .as_ref()
            .map(|edit| (&edit.id, edit.buffer.as_str()));
        view::render(&self.view, editing)
    }

    // ==================== Load ====================

    /// Fetch the list, preferring the remote store
    pub async fn load(&mut self) -> Result<Applied> {
        match self.remote.list().await {
            Ok(items) if !items.is_empty() => {
                let merged = self.adopt_remote_list(items).await;
                let changes = self.view.reset(merged, Source::Remote);
                Ok(Applied::new(SyncPath::Remote, None, changes))
            }
            Ok(_) => {
                tracing::debug!("Remote store returned no items, rendering local cache");
                self.render_from_cache(SyncPath::Local)
            }
            Err(e) => {
                tracing::warn!("Failed to load from remote store, rendering local cache: {}", e);
                self.render_from_cache(SyncPath::Local)
            }
        }
    }

    /// Rewrite the cache to the remote list and return the list to render.
    ///
    /// Cached copies of remote items that differ from the remote copy hold
    /// changes made while offline; they are replayed as updates first, and
    /// kept as cached when the replay fails. Items that only exist locally
    /// follow the remote list.
    async fn adopt_remote_list(&mut self, mut items: Vec<TodoItem>) -> Vec<TodoItem> {
        let cached = match self.cache.load() {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!("Failed to read local cache: {}", e);
                Vec::new()
            }
        };

        for item in items.iter_mut() {
            let Some(remote_id) = item.id.as_remote() else {
                continue;
            };
            let Some(offline) = cached.iter().find(|c| c.id == item.id) else {
                continue;
            };
            let patch = TodoPatch::between(item, offline);
            if patch.is_empty() {
                continue;
            }
            match self.remote.update(remote_id, &patch).await {
                Ok(updated) => {
                    tracing::debug!("Replayed offline change to {}", item.id);
                    *item = updated;
                }
                Err(e) => {
                    tracing::warn!("Failed to replay offline change to {}: {}", item.id, e);
                    *item = offline.clone();
                }
            }
        }

        items.extend(cached.into_iter().filter(|item| item.id.is_local()));
        if let Err(e) = self.cache.save(&items) {
            tracing::warn!("Failed to refresh local cache: {}", e);
        }
        items
    }

    fn render_from_cache(&mut self, path: SyncPath) -> Result<Applied> {
        let items = self.cache.load()?;
        let changes = self.view.reset(items, Source::Cache);
        Ok(Applied::new(path, None, changes))
    }

    // ==================== Create ====================

    /// Add an item. Blank text is rejected without touching either store.
    pub async fn create(&mut self, text: &str, date: Option<Deadline>) -> Result<Applied> {
        if is_blank(text) {
            tracing::debug!("Ignoring blank submission");
            return Ok(Applied::skipped());
        }

        let request = NewTodo::new(text, date);
        match self.remote.create(&request).await {
            Ok(item) => {
                if let Err(e) = self.cache.upsert(item.clone()) {
                    tracing::warn!("Failed to cache created item {}: {}", item.id, e);
                }
                let changes = self.view.append(item.clone());
                Ok(Applied::new(SyncPath::Remote, Some(item), changes))
            }
            Err(e) => {
                tracing::warn!("Remote create failed, storing locally: {}", e);
                let cached = self.cache.load()?;
                let id = LocalCache::<S>::fresh_id(&cached);
                let item = TodoItem::new(id, request.text, request.date);
                self.cache.append(item.clone())?;
                let changes = self.view.append(item.clone());
                Ok(Applied::new(SyncPath::Local, Some(item), changes))
            }
        }
    }

    // ==================== Toggle ====================

    /// Flip completion of an item
    pub async fn toggle(&mut self, id: &TodoId) -> Result<Applied> {
        if let Some(remote_id) = id.as_remote() {
            match self.remote.toggle(remote_id).await {
                Ok(item) => return Ok(self.commit_remote(item)),
                Err(e) => tracing::warn!("Remote toggle of {} failed, flipping locally: {}", id, e),
            }
        }

        let item = self.cache.toggle(id)?;
        Ok(self.commit_local(id, item))
    }

    // ==================== Edit ====================

    /// Change the text of an item.
    ///
    /// Only commits when `text` is not blank and differs from the current
    /// text; otherwise nothing is attempted.
    pub async fn edit(&mut self, id: &TodoId, text: &str) -> Result<Applied> {
        let current = match self.view.get(id) {
            Some(item) => item.text.clone(),
            None => match self.cache.load()?.into_iter().find(|item| &item.id == id) {
                Some(item) => item.text,
                None => return Err(TodoError::NotFound(id.to_string())),
            },
        };
        if is_blank(text) || text == current {
            return Ok(Applied::skipped());
        }

        let patch = TodoPatch::text(text);
        if let Some(remote_id) = id.as_remote() {
            match self.remote.update(remote_id, &patch).await {
                Ok(item) => return Ok(self.commit_remote(item)),
                Err(e) => tracing::warn!("Remote update of {} failed, patching locally: {}", id, e),
            }
        }

        let item = self.cache.patch(id, &patch)?;
        Ok(self.commit_local(id, item))
    }

    /// Open an edit buffer on an item shown in the view
    pub fn begin_edit(&mut self, id: &TodoId) -> bool {
        let Some(item) = self.view.get(id) else {
            return false;
        };
        self.edit = Some(EditSession {
            id: id.clone(),
            original: item.text.clone(),
            buffer: item.text.clone(),
        });
        true
    }

    /// Replace the edit buffer contents
    pub fn set_edit_text(&mut self, text: impl Into<String>) {
        if let Some(edit) = self.edit.as_mut() {
            edit.buffer = text.into();
        }
    }

    /// Mutable access to the edit buffer, for keystroke-level editing
    pub fn edit_buffer_mut(&mut self) -> Option<&mut String> {
        self.edit.as_mut().map(|edit| &mut edit.buffer)
    }

    /// Discard the edit without any store call (Escape)
    pub fn cancel_edit(&mut self) -> Option<EditSession> {
        self.edit.take()
    }

    /// Close the edit buffer and commit it (Enter or blur)
    pub async fn commit_edit(&mut self) -> Result<Applied> {
        let Some(edit) = self.edit.take() else {
            return Ok(Applied::skipped());
        };
        if !edit.is_committable() {
            return Ok(Applied::skipped());
        }
        self.edit(&edit.id, &edit.buffer).await
    }

    // ==================== Delete ====================

    /// Remove an item: cache first, then a best-effort remote delete.
    ///
    /// The view is re-rendered from the cache and is never reverted by the
    /// remote outcome. Deleting an absent id changes nothing.
    pub async fn delete(&mut self, id: &TodoId) -> Result<Applied> {
        if self.edit.as_ref().is_some_and(|edit| &edit.id == id) {
            self.edit = None;
        }

        let removed = self.cache.remove(id)?;
        if !removed {
            tracing::debug!("Item {} not in local cache", id);
        }
        let applied = self.render_from_cache(SyncPath::Local)?;

        if let Some(remote_id) = id.as_remote() {
            match self.remote.delete(remote_id).await {
                Ok(()) => tracing::debug!("Deleted {} from remote store", id),
                Err(e) if e.is_not_found() => {
                    tracing::debug!("Item {} already gone from remote store", id)
                }
                Err(e) => tracing::warn!("Remote delete of {} failed: {}", id, e),
            }
        }

        Ok(applied)
    }

    /// Remove every completed item, same shape as [`Self::delete`]
    pub async fn clear_completed(&mut self) -> Result<Applied> {
        let removed = self.cache.clear_completed()?;
        tracing::debug!("Cleared {} completed item(s) from local cache", removed);
        let applied = self.render_from_cache(SyncPath::Local)?;

        match self.remote.clear_completed().await {
            Ok(count) => tracing::debug!("Remote store cleared {} item(s)", count),
            Err(e) => tracing::warn!("Remote clear-completed failed: {}", e),
        }

        Ok(applied)
    }

    // ==================== Theme ====================

    pub fn theme(&self) -> Theme {
        self.cache.theme()
    }

    /// Flip and persist the theme preference
    pub fn toggle_theme(&mut self) -> Result<Theme> {
        let next = self.cache.theme().toggled();
        self.cache.set_theme(next)?;
        Ok(next)
    }

    // ==================== Helpers ====================

    /// Write a remote result through to the cache and show it
    fn commit_remote(&mut self, item: TodoItem) -> Applied {
        if let Err(e) = self.cache.upsert(item.clone()) {
            tracing::warn!("Failed to cache item {}: {}", item.id, e);
        }
        let changes = self.view.replace(item.clone());
        Applied::new(SyncPath::Remote, Some(item), changes)
    }

    /// Show the result of a cache-only change
    fn commit_local(&mut self, id: &TodoId, item: Option<TodoItem>) -> Applied {
        match item {
            Some(item) => {
                let changes = self.view.replace(item.clone());
                Applied::new(SyncPath::Local, Some(item), changes)
            }
            None => {
                tracing::debug!("Item {} not in local cache", id);
                Applied::new(SyncPath::Local, None, Vec::new())
            }
        }
    }
}
