//! Rendered list state
//!
//! `ViewState` is the list the user sees. It never talks to a store; the
//! reconciler decides what goes in and reports the difference as a list of
//! [`ViewChange`]s computed by [`diff`].

use std::collections::HashMap;

use serde::Serialize;

use crate::item::{TodoId, TodoItem};

/// Where the currently rendered list came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Nothing loaded yet
    #[default]
    Empty,
    /// Last full load came from the remote store
    Remote,
    /// Last full load (or delete) rendered the local cache
    Cache,
}

/// One keyed change between two renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewChange {
    /// Item appeared at `index` of the new list
    Inserted { index: usize, id: TodoId },
    /// Item kept its place but its fields changed
    Updated { index: usize, id: TodoId },
    /// Item was at `index` of the old list and is gone
    Removed { index: usize, id: TodoId },
}

impl ViewChange {
    pub fn id(&self) -> &TodoId {
        match self {
            ViewChange::Inserted { id, .. }
            | ViewChange::Updated { id, .. }
            | ViewChange::Removed { id, .. } => id,
        }
    }
}

/// Keyed diff of two item lists.
///
/// Removals come first (indices into `before`), then insertions and
/// updates in `after` order (indices into `after`). Pure reorders produce
/// no change.
pub fn diff(before: &[TodoItem], after: &[TodoItem]) -> Vec<ViewChange> {
    let old: HashMap<&TodoId, &TodoItem> = before.iter().map(|item| (&item.id, item)).collect();
    let new: HashMap<&TodoId, ()> = after.iter().map(|item| (&item.id, ())).collect();

    let mut changes: Vec<ViewChange> = before
        .iter()
        .enumerate()
        .filter(|(_, item)| !new.contains_key(&item.id))
        .map(|(index, item)| ViewChange::Removed {
            index,
            id: item.id.clone(),
        })
        .collect();

    for (index, item) in after.iter().enumerate() {
        match old.get(&item.id) {
            None => changes.push(ViewChange::Inserted {
                index,
                id: item.id.clone(),
            }),
            Some(previous) if *previous != item => changes.push(ViewChange::Updated {
                index,
                id: item.id.clone(),
            }),
            Some(_) => {}
        }
    }

    changes
}

/// The list as currently rendered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    items: Vec<TodoItem>,
    source: Source,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Replace the whole list
    pub fn reset(&mut self, items: Vec<TodoItem>, source: Source) -> Vec<ViewChange> {
        let changes = diff(&self.items, &items);
        self.items = items;
        self.source = source;
        changes
    }

    /// Add an item at the end
    pub fn append(&mut self, item: TodoItem) -> Vec<ViewChange> {
        let mut items = self.items.clone();
        items.push(item);
        let changes = diff(&self.items, &items);
        self.items = items;
        changes
    }

    /// Swap in a new version of an item already shown; absent ids are ignored
    pub fn replace(&mut self, item: TodoItem) -> Vec<ViewChange> {
        let Some(index) = self.items.iter().position(|existing| existing.id == item.id) else {
            return Vec::new();
        };
        if self.items[index] == item {
            return Vec::new();
        }
        let id = item.id.clone();
        self.items[index] = item;
        vec![ViewChange::Updated { index, id }]
    }
}

/// One line of the rendered list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub id: TodoId,
    pub text: String,
    pub date_label: String,
    pub completed: bool,
    /// Not yet known to the remote store
    pub local_only: bool,
    /// Being edited; `text` holds the edit buffer
    pub editing: bool,
}

/// Label shown for items without a date
pub const NO_DATE: &str = "No date";

/// Render the view into rows, substituting the edit buffer for the item
/// under edit.
pub fn render(view: &ViewState, editing: Option<(&TodoId, &str)>) -> Vec<Row> {
    view.items()
        .iter()
        .map(|item| {
            let edit_text = editing.and_then(|(id, buffer)| (id == &item.id).then_some(buffer));
            Row {
                id: item.id.clone(),
                text: edit_text.unwrap_or(&item.text).to_string(),
                date_label: item
                    .date
                    .map(|d| d.label())
                    .unwrap_or_else(|| NO_DATE.to_string()),
                completed: item.completed,
                local_only: item.id.is_local(),
                editing: edit_text.is_some(),
            }
        })
        .collect()
}
