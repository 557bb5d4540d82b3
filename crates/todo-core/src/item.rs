//! Todo item model
//!
//! Items carry either a server-assigned integer id or a locally generated
//! string id. The two serialize to different JSON types, so an item created
//! offline can never be confused with one the server numbered.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifier of a todo item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TodoId {
    /// Assigned by the remote store
    Remote(i64),
    /// Generated on this device while the remote store was unreachable
    Local(String),
}

impl TodoId {
    /// Generate a time-based local id with a random suffix
    pub fn generate_local() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix = Uuid::new_v4().simple().to_string();
        TodoId::Local(format!("local-{}-{}", millis, &suffix[..8]))
    }

    /// The server id, if this item came from the remote store
    pub fn as_remote(&self) -> Option<i64> {
        match self {
            TodoId::Remote(id) => Some(*id),
            TodoId::Local(_) => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, TodoId::Local(_))
    }
}

impl From<i64> for TodoId {
    fn from(id: i64) -> Self {
        TodoId::Remote(id)
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TodoId::Remote(id) => write!(f, "{}", id),
            TodoId::Local(id) => write!(f, "{}", id),
        }
    }
}

/// Error parsing a [`Deadline`]
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid date: {0:?}")]
pub struct ParseDeadlineError(pub String);

/// Optional due date of an item: a calendar day or a day and time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Deadline {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

impl Deadline {
    /// Short human label used by the list view
    pub fn label(&self) -> String {
        match self {
            Deadline::Date(d) => d.format("%Y-%m-%d").to_string(),
            Deadline::DateTime(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

impl FromStr for Deadline {
    type Err = ParseDeadlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Deadline::Date(date));
        }
        for format in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Deadline::DateTime(dt));
            }
        }
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Deadline::DateTime(dt.naive_utc()))
            .map_err(|_| ParseDeadlineError(s.to_string()))
    }
}

impl std::fmt::Display for Deadline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Deadline::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Deadline::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl TryFrom<String> for Deadline {
    type Error = ParseDeadlineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Deadline> for String {
    fn from(value: Deadline) -> Self {
        value.to_string()
    }
}

/// Deserialize an optional deadline, treating `""` like `null`
fn optional_deadline<'de, D>(deserializer: D) -> Result<Option<Deadline>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(s) if !s.trim().is_empty() => s.parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Deserialize a patch date: a present field (even `null`) is `Some`
fn patched_deadline<'de, D>(deserializer: D) -> Result<Option<Option<Deadline>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_deadline(deserializer).map(Some)
}

/// A todo item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: TodoId,
    pub text: String,
    #[serde(default, alias = "deadline", deserialize_with = "optional_deadline")]
    pub date: Option<Deadline>,
    #[serde(default)]
    pub completed: bool,
}

impl TodoItem {
    /// Create an open item
    pub fn new(id: TodoId, text: impl Into<String>, date: Option<Deadline>) -> Self {
        Self {
            id,
            text: text.into(),
            date,
            completed: false,
        }
    }
}

/// Whether `text` would be rejected as an item text
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Body of a create request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTodo {
    pub text: String,
    #[serde(default, alias = "deadline", deserialize_with = "optional_deadline")]
    pub date: Option<Deadline>,
}

impl NewTodo {
    pub fn new(text: impl Into<String>, date: Option<Deadline>) -> Self {
        Self {
            text: text.into(),
            date,
        }
    }
}

/// Partial update of an item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// `None` leaves the date alone, `Some(None)` clears it
    #[serde(
        default,
        alias = "deadline",
        deserialize_with = "patched_deadline",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<Option<Deadline>>,
}

impl TodoPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }

    pub fn date(date: Option<Deadline>) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }

    /// The patch that turns `from` into `to`, covering only fields that differ
    pub fn between(from: &TodoItem, to: &TodoItem) -> Self {
        Self {
            text: (from.text != to.text).then(|| to.text.clone()),
            completed: (from.completed != to.completed).then_some(to.completed),
            date: (from.date != to.date).then_some(to.date),
        }
    }

    /// True when the patch would change nothing
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.completed.is_none() && self.date.is_none()
    }

    /// Apply the patch to an item in place
    pub fn apply_to(&self, item: &mut TodoItem) {
        if let Some(text) = &self.text {
            item.text = text.clone();
        }
        if let Some(completed) = self.completed {
            item.completed = completed;
        }
        if let Some(date) = self.date {
            item.date = date;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remote_and_local_ids_differ_on_the_wire() {
        assert_eq!(serde_json::to_value(TodoId::Remote(1)).unwrap(), json!(1));
        let local = TodoId::generate_local();
        assert!(serde_json::to_value(&local).unwrap().is_string());

        let parsed: TodoId = serde_json::from_value(json!("1")).unwrap();
        assert_eq!(parsed, TodoId::Local("1".to_string()));
        assert_ne!(parsed, TodoId::Remote(1));
    }

    #[test]
    fn test_generated_local_ids_are_unique() {
        let a = TodoId::generate_local();
        let b = TodoId::generate_local();
        assert_ne!(a, b);
        assert!(a.is_local());
        assert!(a.to_string().starts_with("local-"));
    }

    #[test]
    fn test_deadline_formats() {
        assert_eq!(
            "2025-08-15".parse::<Deadline>().unwrap(),
            Deadline::Date(NaiveDate::from_ymd_opt(2025, 8, 15).unwrap())
        );
        let with_time: Deadline = "2025-08-15 10:00:00".parse().unwrap();
        assert_eq!(with_time.to_string(), "2025-08-15 10:00:00");
        assert_eq!(with_time.label(), "2025-08-15 10:00");
        assert_eq!(
            "2025-08-15T10:00".parse::<Deadline>().unwrap(),
            with_time
        );
        assert_eq!(
            "2025-08-15T10:00:00.000Z".parse::<Deadline>().unwrap(),
            with_time
        );
        assert!("tomorrow".parse::<Deadline>().is_err());
    }

    #[test]
    fn test_item_json_shape() {
        let item = TodoItem::new(TodoId::Remote(1), "Buy milk", None);
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"id": 1, "text": "Buy milk", "date": null, "completed": false})
        );
    }

    #[test]
    fn test_item_accepts_deadline_alias_and_empty_date() {
        let item: TodoItem = serde_json::from_value(json!({
            "id": 7,
            "text": "Report",
            "deadline": "2025-08-15 10:00:00"
        }))
        .unwrap();
        assert!(matches!(item.date, Some(Deadline::DateTime(_))));
        assert!(!item.completed);

        let new: NewTodo = serde_json::from_value(json!({"text": "x", "date": ""})).unwrap();
        assert_eq!(new.date, None);
    }

    #[test]
    fn test_patch_apply() {
        let mut item = TodoItem::new(TodoId::Remote(3), "old", None);
        assert!(TodoPatch::default().is_empty());

        TodoPatch::text("new").apply_to(&mut item);
        TodoPatch::completed(true).apply_to(&mut item);
        assert_eq!(item.text, "new");
        assert!(item.completed);

        let body = serde_json::to_value(TodoPatch::completed(false)).unwrap();
        assert_eq!(body, json!({"completed": false}));
    }

    #[test]
    fn test_patch_null_date_clears() {
        let patch: TodoPatch = serde_json::from_value(json!({"date": null})).unwrap();
        assert_eq!(patch, TodoPatch::date(None));
        assert!(!patch.is_empty());

        let absent: TodoPatch = serde_json::from_value(json!({"text": "x"})).unwrap();
        assert_eq!(absent.date, None);

        let due: Deadline = "2025-08-15".parse().unwrap();
        let mut item = TodoItem::new(TodoId::Remote(1), "x", Some(due));
        patch.apply_to(&mut item);
        assert_eq!(item.date, None);

        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"date": null}));
        let set = serde_json::to_value(TodoPatch::date(Some(due))).unwrap();
        assert_eq!(set, json!({"date": "2025-08-15"}));
    }

    #[test]
    fn test_patch_between_items() {
        let before = TodoItem::new(TodoId::Remote(1), "a", None);
        let mut after = before.clone();
        assert!(TodoPatch::between(&before, &after).is_empty());

        after.completed = true;
        after.text = "b".to_string();
        let patch = TodoPatch::between(&before, &after);
        assert_eq!(patch.text.as_deref(), Some("b"));
        assert_eq!(patch.completed, Some(true));
        assert_eq!(patch.date, None);

        let mut replayed = before.clone();
        patch.apply_to(&mut replayed);
        assert_eq!(replayed, after);
    }

    #[test]
    fn test_blank_text() {
        assert!(is_blank(""));
        assert!(is_blank(" \t\n"));
        assert!(!is_blank(" a "));
    }
}
