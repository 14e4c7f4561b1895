//! Occurrence types held by a day column.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;

use crate::error::Result;

/// Stable identity of one event or task instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccurrenceId(String);

impl OccurrenceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OccurrenceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for OccurrenceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of calendar item behind an occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceKind {
    Event,
    Task,
}

/// One already-expanded instance of an event or task.
///
/// Events carry `start_date`/`end_date`; tasks may carry only one of
/// `entry_date`/`due_date`. The layout engine resolves the displayed interval
/// through [`Occurrence::display_start`] and [`Occurrence::display_end`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: OccurrenceId,
    #[serde(default = "default_kind")]
    pub kind: OccurrenceKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub entry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub selected: bool,
}

fn default_kind() -> OccurrenceKind {
    OccurrenceKind::Event
}

impl Occurrence {
    /// Create a calendar event occurrence
    pub fn event(
        id: impl Into<OccurrenceId>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: OccurrenceKind::Event,
            title: title.into(),
            start_date: Some(start),
            end_date: Some(end),
            entry_date: None,
            due_date: None,
            selected: false,
        }
    }

    /// Create a task occurrence; either date may be missing
    pub fn task(
        id: impl Into<OccurrenceId>,
        title: impl Into<String>,
        entry: Option<DateTime<Utc>>,
        due: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: OccurrenceKind::Task,
            title: title.into(),
            start_date: None,
            end_date: None,
            entry_date: entry,
            due_date: due,
            selected: false,
        }
    }

    /// `start ?? entry ?? due`
    pub fn display_start(&self) -> Option<DateTime<Utc>> {
        self.start_date.or(self.entry_date).or(self.due_date)
    }

    /// `end ?? due ?? entry`
    pub fn display_end(&self) -> Option<DateTime<Utc>> {
        self.end_date.or(self.due_date).or(self.entry_date)
    }

    /// A task with exactly one of entry/due date.
    pub fn has_single_task_date(&self) -> bool {
        self.entry_date.is_some() != self.due_date.is_some()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

/// Read a JSON array of occurrences.
///
/// # Errors
///
/// Returns [`CoreError::Io`](crate::CoreError::Io) if reading fails and
/// [`CoreError::Json`](crate::CoreError::Json) if the
/// content is not an array of occurrences.
pub fn read_occurrences<R: Read>(mut reader: R) -> Result<Vec<Occurrence>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    Ok(serde_json::from_str(&content)?)
}
