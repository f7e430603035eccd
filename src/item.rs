//! Work-item model: plain tasks, epics, and subtasks.
//!
//! The three kinds share one identity space and a common set of fields
//! (name, description, status, optional start time, duration). The kind is
//! discriminated by an explicit `kind` tag in the serialized form.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identity shared by all item kinds. Assigned once by the facade,
/// monotonically increasing, never reused.
pub type ItemId = u64;

/// Placeholder for items that have not been through `create` yet.
pub const UNASSIGNED_ID: ItemId = 0;

/// Workflow status of an item.
///
/// Plain tasks and subtasks carry the status their callers set; an epic's
/// status is derived from its subtasks and never set directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    New,
    InProgress,
    Done,
}

impl std::str::FromStr for Status {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Status::New),
            "in_progress" | "in-progress" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            other => Err(Error::InvalidArgument(format!(
                "unknown status '{other}' (expected new, in_progress, done)"
            ))),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Status::New => "new",
            Status::InProgress => "in_progress",
            Status::Done => "done",
        };
        f.write_str(label)
    }
}

/// Concrete scheduled interval of an item, half-open `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub id: ItemId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

fn end_of(start: Option<DateTime<Utc>>, duration_minutes: i64) -> Option<DateTime<Utc>> {
    start.map(|start| start + Duration::minutes(duration_minutes))
}

/// A standalone task with no further structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: i64,
}

impl TaskItem {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
            description: description.into(),
            status: Status::New,
            start_time: None,
            duration_minutes: 0,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_schedule(mut self, start: DateTime<Utc>, duration_minutes: i64) -> Self {
        self.start_time = Some(start);
        self.duration_minutes = duration_minutes;
        self
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        end_of(self.start_time, self.duration_minutes)
    }

    pub fn interval(&self) -> Option<Interval> {
        Some(Interval {
            id: self.id,
            start: self.start_time?,
            end: self.end_time()?,
        })
    }
}

/// A container item. Status, start, duration, and end are all derived from
/// the owned subtasks; only name and description are caller-editable.
///
/// `end_time` is stored separately: an epic's duration is the sum of its
/// subtask durations, so `start + duration` generally differs from the
/// latest subtask end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpicItem {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Owned subtask ids, in link order, no duplicates.
    #[serde(default)]
    pub subtask_ids: Vec<ItemId>,
}

impl EpicItem {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
            description: description.into(),
            status: Status::New,
            start_time: None,
            duration_minutes: 0,
            end_time: None,
            subtask_ids: Vec::new(),
        }
    }
}

/// An item owned by exactly one epic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtaskItem {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: i64,
    /// Non-owning reference to the epic this subtask belongs to.
    pub epic_id: ItemId,
}

impl SubtaskItem {
    pub fn new(name: impl Into<String>, description: impl Into<String>, epic_id: ItemId) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
            description: description.into(),
            status: Status::New,
            start_time: None,
            duration_minutes: 0,
            epic_id,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_schedule(mut self, start: DateTime<Utc>, duration_minutes: i64) -> Self {
        self.start_time = Some(start);
        self.duration_minutes = duration_minutes;
        self
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        end_of(self.start_time, self.duration_minutes)
    }

    pub fn interval(&self) -> Option<Interval> {
        Some(Interval {
            id: self.id,
            start: self.start_time?,
            end: self.end_time()?,
        })
    }
}

/// Any addressable unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    Task(TaskItem),
    Epic(EpicItem),
    Subtask(SubtaskItem),
}

impl Item {
    pub fn id(&self) -> ItemId {
        match self {
            Item::Task(task) => task.id,
            Item::Epic(epic) => epic.id,
            Item::Subtask(subtask) => subtask.id,
        }
    }

    pub fn set_id(&mut self, id: ItemId) {
        match self {
            Item::Task(task) => task.id = id,
            Item::Epic(epic) => epic.id = id,
            Item::Subtask(subtask) => subtask.id = id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Item::Task(task) => &task.name,
            Item::Epic(epic) => &epic.name,
            Item::Subtask(subtask) => &subtask.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Item::Task(task) => &task.description,
            Item::Epic(epic) => &epic.description,
            Item::Subtask(subtask) => &subtask.description,
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Item::Task(task) => task.status,
            Item::Epic(epic) => epic.status,
            Item::Subtask(subtask) => subtask.status,
        }
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Item::Task(task) => task.start_time,
            Item::Epic(epic) => epic.start_time,
            Item::Subtask(subtask) => subtask.start_time,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        match self {
            Item::Task(task) => task.duration_minutes,
            Item::Epic(epic) => epic.duration_minutes,
            Item::Subtask(subtask) => subtask.duration_minutes,
        }
    }

    /// End of the item's scheduled window. For tasks and subtasks this is
    /// `start + duration`; an epic reports its stored derived end.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Item::Task(task) => task.end_time(),
            Item::Epic(epic) => epic.end_time,
            Item::Subtask(subtask) => subtask.end_time(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Item::Task(_) => "task",
            Item::Epic(_) => "epic",
            Item::Subtask(_) => "subtask",
        }
    }

    pub fn is_epic(&self) -> bool {
        matches!(self, Item::Epic(_))
    }
}
