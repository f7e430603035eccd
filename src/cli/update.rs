//! taskboard update command implementation.
//!
//! Reads the current item, applies the requested field edits, and pushes
//! the result back through the facade. Epic status and schedule are
//! derived, so those flags are rejected for epics.

use crate::cli::parse_start_time;
use crate::error::{Error, Result};
use crate::item::{Item, ItemId, Status};
use crate::output::{emit_success, item_line, HumanOutput, OutputOptions};
use crate::persist::FileBackedManager;

pub struct UpdateOptions {
    pub id: ItemId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub start: Option<String>,
    pub duration: Option<i64>,
    pub clear_start: bool,
}

pub fn run(
    board: &mut FileBackedManager,
    update: UpdateOptions,
    options: OutputOptions,
) -> Result<()> {
    let current = board
        .get_by_id(update.id)?
        .ok_or_else(|| Error::InvalidArgument(format!("no item with id {}", update.id)))?;

    let status = update
        .status
        .as_deref()
        .map(str::parse::<Status>)
        .transpose()?;
    let start = update
        .start
        .as_deref()
        .map(parse_start_time)
        .transpose()?;
    if update.clear_start && start.is_some() {
        return Err(Error::InvalidArgument(
            "--start and --clear-start are mutually exclusive".to_string(),
        ));
    }

    let edited = match current {
        Item::Task(mut task) => {
            if let Some(name) = update.name {
                task.name = name;
            }
            if let Some(description) = update.description {
                task.description = description;
            }
            if let Some(status) = status {
                task.status = status;
            }
            if let Some(start) = start {
                task.start_time = Some(start);
            }
            if update.clear_start {
                task.start_time = None;
            }
            if let Some(duration) = update.duration {
                task.duration_minutes = duration;
            }
            Item::Task(task)
        }
        Item::Subtask(mut subtask) => {
            if let Some(name) = update.name {
                subtask.name = name;
            }
            if let Some(description) = update.description {
                subtask.description = description;
            }
            if let Some(status) = status {
                subtask.status = status;
            }
            if let Some(start) = start {
                subtask.start_time = Some(start);
            }
            if update.clear_start {
                subtask.start_time = None;
            }
            if let Some(duration) = update.duration {
                subtask.duration_minutes = duration;
            }
            Item::Subtask(subtask)
        }
        Item::Epic(mut epic) => {
            if status.is_some() || start.is_some() || update.duration.is_some() || update.clear_start
            {
                return Err(Error::InvalidArgument(
                    "epic status and schedule are derived from its subtasks".to_string(),
                ));
            }
            if let Some(name) = update.name {
                epic.name = name;
            }
            if let Some(description) = update.description {
                epic.description = description;
            }
            Item::Epic(epic)
        }
    };

    board.update(edited)?;

    // Re-read so derived fields reflect the mutation.
    let refreshed = board
        .get_by_id(update.id)?
        .ok_or_else(|| Error::InvalidArgument(format!("no item with id {}", update.id)))?;
    let mut human = HumanOutput::new(format!("Updated {} {}", refreshed.kind(), refreshed.id()));
    human.push_detail(item_line(&refreshed));
    emit_success(options, "update", &refreshed, Some(&human))
}
