//! taskboard add command implementations.

use crate::cli::{parse_start_time, parse_status, AddCommands};
use crate::error::Result;
use crate::item::{EpicItem, Item, SubtaskItem, TaskItem};
use crate::output::{emit_success, item_line, HumanOutput, OutputOptions};
use crate::persist::FileBackedManager;

pub fn run(board: &mut FileBackedManager, command: AddCommands, options: OutputOptions) -> Result<()> {
    let item = match command {
        AddCommands::Task {
            name,
            description,
            status,
            start,
            duration,
        } => {
            let mut task = TaskItem::new(name, description).with_status(parse_status(status.as_deref())?);
            if let Some(raw) = start.as_deref() {
                task = task.with_schedule(parse_start_time(raw)?, duration);
            } else {
                task.duration_minutes = duration;
            }
            Item::Task(task)
        }
        AddCommands::Epic { name, description } => Item::Epic(EpicItem::new(name, description)),
        AddCommands::Subtask {
            name,
            epic,
            description,
            status,
            start,
            duration,
        } => {
            let mut subtask =
                SubtaskItem::new(name, description, epic).with_status(parse_status(status.as_deref())?);
            if let Some(raw) = start.as_deref() {
                subtask = subtask.with_schedule(parse_start_time(raw)?, duration);
            } else {
                subtask.duration_minutes = duration;
            }
            Item::Subtask(subtask)
        }
    };

    let created = board.create(item)?;

    let mut human = HumanOutput::new(format!("Created {} {}", created.kind(), created.id()));
    human.push_detail(item_line(&created));
    emit_success(options, "add", &created, Some(&human))
}
