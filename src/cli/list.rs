//! taskboard listing command implementations.

use crate::error::{Error, Result};
use crate::item::{Item, ItemId};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::persist::FileBackedManager;

pub fn run_list(
    board: &FileBackedManager,
    kind: Option<&str>,
    options: OutputOptions,
) -> Result<()> {
    let items = match kind {
        None | Some("all") => board.all_items(),
        Some("task") => board.plain_tasks(),
        Some("epic") => board.epics(),
        Some("subtask") => board.subtasks(),
        Some(other) => {
            return Err(Error::InvalidArgument(format!(
                "unknown kind '{other}' (expected task, epic, subtask, all)"
            )))
        }
    };
    emit_items(options, "list", &items, "Items")
}

pub fn run_subtasks(
    board: &FileBackedManager,
    epic_id: ItemId,
    options: OutputOptions,
) -> Result<()> {
    let items = board.subtasks_of(epic_id);
    emit_items(
        options,
        "subtasks",
        &items,
        format!("Subtasks of epic {epic_id}"),
    )
}

pub fn run_prioritized(board: &FileBackedManager, options: OutputOptions) -> Result<()> {
    let items = board.prioritized();
    emit_items(options, "prioritized", &items, "Schedule")
}

pub fn run_history(board: &FileBackedManager, options: OutputOptions) -> Result<()> {
    let items = board.history();
    emit_items(options, "history", &items, "Recently viewed")
}

fn emit_items(
    options: OutputOptions,
    command: &str,
    items: &[Item],
    header: impl Into<String>,
) -> Result<()> {
    let mut human = HumanOutput::new(format!("{} ({})", header.into(), items.len()));
    human.push_items(items);
    emit_success(options, command, &items, Some(&human))
}
