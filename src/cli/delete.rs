//! taskboard delete and clear command implementations.

use crate::error::{Error, Result};
use crate::item::ItemId;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::persist::FileBackedManager;

pub fn run_delete(board: &mut FileBackedManager, id: ItemId, options: OutputOptions) -> Result<()> {
    let removed = board.delete_by_id(id)?;

    let header = if removed.is_empty() {
        format!("Nothing to delete for id {id}")
    } else {
        format!("Deleted {} item(s)", removed.len())
    };
    let mut human = HumanOutput::new(header);
    human.push_items(&removed);
    emit_success(options, "delete", &removed, Some(&human))
}

pub fn run_clear(board: &mut FileBackedManager, kind: &str, options: OutputOptions) -> Result<()> {
    let removed = match kind {
        "all" => board.delete_all_items()?,
        "task" => board.delete_all_plain()?,
        "epic" => board.delete_all_epics()?,
        "subtask" => board.delete_all_subtasks()?,
        other => {
            return Err(Error::InvalidArgument(format!(
                "unknown kind '{other}' (expected task, epic, subtask, all)"
            )))
        }
    };

    let mut human = HumanOutput::new(format!("Deleted {} item(s)", removed.len()));
    human.push_items(&removed);
    emit_success(options, "clear", &removed, Some(&human))
}
