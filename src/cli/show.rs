//! taskboard show command implementation.

use crate::error::{Error, Result};
use crate::item::{Item, ItemId};
use crate::output::{emit_success, item_line, HumanOutput, OutputOptions};
use crate::persist::FileBackedManager;

pub fn run(board: &mut FileBackedManager, id: ItemId, options: OutputOptions) -> Result<()> {
    let item = board
        .get_by_id(id)?
        .ok_or_else(|| Error::InvalidArgument(format!("no item with id {id}")))?;

    let mut human = HumanOutput::new(item_line(&item));
    if !item.description().is_empty() {
        human.push_detail(item.description().to_string());
    }
    if let Item::Epic(epic) = &item {
        human.push_detail(format!("subtasks: {:?}", epic.subtask_ids));
        if let (Some(start), Some(end)) = (epic.start_time, epic.end_time) {
            human.push_detail(format!(
                "window: {} .. {} ({}m total)",
                start.format("%Y-%m-%d %H:%M"),
                end.format("%Y-%m-%d %H:%M"),
                epic.duration_minutes
            ));
        }
    }
    if let Item::Subtask(subtask) = &item {
        human.push_detail(format!("epic: {}", subtask.epic_id));
    }
    emit_success(options, "show", &item, Some(&human))
}
