//! In-memory repository for work items.
//!
//! Owns the three id-keyed collections and keeps every derived view
//! consistent: the subtask/epic link tables, epic rollups, and the
//! priority order. All validation happens before any structural mutation,
//! so a failed call leaves the repository untouched.
//!
//! Collections are keyed by id in ordered maps; because ids are assigned
//! monotonically, iteration order equals creation order.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::item::{EpicItem, Interval, Item, ItemId, Status, SubtaskItem, TaskItem};
use crate::overlap;
use crate::priority::PriorityIndex;
use crate::rollup;

#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: BTreeMap<ItemId, TaskItem>,
    epics: BTreeMap<ItemId, EpicItem>,
    subtasks: BTreeMap<ItemId, SubtaskItem>,
    priority: PriorityIndex,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item that already carries its identity.
    pub fn add(&mut self, item: Item) -> Result<()> {
        match item {
            Item::Task(task) => self.add_task(task),
            Item::Epic(epic) => self.add_epic(epic),
            Item::Subtask(subtask) => self.add_subtask(subtask),
        }
    }

    /// Replace an item in place. Unknown identities are silently ignored;
    /// a subtask whose epic reference changed is ignored too (re-parenting
    /// is not an update).
    pub fn update(&mut self, item: Item) -> Result<()> {
        match item {
            Item::Task(task) => self.update_task(task),
            Item::Epic(epic) => self.update_epic(epic),
            Item::Subtask(subtask) => self.update_subtask(subtask),
        }
    }

    pub fn get_by_id(&self, id: ItemId) -> Option<Item> {
        if let Some(task) = self.tasks.get(&id) {
            return Some(Item::Task(task.clone()));
        }
        if let Some(subtask) = self.subtasks.get(&id) {
            return Some(Item::Subtask(subtask.clone()));
        }
        self.epics.get(&id).map(|epic| Item::Epic(epic.clone()))
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.tasks.contains_key(&id)
            || self.subtasks.contains_key(&id)
            || self.epics.contains_key(&id)
    }

    pub fn all_items(&self) -> Vec<Item> {
        let mut items = Vec::with_capacity(self.tasks.len() + self.subtasks.len() + self.epics.len());
        items.extend(self.tasks.values().cloned().map(Item::Task));
        items.extend(self.subtasks.values().cloned().map(Item::Subtask));
        items.extend(self.epics.values().cloned().map(Item::Epic));
        items
    }

    pub fn plain_tasks(&self) -> Vec<Item> {
        self.tasks.values().cloned().map(Item::Task).collect()
    }

    pub fn subtasks(&self) -> Vec<Item> {
        self.subtasks.values().cloned().map(Item::Subtask).collect()
    }

    pub fn epics(&self) -> Vec<Item> {
        self.epics.values().cloned().map(Item::Epic).collect()
    }

    /// Subtasks owned by an epic, in the epic's link order. Empty for an
    /// unknown epic.
    pub fn subtasks_of(&self, epic_id: ItemId) -> Vec<Item> {
        let Some(epic) = self.epics.get(&epic_id) else {
            return Vec::new();
        };
        epic.subtask_ids
            .iter()
            .filter_map(|id| self.subtasks.get(id))
            .cloned()
            .map(Item::Subtask)
            .collect()
    }

    /// All scheduled (non-epic) items in start-time order, undated last.
    pub fn prioritized(&self) -> Vec<Item> {
        self.priority
            .ids()
            .filter_map(|id| self.get_by_id(id))
            .collect()
    }

    /// Remove an item by id, cascading from an epic to every subtask it
    /// owns. Returns each item actually removed; empty for an unknown id.
    pub fn delete_by_id(&mut self, id: ItemId) -> Vec<Item> {
        if let Some(task) = self.tasks.remove(&id) {
            self.priority.remove(id);
            debug!(id, "task deleted");
            return vec![Item::Task(task)];
        }

        if let Some(subtask) = self.subtasks.remove(&id) {
            self.priority.remove(id);
            let epic_id = subtask.epic_id;
            if let Some(epic) = self.epics.get_mut(&epic_id) {
                epic.subtask_ids.retain(|owned| *owned != id);
            }
            self.rederive_epic(epic_id);
            debug!(id, epic_id, "subtask deleted");
            return vec![Item::Subtask(subtask)];
        }

        if let Some(epic) = self.epics.remove(&id) {
            let mut removed = Vec::with_capacity(1 + epic.subtask_ids.len());
            let owned_ids = epic.subtask_ids.clone();
            removed.push(Item::Epic(epic));
            for owned in owned_ids {
                if let Some(subtask) = self.subtasks.remove(&owned) {
                    self.priority.remove(owned);
                    removed.push(Item::Subtask(subtask));
                }
            }
            debug!(id, cascade = removed.len() - 1, "epic deleted");
            return removed;
        }

        Vec::new()
    }

    pub fn delete_all_plain(&mut self) -> Vec<Item> {
        let removed: Vec<Item> = std::mem::take(&mut self.tasks)
            .into_values()
            .map(Item::Task)
            .collect();
        for item in &removed {
            self.priority.remove(item.id());
        }
        removed
    }

    /// Remove every subtask, resetting each epic to the empty-subtask state.
    pub fn delete_all_subtasks(&mut self) -> Vec<Item> {
        let removed: Vec<Item> = std::mem::take(&mut self.subtasks)
            .into_values()
            .map(Item::Subtask)
            .collect();
        for item in &removed {
            self.priority.remove(item.id());
        }
        for epic in self.epics.values_mut() {
            epic.subtask_ids.clear();
            epic.status = Status::New;
            epic.start_time = None;
            epic.duration_minutes = 0;
            epic.end_time = None;
        }
        removed
    }

    /// Remove every epic; cascades to every subtask.
    pub fn delete_all_epics(&mut self) -> Vec<Item> {
        let mut removed: Vec<Item> = std::mem::take(&mut self.epics)
            .into_values()
            .map(Item::Epic)
            .collect();
        let subtasks: Vec<Item> = std::mem::take(&mut self.subtasks)
            .into_values()
            .map(Item::Subtask)
            .collect();
        for item in &subtasks {
            self.priority.remove(item.id());
        }
        removed.extend(subtasks);
        removed
    }

    pub fn delete_all_items(&mut self) -> Vec<Item> {
        let mut removed = Vec::new();
        removed.extend(std::mem::take(&mut self.tasks).into_values().map(Item::Task));
        removed.extend(
            std::mem::take(&mut self.subtasks)
                .into_values()
                .map(Item::Subtask),
        );
        removed.extend(std::mem::take(&mut self.epics).into_values().map(Item::Epic));
        self.priority.clear();
        removed
    }

    fn add_task(&mut self, task: TaskItem) -> Result<()> {
        if self.tasks.contains_key(&task.id) {
            return Err(Error::DuplicateId(task.id));
        }
        self.ensure_schedule_free(task.interval())?;
        self.priority.insert(task.id, task.start_time);
        debug!(id = task.id, "task added");
        self.tasks.insert(task.id, task);
        Ok(())
    }

    fn add_epic(&mut self, mut epic: EpicItem) -> Result<()> {
        if self.epics.contains_key(&epic.id) {
            return Err(Error::DuplicateId(epic.id));
        }
        // An epic enters with no linked subtasks; every derived field is
        // recomputed from scratch, never taken from the caller.
        epic.subtask_ids.clear();
        epic.status = Status::New;
        epic.start_time = None;
        epic.duration_minutes = 0;
        epic.end_time = None;
        debug!(id = epic.id, "epic added");
        self.epics.insert(epic.id, epic);
        Ok(())
    }

    fn add_subtask(&mut self, subtask: SubtaskItem) -> Result<()> {
        if self.subtasks.contains_key(&subtask.id) {
            return Err(Error::DuplicateId(subtask.id));
        }
        if !self.epics.contains_key(&subtask.epic_id) {
            return Err(Error::MissingEpic(subtask.epic_id));
        }
        self.ensure_schedule_free(subtask.interval())?;

        self.priority.insert(subtask.id, subtask.start_time);
        let (id, epic_id) = (subtask.id, subtask.epic_id);
        self.subtasks.insert(id, subtask);
        if let Some(epic) = self.epics.get_mut(&epic_id) {
            epic.subtask_ids.push(id);
        }
        self.rederive_epic(epic_id);
        debug!(id, epic_id, "subtask added");
        Ok(())
    }

    fn update_task(&mut self, task: TaskItem) -> Result<()> {
        if !self.tasks.contains_key(&task.id) {
            return Ok(());
        }
        self.ensure_schedule_free(task.interval())?;
        self.priority.insert(task.id, task.start_time);
        self.tasks.insert(task.id, task);
        Ok(())
    }

    fn update_subtask(&mut self, subtask: SubtaskItem) -> Result<()> {
        let Some(current) = self.subtasks.get(&subtask.id) else {
            return Ok(());
        };
        if current.epic_id != subtask.epic_id {
            return Ok(());
        }
        self.ensure_schedule_free(subtask.interval())?;

        self.priority.insert(subtask.id, subtask.start_time);
        let epic_id = subtask.epic_id;
        self.subtasks.insert(subtask.id, subtask);
        self.rederive_epic(epic_id);
        Ok(())
    }

    fn update_epic(&mut self, update: EpicItem) -> Result<()> {
        if let Some(epic) = self.epics.get_mut(&update.id) {
            epic.name = update.name;
            epic.description = update.description;
        }
        Ok(())
    }

    /// Overlap gate for non-epic items, run before any mutation. Epics
    /// never produce an interval and so never reach here with a candidate.
    fn ensure_schedule_free(&self, candidate: Option<Interval>) -> Result<()> {
        let intervals = self
            .tasks
            .values()
            .filter_map(TaskItem::interval)
            .chain(self.subtasks.values().filter_map(SubtaskItem::interval));
        overlap::ensure_no_overlap(candidate, intervals)
    }

    /// Recompute an epic's derived status and time window from its
    /// currently linked subtasks.
    fn rederive_epic(&mut self, epic_id: ItemId) {
        let Some(epic) = self.epics.get(&epic_id) else {
            return;
        };
        let owned: Vec<&SubtaskItem> = epic
            .subtask_ids
            .iter()
            .filter_map(|id| self.subtasks.get(id))
            .collect();
        let status = rollup::rollup_status(owned.iter().map(|subtask| subtask.status));
        let window = rollup::rollup_window(owned.iter().copied());

        if let Some(epic) = self.epics.get_mut(&epic_id) {
            epic.status = status;
            epic.start_time = window.start;
            epic.duration_minutes = window.duration_minutes;
            epic.end_time = window.end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
    }

    fn task(id: ItemId) -> Item {
        let mut task = TaskItem::new(format!("task-{id}"), "");
        task.id = id;
        Item::Task(task)
    }

    fn epic(id: ItemId) -> Item {
        let mut epic = EpicItem::new(format!("epic-{id}"), "");
        epic.id = id;
        Item::Epic(epic)
    }

    fn subtask(id: ItemId, epic_id: ItemId) -> SubtaskItem {
        let mut subtask = SubtaskItem::new(format!("sub-{id}"), "", epic_id);
        subtask.id = id;
        subtask
    }

    fn dated_task(id: ItemId, start: DateTime<Utc>, minutes: i64) -> Item {
        let mut task = TaskItem::new(format!("task-{id}"), "").with_schedule(start, minutes);
        task.id = id;
        Item::Task(task)
    }

    fn epic_of(store: &TaskStore, id: ItemId) -> EpicItem {
        match store.get_by_id(id) {
            Some(Item::Epic(epic)) => epic,
            other => panic!("expected epic, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_ids_are_rejected_per_collection() {
        let mut store = TaskStore::new();
        store.add(task(1)).expect("first");
        let err = store.add(task(1)).expect_err("duplicate");
        assert!(matches!(err, Error::DuplicateId(1)));
    }

    #[test]
    fn subtask_requires_existing_epic() {
        let mut store = TaskStore::new();
        let err = store
            .add(Item::Subtask(subtask(2, 99)))
            .expect_err("no epic");
        assert!(matches!(err, Error::MissingEpic(99)));
        assert!(store.get_by_id(2).is_none());
    }

    #[test]
    fn epic_rolls_up_on_subtask_changes() {
        let mut store = TaskStore::new();
        store.add(epic(1)).expect("epic");
        assert_eq!(epic_of(&store, 1).status, Status::New);

        store
            .add(Item::Subtask(subtask(2, 1).with_status(Status::Done)))
            .expect("first subtask");
        assert_eq!(epic_of(&store, 1).status, Status::Done);

        store
            .add(Item::Subtask(subtask(3, 1)))
            .expect("second subtask");
        assert_eq!(epic_of(&store, 1).status, Status::InProgress);

        store
            .update(Item::Subtask(subtask(3, 1).with_status(Status::Done)))
            .expect("update");
        assert_eq!(epic_of(&store, 1).status, Status::Done);

        store.delete_by_id(2);
        store.delete_by_id(3);
        assert_eq!(epic_of(&store, 1).status, Status::New);
        assert!(epic_of(&store, 1).subtask_ids.is_empty());
    }

    #[test]
    fn epic_window_tracks_subtask_schedules() {
        let mut store = TaskStore::new();
        store.add(epic(1)).expect("epic");
        store
            .add(Item::Subtask(subtask(2, 1).with_schedule(at(10, 0), 60)))
            .expect("sub 2");
        store
            .add(Item::Subtask(subtask(3, 1).with_schedule(at(8, 0), 30)))
            .expect("sub 3");

        let epic = epic_of(&store, 1);
        assert_eq!(epic.start_time, Some(at(8, 0)));
        assert_eq!(epic.end_time, Some(at(11, 0)));
        assert_eq!(epic.duration_minutes, 90);

        store.delete_by_id(2);
        let epic = epic_of(&store, 1);
        assert_eq!(epic.start_time, Some(at(8, 0)));
        assert_eq!(epic.end_time, Some(at(8, 30)));
        assert_eq!(epic.duration_minutes, 30);
    }

    #[test]
    fn caller_supplied_epic_fields_are_discarded() {
        let mut store = TaskStore::new();
        let mut forged = EpicItem::new("epic", "");
        forged.id = 1;
        forged.status = Status::Done;
        forged.start_time = Some(at(9, 0));
        forged.duration_minutes = 999;
        forged.subtask_ids = vec![41, 42];
        store.add(Item::Epic(forged)).expect("epic");

        let epic = epic_of(&store, 1);
        assert_eq!(epic.status, Status::New);
        assert_eq!(epic.start_time, None);
        assert_eq!(epic.duration_minutes, 0);
        assert!(epic.subtask_ids.is_empty());
    }

    #[test]
    fn epic_update_touches_only_name_and_description() {
        let mut store = TaskStore::new();
        store.add(epic(1)).expect("epic");
        store
            .add(Item::Subtask(subtask(2, 1).with_status(Status::Done)))
            .expect("sub");

        let mut edit = EpicItem::new("renamed", "new text");
        edit.id = 1;
        edit.status = Status::New;
        edit.subtask_ids = vec![];
        store.update(Item::Epic(edit)).expect("update");

        let epic = epic_of(&store, 1);
        assert_eq!(epic.name, "renamed");
        assert_eq!(epic.description, "new text");
        assert_eq!(epic.status, Status::Done);
        assert_eq!(epic.subtask_ids, vec![2]);
    }

    #[test]
    fn subtask_update_with_changed_epic_is_ignored() {
        let mut store = TaskStore::new();
        store.add(epic(1)).expect("epic 1");
        store.add(epic(2)).expect("epic 2");
        store.add(Item::Subtask(subtask(3, 1))).expect("sub");

        let mut moved = subtask(3, 2).with_status(Status::Done);
        moved.name = "moved".to_string();
        store.update(Item::Subtask(moved)).expect("silently ignored");

        match store.get_by_id(3) {
            Some(Item::Subtask(current)) => {
                assert_eq!(current.epic_id, 1);
                assert_eq!(current.status, Status::New);
            }
            other => panic!("expected subtask, got {other:?}"),
        }
    }

    #[test]
    fn update_unknown_identity_is_a_no_op() {
        let mut store = TaskStore::new();
        store.update(task(7)).expect("no-op");
        assert!(store.get_by_id(7).is_none());
    }

    #[test]
    fn overlapping_schedules_are_rejected() {
        let mut store = TaskStore::new();
        store.add(dated_task(1, at(10, 0), 60)).expect("first");

        let err = store
            .add(dated_task(2, at(10, 30), 45))
            .expect_err("overlap");
        assert!(matches!(err, Error::TimeOverlap(1)));
        assert!(store.get_by_id(2).is_none());

        store
            .add(dated_task(3, at(11, 0), 40))
            .expect("touching is free");
    }

    #[test]
    fn update_revalidates_overlap_excluding_itself() {
        let mut store = TaskStore::new();
        store.add(dated_task(1, at(10, 0), 60)).expect("first");
        store.add(dated_task(2, at(12, 0), 60)).expect("second");

        // Shifting within its own old window is fine.
        store
            .update(dated_task(1, at(10, 15), 30))
            .expect("self excluded");

        // Colliding with the other item is not.
        let err = store
            .update(dated_task(1, at(12, 30), 30))
            .expect_err("overlap");
        assert!(matches!(err, Error::TimeOverlap(2)));
    }

    #[test]
    fn deleting_an_epic_cascades_to_subtasks() {
        let mut store = TaskStore::new();
        store.add(epic(1)).expect("epic");
        store.add(Item::Subtask(subtask(2, 1))).expect("sub 2");
        store.add(Item::Subtask(subtask(3, 1))).expect("sub 3");

        let removed = store.delete_by_id(1);
        let removed_ids: Vec<ItemId> = removed.iter().map(Item::id).collect();
        assert_eq!(removed_ids, vec![1, 2, 3]);
        for id in removed_ids {
            assert!(store.get_by_id(id).is_none());
        }
        assert!(store.prioritized().is_empty());
    }

    #[test]
    fn delete_unknown_returns_empty() {
        let mut store = TaskStore::new();
        assert!(store.delete_by_id(42).is_empty());
    }

    #[test]
    fn delete_all_subtasks_resets_epics() {
        let mut store = TaskStore::new();
        store.add(epic(1)).expect("epic");
        store
            .add(Item::Subtask(
                subtask(2, 1)
                    .with_status(Status::Done)
                    .with_schedule(at(9, 0), 30),
            ))
            .expect("sub");

        let removed = store.delete_all_subtasks();
        assert_eq!(removed.len(), 1);

        let epic = epic_of(&store, 1);
        assert_eq!(epic.status, Status::New);
        assert_eq!(epic.start_time, None);
        assert_eq!(epic.end_time, None);
        assert_eq!(epic.duration_minutes, 0);
        assert!(store.prioritized().is_empty());
    }

    #[test]
    fn delete_all_epics_cascades() {
        let mut store = TaskStore::new();
        store.add(task(1)).expect("task");
        store.add(epic(2)).expect("epic");
        store.add(Item::Subtask(subtask(3, 2))).expect("sub");

        let removed = store.delete_all_epics();
        assert_eq!(removed.len(), 2);
        assert!(store.get_by_id(2).is_none());
        assert!(store.get_by_id(3).is_none());
        assert!(store.get_by_id(1).is_some());
    }

    #[test]
    fn subtasks_of_keeps_link_order() {
        let mut store = TaskStore::new();
        store.add(epic(1)).expect("epic");
        store.add(Item::Subtask(subtask(2, 1))).expect("sub 2");
        store.add(Item::Subtask(subtask(4, 1))).expect("sub 4");
        store.add(Item::Subtask(subtask(3, 1))).expect("sub 3");

        let ids: Vec<ItemId> = store.subtasks_of(1).iter().map(Item::id).collect();
        assert_eq!(ids, vec![2, 4, 3]);
        assert!(store.subtasks_of(99).is_empty());
    }

    #[test]
    fn prioritized_orders_by_start_and_excludes_epics() {
        let mut store = TaskStore::new();
        store.add(epic(1)).expect("epic");
        store
            .add(Item::Subtask(subtask(2, 1).with_schedule(at(14, 0), 30)))
            .expect("sub");
        store.add(dated_task(3, at(9, 0), 30)).expect("dated");
        store.add(task(4)).expect("undated");

        let ids: Vec<ItemId> = store.prioritized().iter().map(Item::id).collect();
        assert_eq!(ids, vec![3, 2, 4]);
    }
}
