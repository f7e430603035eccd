//! Facade over the store: identity assignment and access history.
//!
//! This is the single surface outer layers consume. Fetching by id records
//! the access; deletions evict from the history so it never references a
//! removed item. Nothing here is thread-safe: concurrent callers must wrap
//! the whole manager in one coarse lock.

use tracing::debug;

use crate::error::Result;
use crate::history::History;
use crate::item::{Item, ItemId};
use crate::store::TaskStore;

/// Monotonic identity source. Ids start at 1; 0 marks an unassigned item.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: ItemId,
}

impl IdGenerator {
    pub fn next(&mut self) -> ItemId {
        self.last += 1;
        self.last
    }

    /// Move past an id restored from a snapshot so fresh ids never collide.
    pub fn advance_past(&mut self, id: ItemId) {
        self.last = self.last.max(id);
    }
}

#[derive(Debug, Default)]
pub struct TaskManager {
    store: TaskStore,
    history: History,
    ids: IdGenerator,
}

impl TaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a fresh identity and insert the item. The returned copy
    /// carries the assigned id.
    pub fn create(&mut self, mut item: Item) -> Result<Item> {
        item.set_id(self.ids.next());
        debug!(id = item.id(), kind = item.kind(), "create");
        self.store.add(item.clone())?;
        Ok(item)
    }

    /// Replace an existing item. Unknown identities are silently ignored.
    pub fn update(&mut self, item: Item) -> Result<()> {
        self.store.update(item)
    }

    /// Fetch by id, recording the access in the history.
    pub fn get_by_id(&mut self, id: ItemId) -> Option<Item> {
        let item = self.store.get_by_id(id)?;
        self.history.touch(id);
        Some(item)
    }

    pub fn all_items(&self) -> Vec<Item> {
        self.store.all_items()
    }

    pub fn plain_tasks(&self) -> Vec<Item> {
        self.store.plain_tasks()
    }

    pub fn subtasks(&self) -> Vec<Item> {
        self.store.subtasks()
    }

    pub fn epics(&self) -> Vec<Item> {
        self.store.epics()
    }

    pub fn subtasks_of(&self, epic_id: ItemId) -> Vec<Item> {
        self.store.subtasks_of(epic_id)
    }

    pub fn prioritized(&self) -> Vec<Item> {
        self.store.prioritized()
    }

    /// Viewed items, oldest first, resolved against the current store.
    pub fn history(&self) -> Vec<Item> {
        self.history
            .ids()
            .into_iter()
            .filter_map(|id| self.store.get_by_id(id))
            .collect()
    }

    /// Viewed ids in history order; used by the persistence layer.
    pub fn history_ids(&self) -> Vec<ItemId> {
        self.history.ids()
    }

    pub fn delete_by_id(&mut self, id: ItemId) -> Vec<Item> {
        let removed = self.store.delete_by_id(id);
        self.evict(&removed);
        removed
    }

    pub fn delete_all_plain(&mut self) -> Vec<Item> {
        let removed = self.store.delete_all_plain();
        self.evict(&removed);
        removed
    }

    pub fn delete_all_subtasks(&mut self) -> Vec<Item> {
        let removed = self.store.delete_all_subtasks();
        self.evict(&removed);
        removed
    }

    pub fn delete_all_epics(&mut self) -> Vec<Item> {
        let removed = self.store.delete_all_epics();
        self.evict(&removed);
        removed
    }

    pub fn delete_all_items(&mut self) -> Vec<Item> {
        let removed = self.store.delete_all_items();
        self.evict(&removed);
        removed
    }

    /// Insert an item that already carries its identity, advancing the
    /// generator past it. Used when replaying a snapshot.
    pub fn restore(&mut self, item: Item) -> Result<()> {
        self.ids.advance_past(item.id());
        self.store.add(item)
    }

    /// Re-touch history entries in their recorded order, skipping ids the
    /// store no longer knows.
    pub fn replay_history(&mut self, ids: &[ItemId]) {
        for &id in ids {
            if self.store.contains(id) {
                self.history.touch(id);
            }
        }
    }

    fn evict(&mut self, removed: &[Item]) {
        for item in removed {
            self.history.remove(item.id());
        }
    }
}
