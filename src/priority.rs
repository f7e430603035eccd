//! Start-time ordering for scheduled items.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::item::ItemId;

/// Sort key: defined starts ascending, undated items after every dated one,
/// identity as the deterministic final tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PriorityKey {
    start: Option<DateTime<Utc>>,
    id: ItemId,
}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.start, other.start) {
            (Some(left), Some(right)) => left.cmp(&right).then_with(|| self.id.cmp(&other.id)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.id.cmp(&other.id),
        }
    }
}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordered index over every non-epic item, keyed by start time.
///
/// Removal by identity goes through a side map so the ordered set never
/// has to be scanned.
#[derive(Debug, Default)]
pub struct PriorityIndex {
    ordered: BTreeSet<PriorityKey>,
    by_id: HashMap<ItemId, PriorityKey>,
}

impl PriorityIndex {
    /// Insert or re-key an item. An existing entry for the same identity is
    /// replaced, so re-scheduling is a single call.
    pub fn insert(&mut self, id: ItemId, start: Option<DateTime<Utc>>) {
        self.remove(id);
        let key = PriorityKey { start, id };
        self.ordered.insert(key);
        self.by_id.insert(id, key);
    }

    pub fn remove(&mut self, id: ItemId) {
        if let Some(key) = self.by_id.remove(&id) {
            self.ordered.remove(&key);
        }
    }

    pub fn clear(&mut self) {
        self.ordered.clear();
        self.by_id.clear();
    }

    /// Ids in schedule order.
    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.ordered.iter().map(|key| key.id)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
