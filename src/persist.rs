//! Snapshot persistence for the task manager.
//!
//! The whole board is one JSON document: every item plus the history id
//! sequence. It is rewritten atomically after each mutating operation and
//! replayed through the facade on load, so the in-memory invariants are
//! re-established rather than trusted from disk.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::item::{Item, ItemId};
use crate::manager::TaskManager;

pub const SNAPSHOT_SCHEMA_VERSION: &str = "taskboard.snapshot.v1";

/// Serialized form of a whole board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub items: Vec<Item>,
    #[serde(default)]
    pub history: Vec<ItemId>,
}

/// A task manager that mirrors itself to a snapshot file.
pub struct FileBackedManager {
    manager: TaskManager,
    path: PathBuf,
}

impl FileBackedManager {
    /// Open a board file, replaying its snapshot if it exists. A missing
    /// file yields an empty board; a malformed one is an error and is
    /// never partially applied.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut manager = TaskManager::new();
        if path.exists() {
            let snapshot: Snapshot = read_json(&path)?;
            if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
                warn!(
                    found = %snapshot.schema_version,
                    expected = SNAPSHOT_SCHEMA_VERSION,
                    "unexpected snapshot schema version"
                );
            }
            replay(&mut manager, snapshot)?;
            debug!(path = %path.display(), "board loaded");
        }
        Ok(Self { manager, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn create(&mut self, item: Item) -> Result<Item> {
        let created = self.manager.create(item)?;
        self.save()?;
        Ok(created)
    }

    pub fn update(&mut self, item: Item) -> Result<()> {
        self.manager.update(item)?;
        self.save()
    }

    /// Fetch by id. Recording the access changes the history, so a hit is
    /// followed by a save.
    pub fn get_by_id(&mut self, id: ItemId) -> Result<Option<Item>> {
        let item = self.manager.get_by_id(id);
        if item.is_some() {
            self.save()?;
        }
        Ok(item)
    }

    pub fn all_items(&self) -> Vec<Item> {
        self.manager.all_items()
    }

    pub fn plain_tasks(&self) -> Vec<Item> {
        self.manager.plain_tasks()
    }

    pub fn subtasks(&self) -> Vec<Item> {
        self.manager.subtasks()
    }

    pub fn epics(&self) -> Vec<Item> {
        self.manager.epics()
    }

    pub fn subtasks_of(&self, epic_id: ItemId) -> Vec<Item> {
        self.manager.subtasks_of(epic_id)
    }

    pub fn prioritized(&self) -> Vec<Item> {
        self.manager.prioritized()
    }

    pub fn history(&self) -> Vec<Item> {
        self.manager.history()
    }

    pub fn delete_by_id(&mut self, id: ItemId) -> Result<Vec<Item>> {
        let removed = self.manager.delete_by_id(id);
        self.save()?;
        Ok(removed)
    }

    pub fn delete_all_plain(&mut self) -> Result<Vec<Item>> {
        let removed = self.manager.delete_all_plain();
        self.save()?;
        Ok(removed)
    }

    pub fn delete_all_subtasks(&mut self) -> Result<Vec<Item>> {
        let removed = self.manager.delete_all_subtasks();
        self.save()?;
        Ok(removed)
    }

    pub fn delete_all_epics(&mut self) -> Result<Vec<Item>> {
        let removed = self.manager.delete_all_epics();
        self.save()?;
        Ok(removed)
    }

    pub fn delete_all_items(&mut self) -> Result<Vec<Item>> {
        let removed = self.manager.delete_all_items();
        self.save()?;
        Ok(removed)
    }

    pub fn save(&self) -> Result<()> {
        let snapshot = Snapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            items: self.manager.all_items(),
            history: self.manager.history_ids(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        write_atomic(&self.path, json.as_bytes())
    }
}

/// Rebuild a manager from a snapshot. Epics go first so subtasks find
/// their owner; the history is re-touched in its recorded order.
fn replay(manager: &mut TaskManager, snapshot: Snapshot) -> Result<()> {
    let Snapshot { items, history, .. } = snapshot;
    let (epics, others): (Vec<Item>, Vec<Item>) =
        items.into_iter().partition(Item::is_epic);
    for item in epics {
        manager.restore(item)?;
    }
    for item in others {
        manager.restore(item)?;
    }
    manager.replay_history(&history);
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write data atomically using temp file + rename, so readers never see a
/// partial snapshot.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}
