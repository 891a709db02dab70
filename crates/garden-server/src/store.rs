//! Persistence collaborator for flowers and messages.
//!
//! Handlers only see [`GardenStore`]. [`MemoryStore`] keeps rows in memory,
//! optionally mirrors them to a JSON file, and applies a row-level
//! [`WritePolicy`] the way a hosted database policy would: a denied update
//! affects zero rows instead of failing loudly.

use crate::wilt::wilt_by_age;
use chrono::{Duration, Utc};
use garden_core::constants::WILT_AFTER_HOURS;
use garden_core::{FlowerRecord, MessageRecord};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::broadcast;

const INSERT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("write blocked by policy")]
    Denied,
    #[error("store lock poisoned")]
    Poisoned,
    #[error("persisting {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("encoding snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Row-level write rules.
#[derive(Clone, Copy, Debug)]
pub struct WritePolicy {
    /// Updates to an owned flower affect zero rows unless the actor is the owner.
    pub owner_only_updates: bool,
    /// Message inserts are rejected.
    pub messages_read_only: bool,
}

impl Default for WritePolicy {
    fn default() -> Self {
        Self {
            owner_only_updates: true,
            messages_read_only: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FlowerChange {
    Message(Option<String>),
    Revive { at: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum UpdateOutcome {
    Updated(FlowerRecord),
    NotFound,
    /// The row exists but the policy let zero rows through.
    Denied,
}

/// Broadcast to realtime subscribers after every successful insert.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "table", content = "row", rename_all = "lowercase")]
pub enum InsertEvent {
    Flowers(FlowerRecord),
    Messages(MessageRecord),
}

pub trait GardenStore: Send + Sync {
    /// Newest first, at most `limit` rows.
    fn list_recent_flowers(&self, limit: usize) -> Result<Vec<FlowerRecord>, StoreError>;
    fn list_recent_messages(&self, limit: usize) -> Result<Vec<MessageRecord>, StoreError>;
    fn insert_flower(&self, row: FlowerRecord) -> Result<FlowerRecord, StoreError>;
    fn insert_message(&self, row: MessageRecord) -> Result<MessageRecord, StoreError>;
    fn update_flower(
        &self,
        id: &str,
        change: FlowerChange,
        actor: Option<&str>,
    ) -> Result<UpdateOutcome, StoreError>;
    fn subscribe_inserts(&self) -> broadcast::Receiver<InsertEvent>;
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    flowers: Vec<FlowerRecord>,
    #[serde(default)]
    messages: Vec<MessageRecord>,
}

pub struct MemoryStore {
    // rows are kept in insertion order (oldest first)
    rows: Mutex<Snapshot>,
    policy: WritePolicy,
    // None keeps every flower standing until a row says otherwise
    wilt_after: Option<Duration>,
    path: Option<PathBuf>,
    inserts: broadcast::Sender<InsertEvent>,
}

impl MemoryStore {
    pub fn in_memory(policy: WritePolicy) -> Self {
        let (inserts, _) = broadcast::channel(INSERT_CHANNEL_CAPACITY);
        Self {
            rows: Mutex::new(Snapshot::default()),
            policy,
            wilt_after: Some(Duration::hours(WILT_AFTER_HOURS)),
            path: None,
            inserts,
        }
    }

    /// Untended time after which a flower is served wilted.
    pub fn with_wilt_after(mut self, after: Option<Duration>) -> Self {
        self.wilt_after = after;
        self
    }

    /// Load rows from `path` when it exists; every later write is mirrored there.
    pub fn open(path: Option<PathBuf>, policy: WritePolicy) -> Result<Self, StoreError> {
        let mut store = Self::in_memory(policy);
        if let Some(path) = path {
            let snapshot = load_snapshot(&path)?;
            log::info!(
                "[store] loaded {} flowers and {} messages from {}",
                snapshot.flowers.len(),
                snapshot.messages.len(),
                path.display()
            );
            store.rows = Mutex::new(snapshot);
            store.path = Some(path);
        }
        Ok(store)
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    fn lock(&self) -> Result<MutexGuard<'_, Snapshot>, StoreError> {
        self.rows.lock().map_err(|_| StoreError::Poisoned)
    }

    fn persist(&self, rows: &Snapshot) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(rows)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })
    }

    fn derive_wilting(&self, row: &mut FlowerRecord) {
        if let Some(after) = self.wilt_after {
            wilt_by_age(row, Utc::now(), after);
        }
    }

    fn publish(&self, event: InsertEvent) {
        // no subscribers is not an error
        _ = self.inserts.send(event);
    }
}

fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
    match fs::read(path) {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Snapshot::default()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Snapshot::default()),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn newest_first<T: Clone>(rows: &[T], limit: usize) -> Vec<T> {
    rows.iter().rev().take(limit).cloned().collect()
}

impl GardenStore for MemoryStore {
    fn list_recent_flowers(&self, limit: usize) -> Result<Vec<FlowerRecord>, StoreError> {
        let mut rows = newest_first(&self.lock()?.flowers, limit);
        for row in &mut rows {
            self.derive_wilting(row);
        }
        Ok(rows)
    }

    fn list_recent_messages(&self, limit: usize) -> Result<Vec<MessageRecord>, StoreError> {
        Ok(newest_first(&self.lock()?.messages, limit))
    }

    fn insert_flower(&self, row: FlowerRecord) -> Result<FlowerRecord, StoreError> {
        {
            let mut rows = self.lock()?;
            rows.flowers.push(row.clone());
            if let Err(e) = self.persist(&rows) {
                rows.flowers.pop();
                return Err(e);
            }
        }
        self.publish(InsertEvent::Flowers(row.clone()));
        Ok(row)
    }

    fn insert_message(&self, row: MessageRecord) -> Result<MessageRecord, StoreError> {
        if self.policy.messages_read_only {
            return Err(StoreError::Denied);
        }
        {
            let mut rows = self.lock()?;
            rows.messages.push(row.clone());
            if let Err(e) = self.persist(&rows) {
                rows.messages.pop();
                return Err(e);
            }
        }
        self.publish(InsertEvent::Messages(row.clone()));
        Ok(row)
    }

    fn update_flower(
        &self,
        id: &str,
        change: FlowerChange,
        actor: Option<&str>,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut rows = self.lock()?;
        let Some(index) = rows.flowers.iter().position(|f| f.id == id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        let owner = rows.flowers[index].user_id.as_deref();
        if self.policy.owner_only_updates && owner.is_some() && owner != actor {
            return Ok(UpdateOutcome::Denied);
        }
        let previous = rows.flowers[index].clone();
        {
            let row = &mut rows.flowers[index];
            match change {
                FlowerChange::Message(message) => row.message = message,
                FlowerChange::Revive { at } => {
                    row.wilted = Some(false);
                    row.revived_at = Some(at);
                }
            }
        }
        if let Err(e) = self.persist(&rows) {
            rows.flowers[index] = previous;
            return Err(e);
        }
        let mut updated = rows.flowers[index].clone();
        self.derive_wilting(&mut updated);
        Ok(UpdateOutcome::Updated(updated))
    }

    fn subscribe_inserts(&self) -> broadcast::Receiver<InsertEvent> {
        self.inserts.subscribe()
    }
}
