//! Replay and freshness guard.
//!
//! A message id is accepted exactly once; the commit is serialized
//! behind a mutex, so among concurrent callers one sees `Unique` and
//! every other sees `Duplicate`. Entries are evicted strictly by age,
//! and only once they are older than twice the freshness window, so a
//! late arrival inside the window always collides with its duplicate.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage;

/// Acceptable |now - ts| skew, in seconds (48 hours).
pub const FRESHNESS_WINDOW_SECS: i64 = 48 * 3600;

/// Journal retention: twice the window.
pub const RETENTION_SECS: i64 = 2 * FRESHNESS_WINDOW_SECS;

/// Outcome of a commit attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    Unique,
    Duplicate,
}

/// The replay journal the decryption pipeline consults.
pub trait ReplayJournal: Send + Sync {
    /// Atomically record `msgid` as seen. Linearizable: exactly one
    /// caller per msgid ever receives `Unique`.
    fn check_and_commit(&self, msgid: &[u8; 16], ts: i64) -> Result<CommitOutcome, StoreError>;

    /// Whether an envelope timestamp is inside the freshness window.
    fn within_freshness(&self, ts: i64) -> bool {
        (Utc::now().timestamp() - ts).abs() <= FRESHNESS_WINDOW_SECS
    }

    /// Drop entries whose first-seen time is older than the retention
    /// horizon. Returns how many were evicted.
    fn evict_expired(&self, now: i64) -> Result<usize, StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory journal
// ---------------------------------------------------------------------------

/// Map of msgid to first-seen wall-clock seconds, behind one mutex.
pub struct InMemoryReplayJournal {
    seen: Mutex<HashMap<[u8; 16], i64>>,
}

impl InMemoryReplayJournal {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryReplayJournal {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayJournal for InMemoryReplayJournal {
    fn check_and_commit(&self, msgid: &[u8; 16], _ts: i64) -> Result<CommitOutcome, StoreError> {
        let now = Utc::now().timestamp();
        let mut seen = self.seen.lock().unwrap();
        seen.retain(|_, first_seen| now - *first_seen <= RETENTION_SECS);
        match seen.entry(*msgid) {
            Entry::Occupied(_) => Ok(CommitOutcome::Duplicate),
            Entry::Vacant(slot) => {
                slot.insert(now);
                Ok(CommitOutcome::Unique)
            }
        }
    }

    fn evict_expired(&self, now: i64) -> Result<usize, StoreError> {
        let mut seen = self.seen.lock().unwrap();
        let before = seen.len();
        seen.retain(|_, first_seen| now - *first_seen <= RETENTION_SECS);
        Ok(before - seen.len())
    }
}

// ---------------------------------------------------------------------------
// File-backed journal
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Default)]
struct JournalFile {
    seen: HashMap<String, i64>,
}

/// Journal persisted as one JSON file, so replay protection survives a
/// restart. The in-memory map is authoritative; the file trails it by
/// one atomic write per commit.
pub struct FileReplayJournal {
    path: PathBuf,
    seen: Mutex<HashMap<[u8; 16], i64>>,
}

impl FileReplayJournal {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut seen = HashMap::new();
        if path.exists() {
            let file: JournalFile = storage::read_json(&path)?;
            for (key, first_seen) in file.seen {
                let bytes = hex::decode(&key)
                    .map_err(|e| StoreError::Storage(format!("journal key: {}", e)))?;
                let msgid: [u8; 16] = bytes
                    .try_into()
                    .map_err(|_| StoreError::Storage("journal key length".into()))?;
                seen.insert(msgid, first_seen);
            }
        }
        Ok(Self {
            path,
            seen: Mutex::new(seen),
        })
    }

    fn persist(&self, seen: &HashMap<[u8; 16], i64>) -> Result<(), StoreError> {
        let file = JournalFile {
            seen: seen
                .iter()
                .map(|(msgid, first_seen)| (hex::encode(msgid), *first_seen))
                .collect(),
        };
        storage::write_json_atomic(&self.path, &file)
    }
}

impl ReplayJournal for FileReplayJournal {
    fn check_and_commit(&self, msgid: &[u8; 16], _ts: i64) -> Result<CommitOutcome, StoreError> {
        let now = Utc::now().timestamp();
        let mut seen = self.seen.lock().unwrap();
        seen.retain(|_, first_seen| now - *first_seen <= RETENTION_SECS);
        if seen.contains_key(msgid) {
            return Ok(CommitOutcome::Duplicate);
        }
        seen.insert(*msgid, now);
        self.persist(&seen)?;
        tracing::debug!(msgid = %hex::encode(msgid), "replay journal commit");
        Ok(CommitOutcome::Unique)
    }

    fn evict_expired(&self, now: i64) -> Result<usize, StoreError> {
        let mut seen = self.seen.lock().unwrap();
        let before = seen.len();
        seen.retain(|_, first_seen| now - *first_seen <= RETENTION_SECS);
        if seen.len() != before {
            self.persist(&seen)?;
        }
        Ok(before - seen.len())
    }
}
