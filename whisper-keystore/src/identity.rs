//! Identity store: the identities this installation owns.
//!
//! Backends implement plain record storage; the lifecycle operations
//! (create, rotate, archive) and the rkid lookup are provided on the
//! trait in terms of it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use whisper_envelope::fingerprint::ct_eq;

use crate::error::StoreError;
use crate::storage;
use crate::types::{Identity, IdentityId, IdentityStatus};

pub trait IdentityStore: Send + Sync {
    fn list(&self) -> Result<Vec<Identity>, StoreError>;
    fn get(&self, id: &IdentityId) -> Result<Option<Identity>, StoreError>;
    fn put(&self, identity: &Identity) -> Result<(), StoreError>;

    /// The identity whose rkid matches, regardless of status: archived
    /// and rotated identities still decrypt. Comparison is over the
    /// canonical 8-byte rkid, constant-time.
    fn find_by_rkid(&self, rkid: &[u8; 8]) -> Result<Option<Identity>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .find(|identity| ct_eq(&identity.rkid(), rkid)))
    }

    /// The most recently created ACTIVE identity.
    fn active(&self) -> Result<Option<Identity>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|identity| identity.status == IdentityStatus::Active)
            .max_by_key(|identity| identity.created_at))
    }

    /// Generate and persist a fresh identity.
    fn create(&self, name: &str) -> Result<Identity, StoreError> {
        let identity = Identity::generate(name);
        self.put(&identity)?;
        tracing::debug!(id = %identity.id, name, "identity created");
        Ok(identity)
    }

    /// Rotate an ACTIVE identity: a new identity with fresh keys and an
    /// incremented key version takes over; the old one becomes ROTATED,
    /// or ARCHIVED when `archive_old` is set. Both remain decryptable.
    fn rotate(&self, id: &IdentityId, archive_old: bool) -> Result<Identity, StoreError> {
        let mut old = self
            .get(id)?
            .ok_or_else(|| StoreError::IdentityNotFound(id.clone()))?;
        if old.status != IdentityStatus::Active {
            return Err(StoreError::NotActive(id.clone()));
        }

        let mut replacement = Identity::generate(old.name.clone());
        replacement.key_version = old.key_version + 1;

        old.status = if archive_old {
            IdentityStatus::Archived
        } else {
            IdentityStatus::Rotated
        };
        self.put(&old)?;
        self.put(&replacement)?;
        tracing::debug!(
            old = %old.id,
            new = %replacement.id,
            key_version = replacement.key_version,
            "identity rotated"
        );
        Ok(replacement)
    }

    /// Archive an identity: decrypt-only from here on.
    fn archive(&self, id: &IdentityId) -> Result<(), StoreError> {
        let mut identity = self
            .get(id)?
            .ok_or_else(|| StoreError::IdentityNotFound(id.clone()))?;
        identity.status = IdentityStatus::Archived;
        self.put(&identity)
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

pub struct InMemoryIdentityStore {
    identities: RwLock<HashMap<String, Identity>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self {
            identities: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn list(&self) -> Result<Vec<Identity>, StoreError> {
        Ok(self.identities.read().unwrap().values().cloned().collect())
    }

    fn get(&self, id: &IdentityId) -> Result<Option<Identity>, StoreError> {
        Ok(self.identities.read().unwrap().get(id.as_str()).cloned())
    }

    fn put(&self, identity: &Identity) -> Result<(), StoreError> {
        self.identities
            .write()
            .unwrap()
            .insert(identity.id.as_str().to_string(), identity.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File backend (one JSON file per identity)
// ---------------------------------------------------------------------------

pub struct FileIdentityStore {
    dir: PathBuf,
}

impl FileIdentityStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self {
            dir: storage::ensure_dir(dir)?,
        })
    }

    fn path_for(&self, id: &IdentityId) -> PathBuf {
        self.dir.join(format!("{}.json", id.as_str()))
    }
}

impl IdentityStore for FileIdentityStore {
    fn list(&self) -> Result<Vec<Identity>, StoreError> {
        storage::read_dir_json(&self.dir)
    }

    fn get(&self, id: &IdentityId) -> Result<Option<Identity>, StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        storage::read_json(&path).map(Some)
    }

    fn put(&self, identity: &Identity) -> Result<(), StoreError> {
        storage::write_json_atomic(&self.path_for(&identity.id), identity)
    }
}
