//! Contact store, including the key-rotation rule: a changed public key
//! demotes the contact to unverified and keeps the old key in history.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::Utc;

use whisper_envelope::fingerprint::ct_eq;

use crate::error::StoreError;
use crate::storage;
use crate::types::{Contact, ContactId, KeyHistoryEntry, TrustLevel};

/// What a key observation did to the stored record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyRotationSignal {
    /// Key unchanged; nothing to re-verify.
    Unchanged,
    /// Key replaced; the UI layer must prompt for re-verification.
    NeedsReverification,
}

pub trait ContactStore: Send + Sync {
    fn list(&self) -> Result<Vec<Contact>, StoreError>;
    fn get(&self, id: &ContactId) -> Result<Option<Contact>, StoreError>;
    fn put(&self, contact: &Contact) -> Result<(), StoreError>;

    /// The contact whose current key hashes to `rkid`.
    fn by_rkid(&self, rkid: &[u8; 8]) -> Result<Option<Contact>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .find(|contact| ct_eq(&contact.rkid(), rkid)))
    }

    /// Insert a new contact; an existing id is a duplicate.
    fn add(&self, contact: Contact) -> Result<(), StoreError> {
        if self.get(&contact.id)?.is_some() {
            return Err(StoreError::DuplicateContact(contact.id));
        }
        self.put(&contact)
    }

    /// Overwrite an existing contact.
    fn update(&self, contact: &Contact) -> Result<(), StoreError> {
        if self.get(&contact.id)?.is_none() {
            return Err(StoreError::ContactNotFound(contact.id.clone()));
        }
        let mut contact = contact.clone();
        contact.updated_at = Utc::now();
        self.put(&contact)
    }

    fn set_trust(&self, id: &ContactId, trust: TrustLevel) -> Result<(), StoreError> {
        let mut contact = self
            .get(id)?
            .ok_or_else(|| StoreError::ContactNotFound(id.clone()))?;
        contact.trust = trust;
        contact.updated_at = Utc::now();
        self.put(&contact)
    }

    fn set_blocked(&self, id: &ContactId, blocked: bool) -> Result<(), StoreError> {
        let mut contact = self
            .get(id)?
            .ok_or_else(|| StoreError::ContactNotFound(id.clone()))?;
        contact.blocked = blocked;
        contact.updated_at = Utc::now();
        self.put(&contact)
    }

    /// Record a freshly observed public key for a contact. A changed
    /// X25519 key appends the old one to history, resets trust to
    /// unverified, and bumps the key version.
    fn record_key_rotation(
        &self,
        id: &ContactId,
        new_pk: [u8; 32],
        new_ed_pk: Option<[u8; 32]>,
    ) -> Result<KeyRotationSignal, StoreError> {
        let mut contact = self
            .get(id)?
            .ok_or_else(|| StoreError::ContactNotFound(id.clone()))?;

        if contact.x25519_public == new_pk {
            if let Some(ed) = new_ed_pk {
                if contact.ed25519_public != Some(ed) {
                    contact.ed25519_public = Some(ed);
                    contact.updated_at = Utc::now();
                    self.put(&contact)?;
                }
            }
            return Ok(KeyRotationSignal::Unchanged);
        }

        let now = Utc::now();
        contact.key_history.push(KeyHistoryEntry {
            x25519_public: contact.x25519_public,
            replaced_at: now,
        });
        contact.x25519_public = new_pk;
        if let Some(ed) = new_ed_pk {
            contact.ed25519_public = Some(ed);
        }
        contact.trust = TrustLevel::Unverified;
        contact.key_version += 1;
        contact.updated_at = now;
        self.put(&contact)?;

        tracing::warn!(
            contact = %contact.id,
            key_version = contact.key_version,
            "contact key rotated; trust reset to unverified"
        );
        Ok(KeyRotationSignal::NeedsReverification)
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

pub struct InMemoryContactStore {
    contacts: RwLock<HashMap<String, Contact>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self {
            contacts: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryContactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactStore for InMemoryContactStore {
    fn list(&self) -> Result<Vec<Contact>, StoreError> {
        Ok(self.contacts.read().unwrap().values().cloned().collect())
    }

    fn get(&self, id: &ContactId) -> Result<Option<Contact>, StoreError> {
        Ok(self.contacts.read().unwrap().get(id.as_str()).cloned())
    }

    fn put(&self, contact: &Contact) -> Result<(), StoreError> {
        self.contacts
            .write()
            .unwrap()
            .insert(contact.id.as_str().to_string(), contact.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File backend (one JSON file per contact)
// ---------------------------------------------------------------------------

pub struct FileContactStore {
    dir: PathBuf,
}

impl FileContactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self {
            dir: storage::ensure_dir(dir)?,
        })
    }

    fn path_for(&self, id: &ContactId) -> PathBuf {
        self.dir.join(format!("{}.json", id.as_str()))
    }
}

impl ContactStore for FileContactStore {
    fn list(&self) -> Result<Vec<Contact>, StoreError> {
        storage::read_dir_json(&self.dir)
    }

    fn get(&self, id: &ContactId) -> Result<Option<Contact>, StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        storage::read_json(&path).map(Some)
    }

    fn put(&self, contact: &Contact) -> Result<(), StoreError> {
        storage::write_json_atomic(&self.path_for(&contact.id), contact)
    }
}
