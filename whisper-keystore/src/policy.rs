//! Send policy: the four flags the pipeline's gate consults.

use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage;

/// Declarative send/receive policy. All flags default to off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendPolicy {
    /// Sending to a raw public key (no contact record) is rejected.
    #[serde(default)]
    pub contact_required_to_send: bool,
    /// Envelopes to a verified contact must carry a signature.
    #[serde(default)]
    pub require_signature_for_verified: bool,
    /// After identity rotation the prior identity is archived.
    #[serde(default)]
    pub auto_archive_on_rotation: bool,
    /// The signing oracle must perform a user-presence check.
    #[serde(default)]
    pub biometric_gated_signing: bool,
}

impl SendPolicy {
    /// Everything off: send to anyone, sign when asked.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Everything on.
    pub fn strict() -> Self {
        Self {
            contact_required_to_send: true,
            require_signature_for_verified: true,
            auto_archive_on_rotation: true,
            biometric_gated_signing: true,
        }
    }
}

/// Read-mostly policy storage; writes are serialized by the store.
pub trait PolicyStore: Send + Sync {
    fn load(&self) -> Result<SendPolicy, StoreError>;
    fn store(&self, policy: &SendPolicy) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

pub struct InMemoryPolicyStore {
    policy: RwLock<SendPolicy>,
}

impl InMemoryPolicyStore {
    pub fn new(policy: SendPolicy) -> Self {
        Self {
            policy: RwLock::new(policy),
        }
    }
}

impl Default for InMemoryPolicyStore {
    fn default() -> Self {
        Self::new(SendPolicy::default())
    }
}

impl PolicyStore for InMemoryPolicyStore {
    fn load(&self) -> Result<SendPolicy, StoreError> {
        Ok(*self.policy.read().unwrap())
    }

    fn store(&self, policy: &SendPolicy) -> Result<(), StoreError> {
        *self.policy.write().unwrap() = *policy;
        Ok(())
    }
}

/// Policy as a single JSON file. A missing file reads as the default
/// (permissive) policy.
pub struct FilePolicyStore {
    path: PathBuf,
}

impl FilePolicyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PolicyStore for FilePolicyStore {
    fn load(&self) -> Result<SendPolicy, StoreError> {
        if !self.path.exists() {
            return Ok(SendPolicy::default());
        }
        storage::read_json(&self.path)
    }

    fn store(&self, policy: &SendPolicy) -> Result<(), StoreError> {
        storage::write_json_atomic(&self.path, policy)
    }
}
