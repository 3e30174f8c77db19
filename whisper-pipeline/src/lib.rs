//! # Whisper Pipeline
//!
//! The composition root of the Whisper messenger: it wires the stores
//! from `whisper-keystore` to the crypto in `whisper-envelope` and
//! exposes the two operations that matter — [`Whisper::encrypt`] and
//! [`Whisper::decrypt`] — plus policy-aware identity rotation and a
//! priority scheduler for offering work.
//!
//! One `Whisper` value per process; the stores behind it carry their
//! own synchronisation, so the value is `Send + Sync` and operations
//! run concurrently. The only cross-call ordering point is the replay
//! journal commit.
//!
//! ## Quick Start
//!
//! ```
//! use whisper_pipeline::{Recipient, Whisper};
//! use whisper_keystore::IdentityStore;
//!
//! # tokio_test::block_on(async {
//! let whisper = Whisper::in_memory();
//! let me = whisper.identities().create("alice").unwrap();
//!
//! let text = whisper
//!     .encrypt(b"note to self", &me.id, Recipient::RawKey(me.x25519_public), false)
//!     .await
//!     .unwrap();
//! assert!(text.starts_with("whisper1:"));
//!
//! let opened = whisper.decrypt(&text).await.unwrap();
//! assert_eq!(opened.plaintext, b"note to self");
//! # });
//! ```

use std::sync::Arc;

use whisper_keystore::{
    ContactStore, IdentityStore, InMemoryContactStore, InMemoryIdentityStore,
    InMemoryPolicyStore, InMemoryReplayJournal, LocalSigningOracle, PolicyStore, ReplayJournal,
    SigningOracle,
};

mod decrypt;
mod encrypt;
mod error;
mod gate;
mod scheduler;

pub use decrypt::{Attribution, Decrypted};
pub use encrypt::Recipient;
pub use error::{PolicyKind, WhisperError};
pub use scheduler::{Priority, Scheduler};

/// The assembled pipeline.
pub struct Whisper {
    identities: Arc<dyn IdentityStore>,
    contacts: Arc<dyn ContactStore>,
    replay: Arc<dyn ReplayJournal>,
    policy: Arc<dyn PolicyStore>,
    oracle: Arc<dyn SigningOracle>,
}

impl Whisper {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        contacts: Arc<dyn ContactStore>,
        replay: Arc<dyn ReplayJournal>,
        policy: Arc<dyn PolicyStore>,
        oracle: Arc<dyn SigningOracle>,
    ) -> Self {
        Self {
            identities,
            contacts,
            replay,
            policy,
            oracle,
        }
    }

    /// Fully in-memory assembly with the local software signing oracle.
    pub fn in_memory() -> Self {
        let identities: Arc<dyn IdentityStore> = Arc::new(InMemoryIdentityStore::new());
        let oracle = Arc::new(LocalSigningOracle::new(Arc::clone(&identities)));
        Self::new(
            identities,
            Arc::new(InMemoryContactStore::new()),
            Arc::new(InMemoryReplayJournal::new()),
            Arc::new(InMemoryPolicyStore::default()),
            oracle,
        )
    }

    pub fn identities(&self) -> &Arc<dyn IdentityStore> {
        &self.identities
    }

    pub fn contacts(&self) -> &Arc<dyn ContactStore> {
        &self.contacts
    }

    pub fn replay(&self) -> &Arc<dyn ReplayJournal> {
        &self.replay
    }

    pub fn policy(&self) -> &Arc<dyn PolicyStore> {
        &self.policy
    }

    pub(crate) fn oracle(&self) -> &Arc<dyn SigningOracle> {
        &self.oracle
    }

    /// Rotate an identity, honouring `auto_archive_on_rotation`.
    pub async fn rotate_identity(
        &self,
        id: &whisper_keystore::IdentityId,
    ) -> Result<whisper_keystore::Identity, WhisperError> {
        let policy = self.policy.load()?;
        Ok(self.identities.rotate(id, policy.auto_archive_on_rotation)?)
    }
}
