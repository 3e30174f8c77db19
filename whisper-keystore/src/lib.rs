//! # Whisper Keystore
//!
//! The stateful half of the Whisper messenger: identities you own,
//! contacts you talk to, the replay journal, the send policy, and the
//! signing oracle. The pipeline crate borrows all of it read-mostly
//! through the store traits defined here; every store ships an
//! in-memory backend (testing, ephemeral use) and a JSON-file backend
//! (a personal on-disk home directory).
//!
//! ## Quick Start
//!
//! ```
//! use whisper_keystore::{ContactStore, IdentityStore, InMemoryContactStore,
//!     InMemoryIdentityStore, contact_from_bundle, build_bundle};
//!
//! let identities = InMemoryIdentityStore::new();
//! let me = identities.create("alice").unwrap();
//!
//! // Share a bundle, become someone's contact.
//! let bundle = build_bundle(&me);
//! let contacts = InMemoryContactStore::new();
//! contacts.add(contact_from_bundle(&bundle).unwrap()).unwrap();
//!
//! let peer = contacts.by_rkid(&me.rkid()).unwrap().unwrap();
//! assert_eq!(peer.display_name, "alice");
//! ```

pub mod backup;
pub mod contact;
pub mod identity;
pub mod oracle;
pub mod policy;
pub mod replay;
pub mod sas;
pub mod types;

mod error;
mod storage;

pub use backup::IdentityBackup;
pub use contact::{ContactStore, FileContactStore, InMemoryContactStore, KeyRotationSignal};
pub use error::StoreError;
pub use identity::{FileIdentityStore, IdentityStore, InMemoryIdentityStore};
pub use oracle::{LocalSigningOracle, SigningOracle, SigningOutcome};
pub use policy::{FilePolicyStore, InMemoryPolicyStore, PolicyStore, SendPolicy};
pub use replay::{
    CommitOutcome, FileReplayJournal, InMemoryReplayJournal, ReplayJournal,
    FRESHNESS_WINDOW_SECS, RETENTION_SECS,
};
pub use sas::{sas_words, SAS_WORD_COUNT};
pub use types::{
    build_bundle, contact_from_bundle, Contact, ContactId, Identity, IdentityId, IdentityStatus,
    KeyBundle, KeyHistoryEntry, TrustLevel,
};
