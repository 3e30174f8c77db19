//! Identity backup: an opaque-blob contract.
//!
//! The blob format belongs to the implementor (platform keychains,
//! password-vault exports, paper codes); the pipeline only ever moves
//! identities in and out through these two calls.

use crate::error::StoreError;
use crate::types::Identity;

pub trait IdentityBackup: Send + Sync {
    /// Serialize and protect an identity under a passphrase.
    fn backup(&self, identity: &Identity, passphrase: &str) -> Result<Vec<u8>, StoreError>;

    /// Recover an identity from a blob produced by `backup`.
    fn restore(&self, blob: &[u8], passphrase: &str) -> Result<Identity, StoreError>;
}
