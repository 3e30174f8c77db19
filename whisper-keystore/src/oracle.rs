//! Signing oracle: the seam behind which the Ed25519 secret may live.
//!
//! A production oracle can gate signing behind user presence and take
//! arbitrarily long; it reports cancellation as an outcome, never as a
//! panic. The trait is synchronous by the same rule the stores follow;
//! async callers wrap it at their layer.

use std::sync::Arc;

use crate::identity::IdentityStore;
use crate::types::IdentityId;

/// Result of asking the oracle for a signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SigningOutcome {
    /// A detached Ed25519 signature over the submitted data.
    Signed([u8; 64]),
    /// The user declined or the presence check was dismissed.
    Cancelled,
    /// The presence check ran and failed.
    Failed,
    /// The referenced key has no signing capability here.
    Unavailable,
}

pub trait SigningOracle: Send + Sync {
    fn sign(&self, data: &[u8], key_ref: &IdentityId) -> SigningOutcome;
}

/// Software oracle: signs immediately with the identity's materialised
/// Ed25519 secret. No presence check; installations that want one plug
/// in their own oracle.
pub struct LocalSigningOracle {
    identities: Arc<dyn IdentityStore>,
}

impl LocalSigningOracle {
    pub fn new(identities: Arc<dyn IdentityStore>) -> Self {
        Self { identities }
    }
}

impl SigningOracle for LocalSigningOracle {
    fn sign(&self, data: &[u8], key_ref: &IdentityId) -> SigningOutcome {
        let identity = match self.identities.get(key_ref) {
            Ok(Some(identity)) => identity,
            Ok(None) | Err(_) => return SigningOutcome::Unavailable,
        };
        match identity.signing_key() {
            Some(sk) => SigningOutcome::Signed(whisper_envelope::sign::sign(data, &sk)),
            None => SigningOutcome::Unavailable,
        }
    }
}
