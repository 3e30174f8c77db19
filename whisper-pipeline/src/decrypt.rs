//! The decryption pipeline.
//!
//! One-way state machine per call:
//!
//! ```text
//! Parsed → Fresh → Routed → Unique → Decrypted → Attributed
//! ```
//!
//! each with a single terminal error (`InvalidEnvelope`,
//! `MessageExpired`, `MessageNotForMe`, `ReplayDetected`,
//! `CryptographicFailure` / `InvalidPadding`). The replay commit runs
//! before the AEAD open, so a duplicate never reaches key agreement.

use zeroize::Zeroizing;

use whisper_envelope::wire::Envelope;
use whisper_envelope::{aad, aead, ecdh, fingerprint, kdf, padding, sign};
use whisper_keystore::{
    CommitOutcome, ContactId, ContactStore, IdentityId, IdentityStore, ReplayJournal, TrustLevel,
};

use crate::error::WhisperError;
use crate::Whisper;

/// Who, cryptographically, sent an envelope. Derived from signature
/// verification alone; display names never participate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attribution {
    /// Signature verified against this contact's Ed25519 key.
    Signed {
        contact: ContactId,
        display_name: String,
        trust: TrustLevel,
    },
    /// A valid envelope with a signature no known contact produced.
    SignedUnknown,
    /// No signature present.
    Unsigned,
}

/// A decrypted message with its attribution record. Plaintext is only
/// ever returned alongside a complete attribution.
#[derive(Clone, Debug)]
pub struct Decrypted {
    pub plaintext: Vec<u8>,
    pub attribution: Attribution,
    /// The local identity the envelope was addressed to.
    pub identity: IdentityId,
    pub timestamp: i64,
}

impl Whisper {
    /// Decrypt an envelope found in `text`.
    pub async fn decrypt(&self, text: &str) -> Result<Decrypted, WhisperError> {
        // Parsed
        let envelope = Envelope::parse(text)?;

        // Fresh
        if !self.replay().within_freshness(envelope.timestamp) {
            return Err(WhisperError::MessageExpired);
        }

        // Routed
        let identity = self
            .identities()
            .find_by_rkid(&envelope.rkid)?
            .ok_or(WhisperError::MessageNotForMe)?;

        // Unique (committed before any key agreement; atomic)
        if self.replay().check_and_commit(&envelope.msgid, envelope.timestamp)?
            == CommitOutcome::Duplicate
        {
            tracing::debug!(msgid = %hex::encode(envelope.msgid), "replay detected");
            return Err(WhisperError::ReplayDetected);
        }

        // Decrypted
        let shared = ecdh::agree_static(&identity.static_secret(), &envelope.epk)?;
        let keys = kdf::derive_keys(&shared, &envelope.salt, &envelope.epk, &envelope.msgid)?;

        let sender_fp = fingerprint::sender_binding(&envelope.epk);
        let recipient_fp = identity.fingerprint();
        let aad_bytes = aad::aad_for_envelope(&sender_fp, &recipient_fp, &envelope);

        let padded = Zeroizing::new(
            aead::aead_open(&keys.key, &keys.nonce, &envelope.ciphertext, &aad_bytes)
                .map_err(|_| WhisperError::CryptographicFailure)?,
        );
        let plaintext = padding::unpad(&padded)?;

        // Attributed
        let attribution = match &envelope.signature {
            Some(signature) => {
                let mut signed_data = aad_bytes;
                signed_data.extend_from_slice(&envelope.ciphertext);
                self.attribute_signature(signature, &signed_data)?
            }
            None => Attribution::Unsigned,
        };

        tracing::debug!(
            identity = %identity.id,
            msgid = %hex::encode(envelope.msgid),
            "envelope opened"
        );
        Ok(Decrypted {
            plaintext,
            attribution,
            identity: identity.id,
            timestamp: envelope.timestamp,
        })
    }

    /// Try the signature against every contact with a known Ed25519
    /// key; the first verification wins. No match is still a valid
    /// message, just an unattributed one.
    fn attribute_signature(
        &self,
        signature: &[u8; 64],
        signed_data: &[u8],
    ) -> Result<Attribution, WhisperError> {
        for contact in self.contacts().list()? {
            if let Some(vk) = contact.verifying_key() {
                if sign::verify(signature, signed_data, &vk) {
                    return Ok(Attribution::Signed {
                        contact: contact.id,
                        display_name: contact.display_name,
                        trust: contact.trust,
                    });
                }
            }
        }
        Ok(Attribution::SignedUnknown)
    }
}
