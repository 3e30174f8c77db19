//! The encryption pipeline.
//!
//! policy gate → pad → ephemeral keypair → DH → derive → AAD → seal →
//! sign (via the oracle) → serialize. Every secret minted along the way
//! (ephemeral secret, shared secret, AEAD key, padded plaintext) lives
//! in a drop-zeroized container, so early returns leave nothing behind.

use whisper_envelope::wire::{generate_msgid, generate_salt, Envelope, FLAG_SIGNED};
use whisper_envelope::{aad, aead, ecdh, fingerprint, kdf, padding};
use whisper_keystore::{
    Contact, IdentityId, IdentityStore, PolicyStore, SigningOracle, SigningOutcome,
};

use crate::error::{PolicyKind, WhisperError};
use crate::gate;
use crate::Whisper;

/// Where an envelope is going: a stored contact, or a bare public key
/// (permitted only while `contact_required_to_send` is off).
#[derive(Clone, Debug)]
pub enum Recipient {
    Contact(Contact),
    RawKey([u8; 32]),
}

impl Recipient {
    pub fn public_key(&self) -> [u8; 32] {
        match self {
            Recipient::Contact(contact) => contact.x25519_public,
            Recipient::RawKey(pk) => *pk,
        }
    }
}

impl Whisper {
    /// Encrypt `plaintext` from `sender` to `recipient`, returning the
    /// single-line envelope text.
    pub async fn encrypt(
        &self,
        plaintext: &[u8],
        sender: &IdentityId,
        recipient: Recipient,
        sign: bool,
    ) -> Result<String, WhisperError> {
        let policy = self.policy().load()?;
        let sender = self
            .identities()
            .get(sender)?
            .ok_or(WhisperError::KeyNotFound)?;

        gate::check_send(&policy, &sender, &recipient, sign)?;

        let padded = padding::pad(plaintext)?;

        let (esk, epk) = ecdh::generate_ephemeral();
        let salt = generate_salt()?;
        let msgid = generate_msgid()?;
        let timestamp = chrono::Utc::now().timestamp();

        let recipient_pk = recipient.public_key();
        let shared = ecdh::agree_ephemeral(esk, &recipient_pk)?;
        let keys = kdf::derive_keys(&shared, &salt, &epk, &msgid)?;

        let rkid = fingerprint::rkid(&recipient_pk);
        let flags = if sign { FLAG_SIGNED } else { 0 };
        let sender_fp = fingerprint::sender_binding(&epk);
        let recipient_fp = fingerprint::fingerprint(&recipient_pk);

        let aad_bytes = aad::canonical_aad(
            &sender_fp,
            &recipient_fp,
            &rkid,
            flags,
            &epk,
            &salt,
            &msgid,
            timestamp,
        );
        let ciphertext = aead::aead_seal(&keys.key, &keys.nonce, &padded, &aad_bytes)?;

        let signature = if sign {
            let mut signed_data = aad_bytes;
            signed_data.extend_from_slice(&ciphertext);
            match self.oracle().sign(&signed_data, &sender.id) {
                SigningOutcome::Signed(sig) => Some(sig),
                SigningOutcome::Cancelled | SigningOutcome::Failed => {
                    tracing::debug!(sender = %sender.id, "signing oracle refused");
                    return Err(WhisperError::BiometricAuthenticationFailed);
                }
                SigningOutcome::Unavailable => {
                    return Err(if policy.biometric_gated_signing {
                        WhisperError::PolicyViolation(PolicyKind::BiometricRequired)
                    } else {
                        WhisperError::KeyNotFound
                    });
                }
            }
        } else {
            None
        };

        let envelope = Envelope {
            rkid,
            flags,
            epk,
            salt,
            msgid,
            timestamp,
            ciphertext,
            signature,
        };
        tracing::debug!(
            sender = %sender.id,
            msgid = %hex::encode(msgid),
            signed = sign,
            "envelope sealed"
        );
        Ok(envelope.encode())
    }
}
