//! Core types: identities you own, contacts you talk to, and the
//! shareable key bundle that turns one into the other.

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;

use whisper_envelope::fingerprint::{
    fingerprint, rkid_of_fingerprint, short_fingerprint, FINGERPRINT_BYTES, RKID_BYTES,
};
use whisper_envelope::{SigningKey, StaticSecret, VerifyingKey, X25519PublicKey};

use crate::error::StoreError;
use crate::sas::{sas_words, SAS_WORD_COUNT};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Stable identity id (hex-encoded 128-bit random value).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityId(String);

impl IdentityId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contact id. When built from a bundle it carries the peer's own
/// identity id, so re-imports land on the same record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactId(String);

impl ContactId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Status and trust
// ---------------------------------------------------------------------------

/// Identity lifecycle.
///
/// ```text
/// ACTIVE ──rotate──→ ROTATED (decrypt-only)
///    │                  │
///    └──archive──→ ARCHIVED (decrypt-only)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityStatus {
    Active,
    Archived,
    Rotated,
}

impl IdentityStatus {
    /// Whether this identity may originate new envelopes.
    pub fn can_send(&self) -> bool {
        matches!(self, IdentityStatus::Active)
    }
}

impl fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityStatus::Active => write!(f, "ACTIVE"),
            IdentityStatus::Archived => write!(f, "ARCHIVED"),
            IdentityStatus::Rotated => write!(f, "ROTATED"),
        }
    }
}

/// How far out-of-band verification of a contact has come.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustLevel {
    Unverified,
    Verified,
    Revoked,
}

impl TrustLevel {
    pub fn label(&self) -> &'static str {
        match self {
            TrustLevel::Unverified => "Unverified",
            TrustLevel::Verified => "Verified",
            TrustLevel::Revoked => "Revoked",
        }
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// An ownership root: name plus the keypairs that speak for it.
///
/// The Ed25519 secret may be absent while its public half is present;
/// that models a signing key held behind an external oracle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub name: String,
    #[serde(with = "hex32")]
    pub x25519_secret: [u8; 32],
    #[serde(with = "hex32")]
    pub x25519_public: [u8; 32],
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hex32_opt")]
    pub ed25519_secret: Option<[u8; 32]>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hex32_opt")]
    pub ed25519_public: Option<[u8; 32]>,
    pub created_at: DateTime<Utc>,
    pub status: IdentityStatus,
    pub key_version: u32,
}

impl Identity {
    /// Generate a fresh identity with both keypairs.
    pub fn generate(name: impl Into<String>) -> Self {
        let x_secret = StaticSecret::random_from_rng(OsRng);
        let x_public = X25519PublicKey::from(&x_secret);
        let signing = SigningKey::generate(&mut OsRng);

        Self {
            id: IdentityId::generate(),
            name: name.into(),
            x25519_secret: x_secret.to_bytes(),
            x25519_public: *x_public.as_bytes(),
            ed25519_secret: Some(signing.to_bytes()),
            ed25519_public: Some(signing.verifying_key().to_bytes()),
            created_at: Utc::now(),
            status: IdentityStatus::Active,
            key_version: 1,
        }
    }

    pub fn static_secret(&self) -> StaticSecret {
        StaticSecret::from(self.x25519_secret)
    }

    pub fn signing_key(&self) -> Option<SigningKey> {
        self.ed25519_secret.as_ref().map(SigningKey::from_bytes)
    }

    pub fn verifying_key(&self) -> Option<VerifyingKey> {
        self.ed25519_public
            .as_ref()
            .and_then(|pk| VerifyingKey::from_bytes(pk).ok())
    }

    pub fn fingerprint(&self) -> [u8; FINGERPRINT_BYTES] {
        fingerprint(&self.x25519_public)
    }

    pub fn rkid(&self) -> [u8; RKID_BYTES] {
        rkid_of_fingerprint(&self.fingerprint())
    }
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// A prior public key, kept when a contact rotates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyHistoryEntry {
    #[serde(with = "hex32")]
    pub x25519_public: [u8; 32],
    pub replaced_at: DateTime<Utc>,
}

/// A peer's public material plus the local trust state attached to it.
///
/// Fingerprint, short fingerprint, rkid, and SAS words are pure
/// functions of the current X25519 public key and are derived on
/// demand, never stored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub display_name: String,
    #[serde(with = "hex32")]
    pub x25519_public: [u8; 32],
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hex32_opt")]
    pub ed25519_public: Option<[u8; 32]>,
    pub trust: TrustLevel,
    pub blocked: bool,
    pub key_version: u32,
    pub key_history: Vec<KeyHistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// A new, unverified contact from raw key material.
    pub fn new(display_name: impl Into<String>, x25519_public: [u8; 32]) -> Self {
        let now = Utc::now();
        Self {
            id: ContactId::generate(),
            display_name: display_name.into(),
            x25519_public,
            ed25519_public: None,
            trust: TrustLevel::Unverified,
            blocked: false,
            key_version: 1,
            key_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn fingerprint(&self) -> [u8; FINGERPRINT_BYTES] {
        fingerprint(&self.x25519_public)
    }

    pub fn rkid(&self) -> [u8; RKID_BYTES] {
        rkid_of_fingerprint(&self.fingerprint())
    }

    pub fn short_fingerprint(&self) -> String {
        short_fingerprint(&self.fingerprint())
    }

    pub fn sas_words(&self) -> [&'static str; SAS_WORD_COUNT] {
        sas_words(&self.fingerprint())
    }

    pub fn verifying_key(&self) -> Option<VerifyingKey> {
        self.ed25519_public
            .as_ref()
            .and_then(|pk| VerifyingKey::from_bytes(pk).ok())
    }
}

// ---------------------------------------------------------------------------
// Public key bundle
// ---------------------------------------------------------------------------

/// The shareable projection of an identity (JSON on the wire).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyBundle {
    pub id: String,
    pub name: String,
    #[serde(with = "hex32")]
    pub x25519_public: [u8; 32],
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hex32_opt")]
    pub ed25519_public: Option<[u8; 32]>,
    pub fingerprint: String,
    pub key_version: u32,
    pub created_at: DateTime<Utc>,
}

/// Project an identity into its shareable bundle.
pub fn build_bundle(identity: &Identity) -> KeyBundle {
    KeyBundle {
        id: identity.id.as_str().to_string(),
        name: identity.name.clone(),
        x25519_public: identity.x25519_public,
        ed25519_public: identity.ed25519_public,
        fingerprint: hex::encode(identity.fingerprint()),
        key_version: identity.key_version,
        created_at: identity.created_at,
    }
}

/// Build a contact from a received bundle. The embedded fingerprint is
/// recomputed and must match; a mismatch means a corrupted or forged
/// bundle.
pub fn contact_from_bundle(bundle: &KeyBundle) -> Result<Contact, StoreError> {
    let computed = hex::encode(fingerprint(&bundle.x25519_public));
    if computed != bundle.fingerprint {
        return Err(StoreError::InvalidBundle);
    }
    let now = Utc::now();
    Ok(Contact {
        id: ContactId::new(&bundle.id),
        display_name: bundle.name.clone(),
        x25519_public: bundle.x25519_public,
        ed25519_public: bundle.ed25519_public,
        trust: TrustLevel::Unverified,
        blocked: false,
        key_version: bundle.key_version,
        key_history: Vec::new(),
        created_at: now,
        updated_at: now,
    })
}

// ---------------------------------------------------------------------------
// Hex (de)serialization for fixed key material
// ---------------------------------------------------------------------------

mod hex32 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(v))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let text = String::deserialize(d)?;
        let bytes = hex::decode(&text).map_err(de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| de::Error::custom("expected 32 bytes"))
    }
}

mod hex32_opt {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<[u8; 32]>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(bytes) => s.serialize_some(&hex::encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<[u8; 32]>, D::Error> {
        let text: Option<String> = Option::deserialize(d)?;
        match text {
            None => Ok(None),
            Some(text) => {
                let bytes = hex::decode(&text).map_err(de::Error::custom)?;
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| de::Error::custom("expected 32 bytes"))?;
                Ok(Some(arr))
            }
        }
    }
}
