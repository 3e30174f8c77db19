//! Shared two-party fixture with deterministic key material.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use chrono::Utc;

use whisper_envelope::{SigningKey, StaticSecret, X25519PublicKey};
use whisper_keystore::{
    build_bundle, contact_from_bundle, Contact, ContactStore, Identity, IdentityId,
    IdentityStatus, IdentityStore, PolicyStore, SendPolicy,
};
use whisper_pipeline::Whisper;

/// An identity with key material derived from fixed seeds.
pub fn seeded_identity(name: &str, x_seed: u8, ed_seed: u8) -> Identity {
    let x_secret = StaticSecret::from([x_seed; 32]);
    let x_public = X25519PublicKey::from(&x_secret);
    let signing = SigningKey::from_bytes(&[ed_seed; 32]);
    Identity {
        id: IdentityId::new(format!("fixture-{:02x}", x_seed)),
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

pub struct Party {
    pub whisper: Whisper,
    pub identity: Identity,
}

impl Party {
    pub fn new(identity: Identity) -> Self {
        let whisper = Whisper::in_memory();
        whisper.identities().put(&identity).unwrap();
        Self { whisper, identity }
    }

    /// Add a peer's identity as a contact, returning the stored record.
    pub fn knows(&self, peer: &Identity, display_name: &str) -> Contact {
        let mut contact = contact_from_bundle(&build_bundle(peer)).unwrap();
        contact.display_name = display_name.into();
        self.whisper.contacts().add(contact.clone()).unwrap();
        contact
    }

    pub fn set_policy(&self, policy: SendPolicy) {
        self.whisper.policy().store(&policy).unwrap();
    }
}

/// Alice and Bob, each with the other on file.
pub fn two_parties() -> (Party, Party) {
    let alice = Party::new(seeded_identity("alice", 0x01, 0x11));
    let bob = Party::new(seeded_identity("bob", 0x02, 0x22));
    alice.knows(&bob.identity, "bob");
    bob.knows(&alice.identity, "alice");
    (alice, bob)
}

/// A party with a policy preloaded.
pub fn party_with_policy(identity: Identity, policy: SendPolicy) -> Party {
    let party = Party::new(identity);
    party.set_policy(policy);
    party
}
