//! End-to-end scenarios with pinned fixtures: seeded keys, literal
//! plaintexts, exact field counts and error labels.

mod common;

use chrono::Utc;

use common::{seeded_identity, two_parties, Party};
use whisper_envelope::wire::{generate_msgid, generate_salt, Envelope};
use whisper_envelope::{aad, aead, ecdh, fingerprint, kdf, padding};
use whisper_pipeline::{Attribution, Recipient, WhisperError};
use whisper_keystore::{ContactStore, TrustLevel};

async fn alice_to_bob(sign: bool, plaintext: &[u8]) -> (Party, Party, String) {
    let (alice, bob) = two_parties();
    let contact_bob = alice
        .whisper
        .contacts()
        .by_rkid(&bob.identity.rkid())
        .unwrap()
        .unwrap();
    let text = alice
        .whisper
        .encrypt(plaintext, &alice.identity.id, Recipient::Contact(contact_bob), sign)
        .await
        .unwrap();
    (alice, bob, text)
}

/// S1: signed "hello" — envelope shape and attribution.
#[tokio::test]
async fn s1_signed_hello() {
    let (_alice, bob, text) = alice_to_bob(true, b"hello").await;

    assert!(text.starts_with("whisper1:v1.c20p."));
    let fields: Vec<&str> = text["whisper1:v1.c20p.".len()..].split('.').collect();
    assert_eq!(fields.len(), 8); // rkid..ct plus the signature

    let envelope = Envelope::parse(&text).unwrap();
    assert_eq!(envelope.flags, 0x01);
    assert!(envelope.signature.is_some());

    let opened = bob.whisper.decrypt(&text).await.unwrap();
    assert_eq!(opened.plaintext, b"hello");
    assert_eq!(
        opened.attribution,
        Attribution::Signed {
            contact: bob
                .whisper
                .contacts()
                .list()
                .unwrap()
                .into_iter()
                .next()
                .unwrap()
                .id,
            display_name: "alice".into(),
            trust: TrustLevel::Unverified,
        }
    );
}

/// S2: replace a ciphertext character — CryptographicFailure.
#[tokio::test]
async fn s2_tampered_ciphertext_character() {
    let (_alice, bob, text) = alice_to_bob(true, b"hello").await;

    // The ciphertext is the second-to-last dot-field of a signed
    // envelope. Swap one character for another that keeps the Base64
    // decodable; only the AEAD may notice.
    let mut fields: Vec<String> = text.split('.').map(String::from).collect();
    let ct_index = fields.len() - 2;
    let ct = &mut fields[ct_index];
    let mid = ct.len() / 2;
    let original = ct.as_bytes()[mid];
    let replacement = if original == b'A' { 'B' } else { 'A' };
    ct.replace_range(mid..mid + 1, &replacement.to_string());

    assert_eq!(
        bob.whisper.decrypt(&fields.join(".")).await.unwrap_err(),
        WhisperError::CryptographicFailure
    );
}

/// S3: decrypt twice — second is a replay.
#[tokio::test]
async fn s3_sequential_replay() {
    let (_alice, bob, text) = alice_to_bob(false, b"only once").await;
    assert_eq!(
        bob.whisper.decrypt(&text).await.unwrap().plaintext,
        b"only once"
    );
    assert_eq!(
        bob.whisper.decrypt(&text).await.unwrap_err(),
        WhisperError::ReplayDetected
    );
}

/// S4: a timestamp just past the 48-hour window — MessageExpired.
/// The stale envelope is built against Bob's key directly, the way a
/// delayed courier would deliver it.
#[tokio::test]
async fn s4_expired_timestamp() {
    let bob = Party::new(seeded_identity("bob", 0x02, 0x22));
    for skew in [-172_801i64, 172_801] {
        let text = seal_raw(&bob, b"late", Utc::now().timestamp() + skew);
        assert_eq!(
            bob.whisper.decrypt(&text).await.unwrap_err(),
            WhisperError::MessageExpired
        );
    }

    // Just inside the window still decrypts.
    let text = seal_raw(&bob, b"in time", Utc::now().timestamp() - 172_000);
    assert_eq!(bob.whisper.decrypt(&text).await.unwrap().plaintext, b"in time");
}

/// S5: an rkid matching no identity — MessageNotForMe.
#[tokio::test]
async fn s5_unroutable_rkid() {
    let (_alice, bob, text) = alice_to_bob(false, b"misrouted").await;

    let mut envelope = Envelope::parse(&text).unwrap();
    envelope.rkid = [0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x11, 0x22, 0x33];
    assert_eq!(
        bob.whisper.decrypt(&envelope.encode()).await.unwrap_err(),
        WhisperError::MessageNotForMe
    );
}

/// S6: empty plaintext, unsigned — eight fields, 256-byte bucket.
#[tokio::test]
async fn s6_empty_unsigned() {
    let (_alice, bob, text) = alice_to_bob(false, b"").await;

    let fields: Vec<&str> = text["whisper1:v1.c20p.".len()..].split('.').collect();
    assert_eq!(fields.len(), 7); // no signature field

    let envelope = Envelope::parse(&text).unwrap();
    assert_eq!(envelope.flags, 0x00);
    // Padded to the smallest bucket plus the AEAD tag.
    assert_eq!(envelope.ciphertext.len(), 256 + 16);

    let opened = bob.whisper.decrypt(&text).await.unwrap();
    assert_eq!(opened.plaintext, b"");
    assert_eq!(opened.attribution, Attribution::Unsigned);
}

/// Seal an unsigned envelope to a party's key with a chosen timestamp.
fn seal_raw(to: &Party, plaintext: &[u8], timestamp: i64) -> String {
    let recipient_pk = to.identity.x25519_public;
    let padded = padding::pad(plaintext).unwrap();

    let (esk, epk) = ecdh::generate_ephemeral();
    let salt = generate_salt().unwrap();
    let msgid = generate_msgid().unwrap();

    let shared = ecdh::agree_ephemeral(esk, &recipient_pk).unwrap();
    let keys = kdf::derive_keys(&shared, &salt, &epk, &msgid).unwrap();

    let rkid = fingerprint::rkid(&recipient_pk);
    let aad_bytes = aad::canonical_aad(
        &fingerprint::sender_binding(&epk),
        &fingerprint::fingerprint(&recipient_pk),
        &rkid,
        0,
        &epk,
        &salt,
        &msgid,
        timestamp,
    );
    let ciphertext = aead::aead_seal(&keys.key, &keys.nonce, &padded, &aad_bytes).unwrap();

    Envelope {
        rkid,
        flags: 0,
        epk,
        salt,
        msgid,
        timestamp,
        ciphertext,
        signature: None,
    }
    .encode()
}
