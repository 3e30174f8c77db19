use proptest::prelude::*;

use whisper_envelope::aad::{aad_for_envelope, canonical_aad, AAD_BYTES};
use whisper_envelope::padding::{pad, padded_len, unpad, BUCKETS, BUCKET_STEP};
use whisper_envelope::wire::{Envelope, FLAG_SIGNED, SIG_BYTES};
use whisper_envelope::{aead, ecdh, fingerprint, kdf, sign, InvalidEnvelope};

fn build_envelope(signed: bool, ciphertext: Vec<u8>) -> Envelope {
    Envelope {
        rkid: [0xA1; 8],
        flags: if signed { FLAG_SIGNED } else { 0 },
        epk: [0xB2; 32],
        salt: [0xC3; 16],
        msgid: [0xD4; 16],
        timestamp: 1_750_000_000,
        ciphertext,
        signature: signed.then(|| [0xE5; SIG_BYTES]),
    }
}

// ---------------------------------------------------------------------------
// Full envelope-layer flow (no stores, no pipeline)
// ---------------------------------------------------------------------------

#[test]
fn seal_then_open_via_wire() {
    let receiver = whisper_envelope::StaticSecret::from([0x02; 32]);
    let receiver_pk = *whisper_envelope::X25519PublicKey::from(&receiver).as_bytes();

    let plaintext = b"the envelope layer alone";
    let padded = pad(plaintext).unwrap();

    let (esk, epk) = ecdh::generate_ephemeral();
    let salt = [0x11; 16];
    let msgid = [0x22; 16];
    let ts = 1_750_000_000i64;

    let ss = ecdh::agree_ephemeral(esk, &receiver_pk).unwrap();
    let keys = kdf::derive_keys(&ss, &salt, &epk, &msgid).unwrap();

    let sender_fp = fingerprint::sender_binding(&epk);
    let recipient_fp = fingerprint::fingerprint(&receiver_pk);
    let rkid = fingerprint::rkid(&receiver_pk);
    let aad = canonical_aad(
        &sender_fp,
        &recipient_fp,
        &rkid,
        0,
        &epk,
        &salt,
        &msgid,
        ts,
    );
    let ct = aead::aead_seal(&keys.key, &keys.nonce, &padded, &aad).unwrap();

    let envelope = Envelope {
        rkid,
        flags: 0,
        epk,
        salt,
        msgid,
        timestamp: ts,
        ciphertext: ct,
        signature: None,
    };
    let text = envelope.encode();

    // Receiver side, from the text alone plus its static secret.
    let parsed = Envelope::parse(&text).unwrap();
    let ss2 = ecdh::agree_static(&receiver, &parsed.epk).unwrap();
    let keys2 = kdf::derive_keys(&ss2, &parsed.salt, &parsed.epk, &parsed.msgid).unwrap();
    let aad2 = aad_for_envelope(
        &fingerprint::sender_binding(&parsed.epk),
        &recipient_fp,
        &parsed,
    );
    let padded2 = aead::aead_open(&keys2.key, &keys2.nonce, &parsed.ciphertext, &aad2).unwrap();
    assert_eq!(unpad(&padded2).unwrap(), plaintext);
}

#[test]
fn signature_covers_aad_and_ciphertext() {
    let sk = whisper_envelope::SigningKey::from_bytes(&[0x33; 32]);
    let pk = sk.verifying_key();

    let aad = canonical_aad(
        &[1; 32],
        &[2; 32],
        &[3; 8],
        FLAG_SIGNED,
        &[4; 32],
        &[5; 16],
        &[6; 16],
        99,
    );
    let ct = vec![0x77; 48];
    let mut msg = aad.clone();
    msg.extend_from_slice(&ct);
    let sig = sign::sign(&msg, &sk);
    assert!(sign::verify(&sig, &msg, &pk));

    // Any ciphertext change breaks the signature.
    let mut tampered = msg.clone();
    let last = tampered.len() - 1;
    tampered[last] ^= 0x01;
    assert!(!sign::verify(&sig, &tampered, &pk));
}

// ---------------------------------------------------------------------------
// Wire-level tamper matrix: flip one field, parsing or AEAD must fail.
// ---------------------------------------------------------------------------

#[test]
fn truncation_anywhere_rejected() {
    let text = build_envelope(true, vec![0x55; 64]).encode();
    for cut in [
        text.len() - 1,
        text.len() / 2,
        "whisper1:v1.c20p.".len() + 3,
    ] {
        assert_eq!(
            Envelope::parse(&text[..cut]),
            Err(InvalidEnvelope),
            "cut at {cut}"
        );
    }
}

#[test]
fn aad_differs_per_field() {
    let env = build_envelope(false, vec![0x55; 32]);
    let base = aad_for_envelope(&[1; 32], &[2; 32], &env);
    assert_eq!(base.len(), AAD_BYTES);

    let mut rkid_changed = env.clone();
    rkid_changed.rkid[0] ^= 1;
    assert_ne!(base, aad_for_envelope(&[1; 32], &[2; 32], &rkid_changed));

    let mut ts_changed = env.clone();
    ts_changed.timestamp += 1;
    assert_ne!(base, aad_for_envelope(&[1; 32], &[2; 32], &ts_changed));

    assert_ne!(base, aad_for_envelope(&[9; 32], &[2; 32], &env));
    assert_ne!(base, aad_for_envelope(&[1; 32], &[9; 32], &env));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn padding_roundtrip(pt in proptest::collection::vec(any::<u8>(), 0..5000)) {
        let padded = pad(&pt).unwrap();
        prop_assert!(
            BUCKETS.contains(&padded.len())
                || (padded.len() > 4096 && padded.len() % BUCKET_STEP == 0)
        );
        prop_assert_eq!(unpad(&padded).unwrap(), pt);
    }

    #[test]
    fn padded_len_is_monotone(a in 0usize..20_000, b in 0usize..20_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(padded_len(lo) <= padded_len(hi));
    }

    #[test]
    fn wire_roundtrip(
        rkid in any::<[u8; 8]>(),
        epk in any::<[u8; 32]>(),
        salt in any::<[u8; 16]>(),
        msgid in any::<[u8; 16]>(),
        ts in any::<i64>(),
        ct in proptest::collection::vec(any::<u8>(), 16..512),
        sig in proptest::option::of(any::<[u8; 32]>()),
    ) {
        // Proptest has no Arbitrary for [u8; 64]; widen a 32-byte seed.
        let signature = sig.map(|half| {
            let mut s = [0u8; SIG_BYTES];
            s[..32].copy_from_slice(&half);
            s[32..].copy_from_slice(&half);
            s
        });
        let env = Envelope {
            rkid,
            flags: if signature.is_some() { FLAG_SIGNED } else { 0 },
            epk,
            salt,
            msgid,
            timestamp: ts,
            ciphertext: ct,
            signature,
        };
        prop_assert_eq!(Envelope::parse(&env.encode()).unwrap(), env);
    }

    #[test]
    fn corrupt_field_char_never_roundtrips(pos in 0usize..200) {
        let env = build_envelope(false, vec![0x55; 64]);
        let text = env.encode();
        let idx = "whisper1:v1.c20p.".len() + pos % (text.len() - "whisper1:v1.c20p.".len());
        let mut bytes = text.into_bytes();
        let original = bytes[idx];
        bytes[idx] = if original == b'A' { b'B' } else { b'A' };
        let mutated = String::from_utf8(bytes).unwrap();
        match Envelope::parse(&mutated) {
            Ok(parsed) => prop_assert_ne!(parsed, env),
            Err(InvalidEnvelope) => {}
        }
    }
}
