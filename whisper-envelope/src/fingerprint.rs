//! Key fingerprints and the routing tag derived from them.
//!
//! fingerprint = SHA-256(x25519 public key)   (32 bytes)
//! rkid        = fingerprint[24..32]          (8 bytes)
//! short form  = first 12 hex chars, grouped xxxx-xxxx-xxxx

extern crate alloc;
use alloc::string::String;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub const FINGERPRINT_BYTES: usize = 32;
pub const RKID_BYTES: usize = 8;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// SHA-256 fingerprint of an X25519 public key.
pub fn fingerprint(pk: &[u8; 32]) -> [u8; FINGERPRINT_BYTES] {
    let mut out = [0u8; FINGERPRINT_BYTES];
    out.copy_from_slice(&Sha256::digest(pk));
    out
}

/// Recipient key id: the trailing 8 bytes of the fingerprint.
pub fn rkid(pk: &[u8; 32]) -> [u8; RKID_BYTES] {
    let fp = fingerprint(pk);
    let mut out = [0u8; RKID_BYTES];
    out.copy_from_slice(&fp[FINGERPRINT_BYTES - RKID_BYTES..]);
    out
}

/// The rkid of a fingerprint already in hand.
pub fn rkid_of_fingerprint(fp: &[u8; FINGERPRINT_BYTES]) -> [u8; RKID_BYTES] {
    let mut out = [0u8; RKID_BYTES];
    out.copy_from_slice(&fp[FINGERPRINT_BYTES - RKID_BYTES..]);
    out
}

/// Human-checkable short form: `6668-7aad-f862`.
pub fn short_fingerprint(fp: &[u8; FINGERPRINT_BYTES]) -> String {
    let mut s = String::with_capacity(14);
    for (i, &b) in fp[..6].iter().enumerate() {
        if i == 2 || i == 4 {
            s.push('-');
        }
        s.push(HEX[(b >> 4) as usize] as char);
        s.push(HEX[(b & 0x0F) as usize] as char);
    }
    s
}

/// Sender binding for the canonical AAD: the digest of the ephemeral
/// public key. Both sides can compute it from the header alone, so AEAD
/// failure never depends on contact-list contents.
pub fn sender_binding(epk: &[u8; 32]) -> [u8; FINGERPRINT_BYTES] {
    fingerprint(epk)
}

/// Constant-time equality over byte strings.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    // SHA-256 of 32 zero bytes.
    const ZERO_FP_HEX: &str = "66687aadf862bd776c8fc18b8e9f8e20089714856ee233b3902a591d0d5f2925";

    fn zero_fp() -> [u8; 32] {
        fingerprint(&[0u8; 32])
    }

    #[test]
    fn known_fingerprint() {
        let expected: Vec<u8> = (0..32)
            .map(|i| u8::from_str_radix(&ZERO_FP_HEX[2 * i..2 * i + 2], 16).unwrap())
            .collect();
        assert_eq!(zero_fp().as_slice(), expected.as_slice());
    }

    #[test]
    fn rkid_is_fingerprint_tail() {
        let fp = zero_fp();
        assert_eq!(rkid(&[0u8; 32]), fp[24..32]);
        assert_eq!(rkid_of_fingerprint(&fp), fp[24..32]);
    }

    #[test]
    fn short_form_grouping() {
        assert_eq!(short_fingerprint(&zero_fp()), "6668-7aad-f862");
    }

    #[test]
    fn ct_eq_semantics() {
        assert!(ct_eq(b"same", b"same"));
        assert!(!ct_eq(b"same", b"other"));
        assert!(!ct_eq(b"same", b"sam"));
    }
}
