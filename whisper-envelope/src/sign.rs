//! Ed25519 signatures over `AAD || ciphertext`.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

pub const SIG_BYTES: usize = 64;

/// Sign a message. Infallible with a materialised signing key; callers
/// that route through an external oracle handle its outcomes themselves.
pub fn sign(msg: &[u8], sk: &SigningKey) -> [u8; SIG_BYTES] {
    sk.sign(msg).to_bytes()
}

/// Verify a detached signature (RFC 8032).
pub fn verify(sig: &[u8; SIG_BYTES], msg: &[u8], pk: &VerifyingKey) -> bool {
    let sig = Signature::from_bytes(sig);
    pk.verify(msg, &sig).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let sk = SigningKey::from_bytes(&[5u8; 32]);
        let pk = sk.verifying_key();
        let sig = sign(b"attest this", &sk);
        assert!(verify(&sig, b"attest this", &pk));
        assert!(!verify(&sig, b"attest that", &pk));
    }

    #[test]
    fn wrong_key_rejected() {
        let sk = SigningKey::from_bytes(&[5u8; 32]);
        let other = SigningKey::from_bytes(&[6u8; 32]).verifying_key();
        let sig = sign(b"attest this", &sk);
        assert!(!verify(&sig, b"attest this", &other));
    }
}
