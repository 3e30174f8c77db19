//! Per-message X25519 key agreement.
//!
//! Every envelope mints a fresh ephemeral keypair on the sending side;
//! the receiver runs the same agreement with its static secret and the
//! ephemeral public key carried in the header. Both paths reject
//! non-contributory results (low-order peer points).

extern crate alloc;

use rand_core::OsRng;
use x25519_dalek::{EphemeralSecret, PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::error::CryptoFailed;

/// X25519 key and shared-secret size.
pub const X25519_KEY_BYTES: usize = 32;

/// Generate a fresh ephemeral keypair.
///
/// The secret is single-use: [`agree_ephemeral`] consumes it, and the
/// dalek type zeroizes itself on drop on every path.
pub fn generate_ephemeral() -> (EphemeralSecret, [u8; X25519_KEY_BYTES]) {
    let esk = EphemeralSecret::random_from_rng(OsRng);
    let epk = X25519PublicKey::from(&esk);
    (esk, *epk.as_bytes())
}

/// Sender-side agreement: ephemeral secret x recipient public key.
pub fn agree_ephemeral(
    esk: EphemeralSecret,
    peer_pk: &[u8; X25519_KEY_BYTES],
) -> Result<Zeroizing<[u8; X25519_KEY_BYTES]>, CryptoFailed> {
    let peer = X25519PublicKey::from(*peer_pk);
    let shared = esk.diffie_hellman(&peer);
    if !shared.was_contributory() {
        return Err(CryptoFailed);
    }
    Ok(Zeroizing::new(*shared.as_bytes()))
}

/// Receiver-side agreement: static identity secret x ephemeral public key.
pub fn agree_static(
    sk: &StaticSecret,
    peer_pk: &[u8; X25519_KEY_BYTES],
) -> Result<Zeroizing<[u8; X25519_KEY_BYTES]>, CryptoFailed> {
    let peer = X25519PublicKey::from(*peer_pk);
    let shared = sk.diffie_hellman(&peer);
    if !shared.was_contributory() {
        return Err(CryptoFailed);
    }
    Ok(Zeroizing::new(*shared.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_sides_agree() {
        let receiver = StaticSecret::random_from_rng(OsRng);
        let receiver_pk = X25519PublicKey::from(&receiver);

        let (esk, epk) = generate_ephemeral();
        let sender_ss = agree_ephemeral(esk, receiver_pk.as_bytes()).unwrap();
        let receiver_ss = agree_static(&receiver, &epk).unwrap();

        assert_eq!(*sender_ss, *receiver_ss);
    }

    #[test]
    fn low_order_peer_rejected() {
        // The identity point: DH with it yields an all-zero secret.
        let (esk, _) = generate_ephemeral();
        assert!(agree_ephemeral(esk, &[0u8; 32]).is_err());
    }
}
