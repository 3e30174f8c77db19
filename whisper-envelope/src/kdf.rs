//! Key derivation.
//!
//! info = b"whisper-v1" || epk || msgid
//! okm  = HKDF-SHA256(salt=salt, ikm=shared_secret, info=info, len=44)
//! key  = okm[..32], nonce = okm[32..44]
//!
//! Binding the ephemeral key and message id into the info string makes
//! the derived key unique per envelope even under salt reuse.

extern crate alloc;
use alloc::vec::Vec;

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::error::CryptoFailed;

/// Domain-separation prefix for the HKDF info string.
pub const INFO_PREFIX: &[u8] = b"whisper-v1";

pub const KEY_BYTES: usize = 32;
pub const NONCE_BYTES: usize = 12;
const OKM_BYTES: usize = KEY_BYTES + NONCE_BYTES;

/// The per-message AEAD key and nonce. The key zeroizes on drop; the
/// nonce travels implicitly (it is re-derived by the receiver).
pub struct MessageKeys {
    pub key: Zeroizing<[u8; KEY_BYTES]>,
    pub nonce: [u8; NONCE_BYTES],
}

/// Derive the AEAD key and nonce for one envelope.
pub fn derive_keys(
    shared_secret: &[u8; 32],
    salt: &[u8; 16],
    epk: &[u8; 32],
    msgid: &[u8; 16],
) -> Result<MessageKeys, CryptoFailed> {
    let mut info = Vec::with_capacity(INFO_PREFIX.len() + epk.len() + msgid.len());
    info.extend_from_slice(INFO_PREFIX);
    info.extend_from_slice(epk);
    info.extend_from_slice(msgid);

    let hk = Hkdf::<Sha256>::new(Some(salt), shared_secret);
    let mut okm = [0u8; OKM_BYTES];
    hk.expand(&info, &mut okm).map_err(|_| CryptoFailed)?;

    let mut key = Zeroizing::new([0u8; KEY_BYTES]);
    key.copy_from_slice(&okm[..KEY_BYTES]);
    let mut nonce = [0u8; NONCE_BYTES];
    nonce.copy_from_slice(&okm[KEY_BYTES..]);
    okm.zeroize();

    Ok(MessageKeys { key, nonce })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SS: [u8; 32] = [0x42; 32];
    const SALT: [u8; 16] = [0x01; 16];
    const EPK: [u8; 32] = [0x02; 32];
    const MSGID: [u8; 16] = [0x03; 16];

    #[test]
    fn deterministic() {
        let a = derive_keys(&SS, &SALT, &EPK, &MSGID).unwrap();
        let b = derive_keys(&SS, &SALT, &EPK, &MSGID).unwrap();
        assert_eq!(*a.key, *b.key);
        assert_eq!(a.nonce, b.nonce);
    }

    #[test]
    fn inputs_separate_keys() {
        let base = derive_keys(&SS, &SALT, &EPK, &MSGID).unwrap();
        let other_salt = derive_keys(&SS, &[0xFF; 16], &EPK, &MSGID).unwrap();
        let other_msgid = derive_keys(&SS, &SALT, &EPK, &[0xFF; 16]).unwrap();
        assert_ne!(*base.key, *other_salt.key);
        assert_ne!(*base.key, *other_msgid.key);
        assert_ne!(base.nonce, other_msgid.nonce);
    }

    #[test]
    fn explicit_zeroize_clears_key_material() {
        let mut keys = derive_keys(&SS, &SALT, &EPK, &MSGID).unwrap();
        keys.key.zeroize();
        assert_eq!(*keys.key, [0u8; KEY_BYTES]);
    }
}
