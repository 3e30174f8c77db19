//! AEAD: ChaCha20-Poly1305

extern crate alloc;
use alloc::vec::Vec;

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Nonce,
};

use crate::error::CryptoFailed;

pub const TAG_BYTES: usize = 16;

/// AEAD seal (encrypt path). Output is |plaintext| + 16.
pub fn aead_seal(
    key: &[u8; 32],
    nonce: &[u8; 12],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoFailed> {
    let cipher = ChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoFailed)?;
    let n = Nonce::from_slice(nonce);
    let payload = Payload { msg: plaintext, aad };
    cipher.encrypt(n, payload).map_err(|_| CryptoFailed)
}

/// AEAD open (decrypt path). Tag comparison is constant-time inside the
/// cipher implementation; any failure is the opaque `CryptoFailed`.
pub fn aead_open(
    key: &[u8; 32],
    nonce: &[u8; 12],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoFailed> {
    let cipher = ChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoFailed)?;
    let n = Nonce::from_slice(nonce);
    let payload = Payload { msg: ciphertext, aad };
    cipher.decrypt(n, payload).map_err(|_| CryptoFailed)
}
