//! Bucketed length hiding.
//!
//! Layout: `len_be_u16 || plaintext || zero_fill`, padded to the first
//! bucket in {256, 512, 1024, 2048, 4096} that fits, or to the next
//! multiple of 4096 above that. An observer learns only the bucket.

extern crate alloc;
use alloc::vec;
use alloc::vec::Vec;

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::InvalidPadding;

pub const BUCKETS: [usize; 5] = [256, 512, 1024, 2048, 4096];
pub const BUCKET_STEP: usize = 4096;
pub const LEN_PREFIX_BYTES: usize = 2;

/// Largest plaintext the u16 length prefix can describe.
pub const MAX_PLAINTEXT_BYTES: usize = u16::MAX as usize;

/// The padded size for a given plaintext length.
pub fn padded_len(plaintext_len: usize) -> usize {
    let total = LEN_PREFIX_BYTES + plaintext_len;
    for bucket in BUCKETS {
        if total <= bucket {
            return bucket;
        }
    }
    total.div_ceil(BUCKET_STEP) * BUCKET_STEP
}

/// Pad a plaintext. The returned buffer zeroizes on drop; it still
/// contains the plaintext.
pub fn pad(plaintext: &[u8]) -> Result<Zeroizing<Vec<u8>>, InvalidPadding> {
    if plaintext.len() > MAX_PLAINTEXT_BYTES {
        return Err(InvalidPadding);
    }
    let mut out = Zeroizing::new(vec![0u8; padded_len(plaintext.len())]);
    out[..LEN_PREFIX_BYTES].copy_from_slice(&(plaintext.len() as u16).to_be_bytes());
    out[LEN_PREFIX_BYTES..LEN_PREFIX_BYTES + plaintext.len()].copy_from_slice(plaintext);
    Ok(out)
}

/// Recover the plaintext. The trailing fill is checked in constant time
/// over its whole length before the result is released.
pub fn unpad(padded: &[u8]) -> Result<Vec<u8>, InvalidPadding> {
    if padded.len() < LEN_PREFIX_BYTES {
        return Err(InvalidPadding);
    }
    let len = u16::from_be_bytes([padded[0], padded[1]]) as usize;
    if LEN_PREFIX_BYTES + len > padded.len() {
        return Err(InvalidPadding);
    }

    let mut acc = 0u8;
    for &b in &padded[LEN_PREFIX_BYTES + len..] {
        acc |= b;
    }
    if !bool::from(acc.ct_eq(&0u8)) {
        return Err(InvalidPadding);
    }

    Ok(padded[LEN_PREFIX_BYTES..LEN_PREFIX_BYTES + len].to_vec())
}
