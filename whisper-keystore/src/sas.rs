//! Short authentication string words.
//!
//! Six words, each picked by an 11-bit non-overlapping window over the
//! 256-bit fingerprint (bits 0..66, most significant first), indexing
//! the fixed BIP-39 English list. 2^11 = 2048 words, so every window
//! maps exactly onto the list.

use bip39::Language;

pub const SAS_WORD_COUNT: usize = 6;

const WINDOW_BITS: usize = 11;

/// The six SAS words for a fingerprint. Deterministic: both ends of a
/// verification call read the same words off the same fingerprint.
pub fn sas_words(fingerprint: &[u8; 32]) -> [&'static str; SAS_WORD_COUNT] {
    let words = Language::English.word_list();
    core::array::from_fn(|i| words[window(fingerprint, i)])
}

/// The i-th 11-bit big-endian window.
fn window(fingerprint: &[u8; 32], i: usize) -> usize {
    let start = i * WINDOW_BITS;
    let mut value = 0usize;
    for offset in 0..WINDOW_BITS {
        let bit = start + offset;
        let byte = fingerprint[bit / 8];
        value = (value << 1) | ((byte >> (7 - bit % 8)) & 1) as usize;
    }
    value
}
