//! Canonical associated data (locked).
//!
//! Every AEAD call binds this exact byte string; order and widths are
//! normative and shared by both directions:
//!
//! ```text
//! AAD = b"whisper" || b"v1"
//!     || sender_fingerprint   (32)
//!     || recipient_fingerprint(32)
//!     || policy_flags_be_u32  (4, the flags byte zero-extended)
//!     || rkid                 (8)
//!     || flags                (1)
//!     || epk                  (32)
//!     || salt                 (16)
//!     || msgid                (16)
//!     || ts_be_i64            (8)
//! ```
//!
//! The sender slot carries the digest of the ephemeral key (see
//! [`crate::fingerprint::sender_binding`]); the signature, not the AAD,
//! names the sender. Any deviation in any input surfaces as an AEAD
//! authentication failure, indistinguishable from tampering.

extern crate alloc;
use alloc::vec::Vec;

use crate::wire::Envelope;

pub const AAD_PREFIX: &[u8] = b"whisperv1";

/// Total AAD length: 9 + 32 + 32 + 4 + 8 + 1 + 32 + 16 + 16 + 8.
pub const AAD_BYTES: usize = 158;

/// Build the canonical AAD from raw components.
#[allow(clippy::too_many_arguments)]
pub fn canonical_aad(
    sender_fp: &[u8; 32],
    recipient_fp: &[u8; 32],
    rkid: &[u8; 8],
    flags: u8,
    epk: &[u8; 32],
    salt: &[u8; 16],
    msgid: &[u8; 16],
    timestamp: i64,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(AAD_BYTES);
    out.extend_from_slice(AAD_PREFIX);
    out.extend_from_slice(sender_fp);
    out.extend_from_slice(recipient_fp);
    out.extend_from_slice(&(flags as u32).to_be_bytes());
    out.extend_from_slice(rkid);
    out.push(flags);
    out.extend_from_slice(epk);
    out.extend_from_slice(salt);
    out.extend_from_slice(msgid);
    out.extend_from_slice(&timestamp.to_be_bytes());
    debug_assert_eq!(out.len(), AAD_BYTES);
    out
}

/// Build the canonical AAD for a parsed envelope.
pub fn aad_for_envelope(
    sender_fp: &[u8; 32],
    recipient_fp: &[u8; 32],
    envelope: &Envelope,
) -> Vec<u8> {
    canonical_aad(
        sender_fp,
        recipient_fp,
        &envelope.rkid,
        envelope.flags,
        &envelope.epk,
        &envelope.salt,
        &envelope.msgid,
        envelope.timestamp,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_offsets() {
        let aad = canonical_aad(
            &[0xAA; 32],
            &[0xBB; 32],
            &[0xCC; 8],
            0x01,
            &[0xDD; 32],
            &[0xEE; 16],
            &[0xF0; 16],
            0x0102030405060708,
        );
        assert_eq!(aad.len(), AAD_BYTES);
        assert_eq!(&aad[..9], b"whisperv1");
        assert_eq!(&aad[9..41], &[0xAA; 32]);
        assert_eq!(&aad[41..73], &[0xBB; 32]);
        assert_eq!(&aad[73..77], &[0x00, 0x00, 0x00, 0x01]);
        assert_eq!(&aad[77..85], &[0xCC; 8]);
        assert_eq!(aad[85], 0x01);
        assert_eq!(&aad[86..118], &[0xDD; 32]);
        assert_eq!(&aad[118..134], &[0xEE; 16]);
        assert_eq!(&aad[134..150], &[0xF0; 16]);
        assert_eq!(&aad[150..158], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn flags_widen_consistently() {
        let signed = canonical_aad(
            &[0; 32], &[0; 32], &[0; 8], 0x01, &[0; 32], &[0; 16], &[0; 16], 0,
        );
        let unsigned = canonical_aad(
            &[0; 32], &[0; 32], &[0; 8], 0x00, &[0; 32], &[0; 16], &[0; 16], 0,
        );
        assert_ne!(signed, unsigned);
    }
}
