//! Wire format (v1 text envelope)
//!
//! Single line:
//!
//! ```text
//! whisper1:v1.c20p.<rkid>.<flags>.<epk>.<salt>.<msgid>.<ts>.<ct>[.<sig>]
//! ```
//!
//! The version tag `v1.c20p` is literal; every other field is Base64URL
//! without padding. Decoded widths: rkid=8, flags=1, epk=32, salt=16,
//! msgid=16, ts=8 (signed big-endian seconds), ct>=16, sig=64 iff flags
//! bit 0 is set. Reserved flag bits and ciphertexts above 1 MiB are
//! rejected outright.

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::{CryptoFailed, InvalidEnvelope};

/// Public detection marker.
pub const ENVELOPE_PREFIX: &str = "whisper1:";

/// Literal version tag: format v1, ChaCha20-Poly1305 suite.
pub const VERSION_TAG: &str = "v1.c20p";

pub const RKID_BYTES: usize = 8;
pub const EPK_BYTES: usize = 32;
pub const SALT_BYTES: usize = 16;
pub const MSGID_BYTES: usize = 16;
pub const TS_BYTES: usize = 8;
pub const SIG_BYTES: usize = 64;
pub const MIN_CIPHERTEXT_BYTES: usize = 16;

/// Hard cap on the decoded ciphertext; parsing rejects anything larger.
pub const MAX_CIPHERTEXT_BYTES: usize = 1 << 20;

/// Signature-present flag; all other bits are reserved and must be zero.
pub const FLAG_SIGNED: u8 = 0x01;
pub const FLAGS_RESERVED_MASK: u8 = !FLAG_SIGNED;

// Unpadded Base64 of MAX_CIPHERTEXT_BYTES; checked before decoding so
// oversized input is refused without allocating for it.
const MAX_CIPHERTEXT_CHARS: usize = (MAX_CIPHERTEXT_BYTES * 4).div_ceil(3);

/// A parsed envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub rkid: [u8; RKID_BYTES],
    pub flags: u8,
    pub epk: [u8; EPK_BYTES],
    pub salt: [u8; SALT_BYTES],
    pub msgid: [u8; MSGID_BYTES],
    pub timestamp: i64,
    pub ciphertext: Vec<u8>,
    pub signature: Option<[u8; SIG_BYTES]>,
}

impl Envelope {
    pub fn is_signed(&self) -> bool {
        self.flags & FLAG_SIGNED != 0
    }

    /// Serialize to the single-line text form.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(
            ENVELOPE_PREFIX.len() + VERSION_TAG.len() + 64 + b64_len(self.ciphertext.len()) + 96,
        );
        out.push_str(ENVELOPE_PREFIX);
        out.push_str(VERSION_TAG);
        for field in [
            &self.rkid[..],
            &[self.flags][..],
            &self.epk[..],
            &self.salt[..],
            &self.msgid[..],
            &self.timestamp.to_be_bytes()[..],
            &self.ciphertext[..],
        ] {
            out.push('.');
            out.push_str(&URL_SAFE_NO_PAD.encode(field));
        }
        if let Some(sig) = &self.signature {
            out.push('.');
            out.push_str(&URL_SAFE_NO_PAD.encode(sig));
        }
        out
    }

    /// Parse an envelope out of `text`. The envelope may be embedded in
    /// surrounding text; parsing starts at the detection marker and
    /// stops at whitespace or end of input.
    pub fn parse(text: &str) -> Result<Self, InvalidEnvelope> {
        let start = text.find(ENVELOPE_PREFIX).ok_or(InvalidEnvelope)?;
        let body = &text[start + ENVELOPE_PREFIX.len()..];
        let body = body.split_whitespace().next().ok_or(InvalidEnvelope)?;

        // Unknown version strings are rejected before any field decode.
        let rest = body
            .strip_prefix(VERSION_TAG)
            .and_then(|r| r.strip_prefix('.'))
            .ok_or(InvalidEnvelope)?;

        let fields: Vec<&str> = rest.split('.').collect();
        if fields.len() != 7 && fields.len() != 8 {
            return Err(InvalidEnvelope);
        }

        let rkid: [u8; RKID_BYTES] = decode_fixed(fields[0])?;
        let flags_buf: [u8; 1] = decode_fixed(fields[1])?;
        let flags = flags_buf[0];
        if flags & FLAGS_RESERVED_MASK != 0 {
            return Err(InvalidEnvelope);
        }

        let epk: [u8; EPK_BYTES] = decode_fixed(fields[2])?;
        let salt: [u8; SALT_BYTES] = decode_fixed(fields[3])?;
        let msgid: [u8; MSGID_BYTES] = decode_fixed(fields[4])?;
        let ts_buf: [u8; TS_BYTES] = decode_fixed(fields[5])?;
        let timestamp = i64::from_be_bytes(ts_buf);

        if fields[6].len() > MAX_CIPHERTEXT_CHARS {
            return Err(InvalidEnvelope);
        }
        let ciphertext = URL_SAFE_NO_PAD
            .decode(fields[6])
            .map_err(|_| InvalidEnvelope)?;
        if ciphertext.len() < MIN_CIPHERTEXT_BYTES || ciphertext.len() > MAX_CIPHERTEXT_BYTES {
            return Err(InvalidEnvelope);
        }

        let signature = if fields.len() == 8 {
            if flags & FLAG_SIGNED == 0 {
                return Err(InvalidEnvelope);
            }
            Some(decode_fixed::<SIG_BYTES>(fields[7])?)
        } else {
            if flags & FLAG_SIGNED != 0 {
                return Err(InvalidEnvelope);
            }
            None
        };

        Ok(Self {
            rkid,
            flags,
            epk,
            salt,
            msgid,
            timestamp,
            ciphertext,
            signature,
        })
    }
}

/// Whether `text` carries an envelope at all.
pub fn contains_envelope(text: &str) -> bool {
    text.contains(ENVELOPE_PREFIX)
}

/// Fresh random HKDF salt.
pub fn generate_salt() -> Result<[u8; SALT_BYTES], CryptoFailed> {
    let mut salt = [0u8; SALT_BYTES];
    getrandom::getrandom(&mut salt).map_err(|_| CryptoFailed)?;
    Ok(salt)
}

/// Fresh random message id. Uniqueness enforcement is the replay
/// journal's job.
pub fn generate_msgid() -> Result<[u8; MSGID_BYTES], CryptoFailed> {
    let mut id = [0u8; MSGID_BYTES];
    getrandom::getrandom(&mut id).map_err(|_| CryptoFailed)?;
    Ok(id)
}

fn decode_fixed<const N: usize>(field: &str) -> Result<[u8; N], InvalidEnvelope> {
    if field.len() > b64_len(N) {
        return Err(InvalidEnvelope);
    }
    let decoded = URL_SAFE_NO_PAD.decode(field).map_err(|_| InvalidEnvelope)?;
    decoded.as_slice().try_into().map_err(|_| InvalidEnvelope)
}

const fn b64_len(n: usize) -> usize {
    (n * 4).div_ceil(3)
}
