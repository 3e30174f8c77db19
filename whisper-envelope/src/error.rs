//! Unified error types for the envelope layer.
//!
//! All three are opaque unit structs: a failure says *that* something is
//! wrong, never *where*. Callers map them onto their own surface.

use core::fmt;

/// The envelope text failed parsing or validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidEnvelope;

impl fmt::Display for InvalidEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid envelope")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidEnvelope {}

/// Padded plaintext failed the length-prefix or zero-fill checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPadding;

impl fmt::Display for InvalidPadding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid padding")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidPadding {}

/// A cryptographic operation failed: key agreement, derivation, AEAD,
/// signature, or randomness. One label for all of them (oracle discipline).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptoFailed;

impl fmt::Display for CryptoFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cryptographic failure")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CryptoFailed {}
