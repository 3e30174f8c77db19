//! # Whisper Envelope
//!
//! The cryptographic core of the Whisper offline messenger: hybrid
//! X25519 + ChaCha20-Poly1305 message encryption with optional Ed25519
//! signatures, packaged as a single-line `whisper1:` text envelope.
//!
//! ## Layers
//!
//! - [`ecdh`] — per-message ephemeral X25519 key agreement
//! - [`kdf`] — HKDF-SHA256 derivation of the AEAD key and nonce
//! - [`aead`] — ChaCha20-Poly1305 seal/open
//! - [`sign`] — Ed25519 over `AAD || ciphertext`
//! - [`padding`] — bucketed length hiding with an authenticated prefix
//! - [`aad`] — the canonical associated data every envelope binds
//! - [`wire`] — the `whisper1:` text serialization
//!
//! ## Security Properties
//!
//! - **Uniform errors**: parse, padding, and crypto failures are opaque
//!   unit types; no parse position or tag detail ever escapes
//! - **AAD binding**: sender binding, recipient fingerprint, flags, and
//!   every header field are authenticated; any deviation fails the open
//! - **Length hiding**: plaintext length is only visible as a bucket
//! - **Secret hygiene**: ephemeral secrets, shared secrets, and derived
//!   keys are zeroized on drop on every path
//!
//! ## What's NOT Provided
//!
//! - Identity, contact, and trust management (see `whisper-keystore`)
//! - Replay detection and freshness checks (pipeline concerns)
//! - Forward secrecy beyond the per-message ephemeral key

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod aad;
pub mod aead;
pub mod ecdh;
pub mod fingerprint;
pub mod kdf;
pub mod padding;
pub mod sign;
pub mod wire;

mod error;

pub use error::{CryptoFailed, InvalidEnvelope, InvalidPadding};

// Key types used across the workspace; re-exported so dependents never
// pin a second copy of the dalek crates.
pub use ed25519_dalek::{Signature, SigningKey, VerifyingKey};
pub use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
