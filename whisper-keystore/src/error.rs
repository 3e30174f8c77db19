//! Error types for the stores.

use crate::types::{ContactId, IdentityId};
use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    IdentityNotFound(IdentityId),
    ContactNotFound(ContactId),
    NotActive(IdentityId),
    DuplicateContact(ContactId),
    InvalidBundle,
    Storage(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentityNotFound(id) => write!(f, "identity not found: {}", id),
            Self::ContactNotFound(id) => write!(f, "contact not found: {}", id),
            Self::NotActive(id) => write!(f, "identity not active: {}", id),
            Self::DuplicateContact(id) => write!(f, "duplicate contact: {}", id),
            Self::InvalidBundle => write!(f, "invalid key bundle"),
            Self::Storage(msg) => write!(f, "storage error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
