//! The send-policy gate. Consulted once, before any secret is minted.

use whisper_keystore::{Identity, SendPolicy, TrustLevel};

use crate::encrypt::Recipient;
use crate::error::{PolicyKind, WhisperError};

pub(crate) fn check_send(
    policy: &SendPolicy,
    sender: &Identity,
    recipient: &Recipient,
    sign: bool,
) -> Result<(), WhisperError> {
    // Archived and rotated identities are decrypt-only.
    if !sender.status.can_send() {
        tracing::debug!(sender = %sender.id, status = %sender.status, "send refused: sender not active");
        return Err(WhisperError::KeyNotFound);
    }

    match recipient {
        Recipient::Contact(contact) => {
            if contact.blocked || contact.trust == TrustLevel::Revoked {
                tracing::debug!(contact = %contact.id, "send refused: recipient key blocked");
                return Err(WhisperError::PolicyViolation(PolicyKind::RawKeyBlocked));
            }
            if policy.require_signature_for_verified
                && contact.trust == TrustLevel::Verified
                && !sign
            {
                return Err(WhisperError::PolicyViolation(PolicyKind::SignatureRequired));
            }
        }
        Recipient::RawKey(_) => {
            if policy.contact_required_to_send {
                return Err(WhisperError::PolicyViolation(PolicyKind::ContactRequired));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use whisper_keystore::{Contact, IdentityStatus};

    fn sender() -> Identity {
        Identity::generate("alice")
    }

    fn contact(trust: TrustLevel, blocked: bool) -> Contact {
        let mut c = Contact::new("bob", [2; 32]);
        c.trust = trust;
        c.blocked = blocked;
        c
    }

    #[test]
    fn raw_key_allowed_by_default() {
        let policy = SendPolicy::default();
        assert!(check_send(&policy, &sender(), &Recipient::RawKey([2; 32]), false).is_ok());
    }

    #[test]
    fn raw_key_refused_when_contact_required() {
        let policy = SendPolicy {
            contact_required_to_send: true,
            ..SendPolicy::default()
        };
        assert_eq!(
            check_send(&policy, &sender(), &Recipient::RawKey([2; 32]), false),
            Err(WhisperError::PolicyViolation(PolicyKind::ContactRequired))
        );
    }

    #[test]
    fn blocked_and_revoked_always_refused() {
        let policy = SendPolicy::default();
        for recipient in [
            contact(TrustLevel::Verified, true),
            contact(TrustLevel::Revoked, false),
        ] {
            assert_eq!(
                check_send(&policy, &sender(), &Recipient::Contact(recipient), true),
                Err(WhisperError::PolicyViolation(PolicyKind::RawKeyBlocked))
            );
        }
    }

    #[test]
    fn verified_requires_signature_when_flagged() {
        let policy = SendPolicy {
            require_signature_for_verified: true,
            ..SendPolicy::default()
        };
        let verified = contact(TrustLevel::Verified, false);
        assert_eq!(
            check_send(&policy, &sender(), &Recipient::Contact(verified.clone()), false),
            Err(WhisperError::PolicyViolation(PolicyKind::SignatureRequired))
        );
        assert!(check_send(&policy, &sender(), &Recipient::Contact(verified), true).is_ok());

        // Unverified recipients are exempt from the signature rule.
        let unverified = contact(TrustLevel::Unverified, false);
        assert!(check_send(&policy, &sender(), &Recipient::Contact(unverified), false).is_ok());
    }

    #[test]
    fn inactive_sender_refused() {
        let mut archived = sender();
        archived.status = IdentityStatus::Archived;
        assert_eq!(
            check_send(
                &SendPolicy::default(),
                &archived,
                &Recipient::RawKey([2; 32]),
                false
            ),
            Err(WhisperError::KeyNotFound)
        );
    }
}
