// src/domain/identity.rs
//
// Voicemail identity - the single piece of derived state this crate owns.
//
// CRITICAL RULES:
// - The snapshot is replaced wholesale on every successful resolution,
//   never merged incrementally
// - Phone numbers are only meaningful while an identity is present
// - Read accessors never perform I/O

use serde::{Deserialize, Serialize};

use crate::domain::phone_number::numbers_match;
use crate::domain::{DomainError, DomainResult};

/// Opaque identifier of a contact record in the external store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactId(u64);

impl ContactId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ContactId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One point-in-time view of the resolved voicemail contact: its store
/// identifier plus the full set of phone numbers it carried at resolution
/// time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoicemailSnapshot {
    contact_id: Option<ContactId>,
    phone_numbers: Vec<String>,
}

impl VoicemailSnapshot {
    /// The unresolved snapshot: no identity, no numbers.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the whole snapshot with a fresh resolution result.
    pub fn resolve(&mut self, contact_id: ContactId, phone_numbers: Vec<String>) {
        self.contact_id = Some(contact_id);
        self.phone_numbers = phone_numbers;
    }

    /// Reset to the unresolved snapshot.
    pub fn clear(&mut self) {
        self.contact_id = None;
        self.phone_numbers.clear();
    }

    pub fn is_resolved(&self) -> bool {
        self.contact_id.is_some()
    }

    pub fn contact_id(&self) -> Option<ContactId> {
        self.contact_id
    }

    pub fn phone_numbers(&self) -> &[String] {
        &self.phone_numbers
    }

    /// True when `number` matches any stored voicemail number under the
    /// format-tolerant comparison.
    pub fn matches_number(&self, number: &str) -> bool {
        self.phone_numbers
            .iter()
            .any(|stored| numbers_match(stored, number))
    }

    /// True when `id` is the currently resolved voicemail contact.
    pub fn matches_contact(&self, id: ContactId) -> bool {
        self.contact_id == Some(id)
    }
}

/// Validates all VoicemailSnapshot invariants
pub fn validate_snapshot(snapshot: &VoicemailSnapshot) -> DomainResult<()> {
    if snapshot.contact_id.is_none() && !snapshot.phone_numbers.is_empty() {
        return Err(DomainError::InvariantViolation(
            "Phone numbers present without a resolved contact identity".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_matches_nothing() {
        let snapshot = VoicemailSnapshot::empty();
        assert!(!snapshot.is_resolved());
        assert!(!snapshot.matches_number("1234"));
        assert!(!snapshot.matches_contact(ContactId::new(42)));
        assert!(validate_snapshot(&snapshot).is_ok());
    }

    #[test]
    fn test_resolve_replaces_wholesale() {
        let mut snapshot = VoicemailSnapshot::empty();
        snapshot.resolve(ContactId::new(1), vec!["111".to_string(), "222".to_string()]);
        snapshot.resolve(ContactId::new(2), vec!["333".to_string()]);

        assert_eq!(snapshot.contact_id(), Some(ContactId::new(2)));
        assert_eq!(snapshot.phone_numbers(), &["333".to_string()]);
        assert!(!snapshot.matches_number("111"));
        assert!(snapshot.matches_number("333"));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut snapshot = VoicemailSnapshot::empty();
        snapshot.resolve(ContactId::new(7), vec!["5001".to_string()]);
        snapshot.clear();

        assert!(!snapshot.is_resolved());
        assert!(snapshot.phone_numbers().is_empty());
        assert!(!snapshot.matches_contact(ContactId::new(7)));
        assert!(!snapshot.matches_number("5001"));
    }

    #[test]
    fn test_numbers_without_identity_violate_invariant() {
        let snapshot: VoicemailSnapshot = serde_json::from_value(serde_json::json!({
            "contact_id": null,
            "phone_numbers": ["5001"]
        }))
        .unwrap();

        assert!(validate_snapshot(&snapshot).is_err());
    }
}
