// src/repositories/contact_repository.rs
//
// Contact store seam.
//
// The host application owns the real contact store; the resolver only needs
// one read-only operation: fetch the contacts tagged with a given identity
// marker, with their phone-number details.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::ContactId;
use crate::error::AppResult;

/// A contact record as returned by the store. Only the fields the resolver
/// consumes are modeled: the opaque identifier and the phone-number details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub phone_numbers: Vec<String>,
}

/// Read-only access to the external contact store.
///
/// Implementations must resolve the future rather than block indefinitely:
/// an unreachable store surfaces as `Err`, which the resolver treats as a
/// non-fatal query failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Fetch all contacts carrying the given identity-marker GUID.
    /// There is expected to be at most one voicemail contact, but the store
    /// contract returns a list.
    async fn fetch_by_guid(&self, guid: &str) -> AppResult<Vec<Contact>>;
}
