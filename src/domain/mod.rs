// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// This file MUST declare all domain modules and re-export their public API.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod identity;
pub mod phone_number;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Identity Domain
pub use identity::{validate_snapshot, ContactId, VoicemailSnapshot};

// Phone Number Matching
pub use phone_number::numbers_match;

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
