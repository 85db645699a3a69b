// Voicemail Resolver - derived voicemail contact identity for the comms host
//
// Architecture:
// - Domain-centric: identity snapshot and number matching live in `domain`
// - Event-driven: watcher and query completions feed one dispatch channel
// - Explicit: no singletons, no implicit event loops; the host constructs
//   and owns the resolver and injects its collaborators
// - Non-fatal by design: every failure is local and recoverable; the public
//   read API always answers from the last good snapshot

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod infrastructure;
pub mod repositories;
pub mod services;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use config::{VoicemailConfig, DEFAULT_VOICEMAIL_CONTACT_GUID};

pub use domain::{numbers_match, validate_snapshot, ContactId, VoicemailSnapshot};

pub use error::{AppError, AppResult};

pub use events::{QueryOutcome, ResolverEvent, ResolverEventKind};

pub use repositories::{Contact, ContactRepository};

pub use infrastructure::{MarkerFileWatcher, NotifyPathWatcher, PathWatcher};

pub use services::{
    ContactQueryService, ResolverState, ResolverStatus, VoicemailIdentityResolver,
};
