// src/events/types.rs
//
// All events consumed by the resolver's dispatch loop.
// Each event represents an immutable fact that has already occurred.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events are immutable
// - Events carry only the data needed to react
// - No business logic in event types
//
// Both collaborators feed the same single-consumer channel: the filesystem
// watcher (directory / marker file changes) and the contact query service
// (epoch-tagged completions). The resolver processes them strictly in
// delivery order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::domain::ContactId;

/// Envelope around every event delivered to the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverEvent {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub kind: ResolverEventKind,
}

impl ResolverEvent {
    pub fn new(kind: ResolverEventKind) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            kind,
        }
    }

    /// Human-readable event type name
    pub fn event_type(&self) -> &'static str {
        match self.kind {
            ResolverEventKind::DirectoryChanged { .. } => "DirectoryChanged",
            ResolverEventKind::MarkerFileChanged { .. } => "MarkerFileChanged",
            ResolverEventKind::QueryCompleted { .. } => "QueryCompleted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResolverEventKind {
    /// Something changed inside the watched marker directory.
    DirectoryChanged { path: PathBuf },
    /// The marker file itself changed (rewritten, re-provisioned, removed).
    MarkerFileChanged { path: PathBuf },
    /// A contact query finished. `epoch` identifies the query generation;
    /// completions carrying a stale epoch are discarded by the resolver.
    QueryCompleted { epoch: u64, outcome: QueryOutcome },
}

/// Result of one contact-store query, delivered exactly once per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryOutcome {
    Found {
        contact_id: ContactId,
        phone_numbers: Vec<String>,
    },
    NotFound,
    Failed {
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        let event = ResolverEvent::new(ResolverEventKind::DirectoryChanged {
            path: PathBuf::from("/dev/shm/contacts"),
        });
        assert_eq!(event.event_type(), "DirectoryChanged");

        let event = ResolverEvent::new(ResolverEventKind::QueryCompleted {
            epoch: 3,
            outcome: QueryOutcome::NotFound,
        });
        assert_eq!(event.event_type(), "QueryCompleted");
    }

    #[test]
    fn test_outcome_round_trips_through_serde() {
        let outcome = QueryOutcome::Found {
            contact_id: ContactId::new(42),
            phone_numbers: vec!["5001".to_string()],
        };
        let json = serde_json::to_string(&outcome).unwrap();
        let back: QueryOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }
}
