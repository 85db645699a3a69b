// src/services/contact_query_service.rs
//
// Contact Query Service - single-flight voicemail contact fetch.
//
// CRITICAL RULES:
// - Every fetch delivers exactly one QueryCompleted event
// - Completions carry the epoch they were issued under; the resolver
//   discards completions whose epoch is no longer current
// - Store failures surface as QueryOutcome::Failed, never as a panic or an
//   unresolved future
// - Does NOT touch resolver state

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::events::{QueryOutcome, ResolverEvent, ResolverEventKind};
use crate::repositories::ContactRepository;

pub struct ContactQueryService {
    contact_repo: Arc<dyn ContactRepository>,
    identity_marker: String,
    event_tx: UnboundedSender<ResolverEvent>,
}

impl ContactQueryService {
    pub fn new(
        contact_repo: Arc<dyn ContactRepository>,
        identity_marker: String,
        event_tx: UnboundedSender<ResolverEvent>,
    ) -> Self {
        Self {
            contact_repo,
            identity_marker,
            event_tx,
        }
    }

    /// Issue one asynchronous fetch for the voicemail contact. The completion
    /// arrives on the resolver's event channel tagged with `epoch`.
    pub fn fetch(&self, epoch: u64) {
        let contact_repo = Arc::clone(&self.contact_repo);
        let marker = self.identity_marker.clone();
        let event_tx = self.event_tx.clone();

        log::debug!("[QUERY] Fetching voicemail contact (epoch {})", epoch);

        tokio::spawn(async move {
            let outcome = match contact_repo.fetch_by_guid(&marker).await {
                Ok(contacts) => {
                    log::debug!(
                        "[QUERY] Number of voicemail contacts returned: {}",
                        contacts.len()
                    );
                    // There should be just one voicemail contact (which can
                    // carry multiple numbers).
                    match contacts.into_iter().next() {
                        Some(contact) => QueryOutcome::Found {
                            contact_id: contact.id,
                            phone_numbers: contact.phone_numbers,
                        },
                        None => QueryOutcome::NotFound,
                    }
                }
                Err(e) => QueryOutcome::Failed {
                    reason: e.to_string(),
                },
            };

            // Send failure means the resolver is shutting down; the result
            // is moot at that point.
            let _ = event_tx.send(ResolverEvent::new(ResolverEventKind::QueryCompleted {
                epoch,
                outcome,
            }));
        });
    }
}
