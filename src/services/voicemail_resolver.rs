// src/services/voicemail_resolver.rs
//
// Voicemail Identity Resolver - the reconciliation state machine.
//
// Correlates two asynchronous signals into one piece of derived state:
// filesystem notifications about the voicemail marker file, and contact-store
// query completions. Owns the watcher and the query service, and exposes the
// read-only query API the rest of the host application uses.
//
// CRITICAL RULES:
// - One spawned dispatch task consumes the event channel; events are handled
//   strictly in delivery order, one at a time
// - Snapshot, epoch and state live behind ONE lock; a completion's epoch is
//   verified and its result applied under the same write guard, so a
//   concurrent clear() can never interleave between check and write
// - Query completions are applied only when their epoch is still current;
//   clear() and every newly issued query bump the epoch
// - NotFound and Failed completions never wipe previously resolved data
// - Public reads never perform I/O and are valid in every state
// - Once resolved, watch events are ignored until clear() (the single
//   voicemail contact is expected to stay stable; re-provisioning is rare)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::config::VoicemailConfig;
use crate::domain::{validate_snapshot, ContactId, VoicemailSnapshot};
use crate::error::AppResult;
use crate::events::{QueryOutcome, ResolverEvent, ResolverEventKind};
use crate::infrastructure::{MarkerFileWatcher, NotifyPathWatcher, PathWatcher};
use crate::repositories::ContactRepository;
use crate::services::ContactQueryService;

/// Where the reconciliation currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolverState {
    Unresolved,
    QueryPending,
    Resolved,
}

/// Cheap observability snapshot for hosts and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolverStatus {
    pub state: ResolverState,
    pub epoch: u64,
}

/// The mutable heart of the resolver. Everything a completion touches sits
/// behind the same lock so epoch verification and the resulting mutation are
/// one atomic step.
struct ResolverCore {
    snapshot: VoicemailSnapshot,
    epoch: u64,
    state: ResolverState,
}

impl ResolverCore {
    fn settle(&mut self) {
        self.state = if self.snapshot.is_resolved() {
            ResolverState::Resolved
        } else {
            ResolverState::Unresolved
        };
    }
}

/// State shared between the resolver handle, the dispatch task, and the
/// query-service completions.
struct Shared {
    core: RwLock<ResolverCore>,
    query_service: ContactQueryService,
    marker_watcher: Mutex<MarkerFileWatcher>,
}

pub struct VoicemailIdentityResolver {
    shared: Arc<Shared>,
    event_tx: UnboundedSender<ResolverEvent>,
    // Taken by the dispatch task on initialize().
    event_rx: Mutex<Option<UnboundedReceiver<ResolverEvent>>>,
    task_handle: Mutex<Option<JoinHandle<()>>>,
    // Once shut down, the resolver stays down; initialize() becomes a no-op.
    shut_down: AtomicBool,
}

impl VoicemailIdentityResolver {
    /// Build a resolver over the platform filesystem watcher.
    pub fn new(
        config: VoicemailConfig,
        contact_repo: Arc<dyn ContactRepository>,
    ) -> AppResult<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let marker_dir = config.marker_dir();
        let marker_file = config.marker_file_path();
        let callback_tx = event_tx.clone();
        let path_watcher = NotifyPathWatcher::new(move |changed| {
            if let Some(kind) =
                MarkerFileWatcher::classify_change(&marker_dir, &marker_file, &changed)
            {
                // Send failure means the resolver was dropped; nothing to do.
                let _ = callback_tx.send(ResolverEvent::new(kind));
            }
        })?;

        Ok(Self::build(
            config,
            contact_repo,
            Box::new(path_watcher),
            event_tx,
            event_rx,
        ))
    }

    /// Build a resolver over a custom watch backend. Watch events must be
    /// delivered to the channel returned by [`event_sender`][Self::event_sender].
    pub fn with_path_watcher(
        config: VoicemailConfig,
        contact_repo: Arc<dyn ContactRepository>,
        path_watcher: Box<dyn PathWatcher>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self::build(config, contact_repo, path_watcher, event_tx, event_rx)
    }

    fn build(
        config: VoicemailConfig,
        contact_repo: Arc<dyn ContactRepository>,
        path_watcher: Box<dyn PathWatcher>,
        event_tx: UnboundedSender<ResolverEvent>,
        event_rx: UnboundedReceiver<ResolverEvent>,
    ) -> Self {
        let query_service = ContactQueryService::new(
            contact_repo,
            config.identity_marker.clone(),
            event_tx.clone(),
        );
        let marker_watcher = MarkerFileWatcher::new(&config, path_watcher);

        Self {
            shared: Arc::new(Shared {
                core: RwLock::new(ResolverCore {
                    snapshot: VoicemailSnapshot::empty(),
                    epoch: 0,
                    state: ResolverState::Unresolved,
                }),
                query_service,
                marker_watcher: Mutex::new(marker_watcher),
            }),
            event_tx,
            event_rx: Mutex::new(Some(event_rx)),
            task_handle: Mutex::new(None),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Establish the watches, issue the initial contact query and start the
    /// dispatch task. Idempotent; a no-op after shutdown(). Must run inside a
    /// tokio runtime.
    pub fn initialize(&self) {
        if self.shut_down.load(Ordering::SeqCst) {
            log::debug!("[VOICEMAIL] initialize() after shutdown ignored");
            return;
        }

        let mut handle = self.task_handle.lock().unwrap();
        if handle.is_some() {
            return;
        }

        self.shared.marker_watcher.lock().unwrap().start();

        // Unconditional initial query: a voicemail identity may already be
        // provisioned before we come up.
        issue_query(&self.shared);

        let receiver = self.event_rx.lock().unwrap().take();
        if let Some(mut receiver) = receiver {
            let shared = Arc::clone(&self.shared);
            *handle = Some(tokio::spawn(async move {
                while let Some(event) = receiver.recv().await {
                    handle_event(&shared, event);
                }
            }));
        }
    }

    /// Explicit external reset: identity and numbers are dropped immediately,
    /// and any in-flight completion is discarded against the new epoch. The
    /// wipe and the epoch bump happen under the same write guard the
    /// completion handler takes, so a completion either lands entirely before
    /// this reset or is discarded by it.
    pub fn clear(&self) {
        log::debug!("[VOICEMAIL] Clearing resolved voicemail identity");
        let mut core = self.shared.core.write().unwrap();
        core.snapshot.clear();
        core.epoch += 1;
        core.state = ResolverState::Unresolved;
    }

    /// Explicitly re-fetch the voicemail contact, superseding any query still
    /// in flight. Must run inside a tokio runtime.
    pub fn refresh(&self) {
        issue_query(&self.shared);
    }

    /// Abort the dispatch task and release both watch subscriptions. The
    /// resolver cannot be restarted afterwards.
    pub fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
        if let Some(task) = self.task_handle.lock().unwrap().take() {
            task.abort();
        }
        self.shared.marker_watcher.lock().unwrap().stop();
    }

    // ========================================================================
    // PUBLIC READ API - no I/O, valid in every state
    // ========================================================================

    /// True when `number` matches one of the resolved voicemail numbers.
    pub fn is_voicemail_number(&self, number: &str) -> bool {
        self.shared.core.read().unwrap().snapshot.matches_number(number)
    }

    /// True when `id` is the currently resolved voicemail contact.
    pub fn is_voicemail_contact(&self, id: ContactId) -> bool {
        self.shared.core.read().unwrap().snapshot.matches_contact(id)
    }

    pub fn current_contact_id(&self) -> Option<ContactId> {
        self.shared.core.read().unwrap().snapshot.contact_id()
    }

    pub fn status(&self) -> ResolverStatus {
        let core = self.shared.core.read().unwrap();
        ResolverStatus {
            state: core.state,
            epoch: core.epoch,
        }
    }

    /// Sender feeding the dispatch loop. Custom watch backends (and tests)
    /// deliver their events through this.
    pub fn event_sender(&self) -> UnboundedSender<ResolverEvent> {
        self.event_tx.clone()
    }
}

impl Drop for VoicemailIdentityResolver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ============================================================================
// STATE MACHINE DISPATCH
// ============================================================================

/// Bump the generation counter and start a fetch under the new epoch. An
/// older in-flight query is thereby superseded, not cancelled; its completion
/// fails the epoch check.
fn issue_query(shared: &Shared) {
    let epoch = {
        let mut core = shared.core.write().unwrap();
        core.epoch += 1;
        core.state = ResolverState::QueryPending;
        core.epoch
    };
    shared.query_service.fetch(epoch);
}

fn handle_event(shared: &Shared, event: ResolverEvent) {
    log::debug!("[VOICEMAIL] Handling {} event", event.event_type());

    match event.kind {
        ResolverEventKind::DirectoryChanged { .. } => handle_directory_changed(shared),
        ResolverEventKind::MarkerFileChanged { .. } => handle_marker_file_changed(shared),
        ResolverEventKind::QueryCompleted { epoch, outcome } => {
            handle_query_completed(shared, epoch, outcome)
        }
    }
}

fn handle_directory_changed(shared: &Shared) {
    if shared.core.read().unwrap().snapshot.is_resolved() {
        return;
    }

    let mut watcher = shared.marker_watcher.lock().unwrap();
    let exists = watcher.marker_file_exists();
    let watched = watcher.marker_file_watched();

    if exists && !watched {
        log::debug!("[VOICEMAIL] Marker file appeared, start monitoring it");
        watcher.watch_marker_file();
        drop(watcher);
        issue_query(shared);
    } else if !exists && watched {
        // Removed manually or by the provisioning stack. The previously
        // resolved identity stays active until clear().
        log::debug!("[VOICEMAIL] Marker file gone, stop monitoring it");
        watcher.unwatch_marker_file();
    }
    // exists == watched: unrelated directory entry, nothing to do.
}

fn handle_marker_file_changed(shared: &Shared) {
    if shared.core.read().unwrap().snapshot.is_resolved() {
        return;
    }

    let mut watcher = shared.marker_watcher.lock().unwrap();
    if !watcher.marker_file_exists() {
        // Removal is reported with the file path; same handling as a
        // directory-level disappearance.
        log::debug!("[VOICEMAIL] Marker file gone, stop monitoring it");
        watcher.unwatch_marker_file();
        return;
    }

    // Creation events also arrive with the file path; the subscribe is
    // idempotent so a plain rewrite passes straight through to the query.
    watcher.watch_marker_file();
    drop(watcher);
    issue_query(shared);
}

fn handle_query_completed(shared: &Shared, epoch: u64, outcome: QueryOutcome) {
    // Epoch verification and the resulting mutation share one write guard:
    // a clear() or newer query either happens-before this completion (the
    // epoch no longer matches, completion discarded) or happens-after the
    // completion has fully landed.
    let mut core = shared.core.write().unwrap();
    if epoch != core.epoch {
        log::debug!(
            "[VOICEMAIL] Discarding stale query completion (epoch {}, current {})",
            epoch,
            core.epoch
        );
        return;
    }

    match outcome {
        QueryOutcome::Found {
            contact_id,
            phone_numbers,
        } => {
            log::debug!(
                "[VOICEMAIL] Resolved voicemail contact {} with {} number(s)",
                contact_id,
                phone_numbers.len()
            );
            core.snapshot.resolve(contact_id, phone_numbers);
            debug_assert!(validate_snapshot(&core.snapshot).is_ok());
            core.state = ResolverState::Resolved;
        }
        QueryOutcome::NotFound => {
            // No matching contact right now is not evidence that an earlier
            // resolution became invalid; keep whatever we held.
            core.settle();
        }
        QueryOutcome::Failed { reason } => {
            log::warn!("[VOICEMAIL] Voicemail contact query failed: {}", reason);
            core.settle();
        }
    }
}
