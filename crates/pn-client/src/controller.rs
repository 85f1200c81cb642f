//! Optimistic vote/report controller.
//!
//! Each (post, action kind) pair runs its own small state machine:
//!
//! ```text
//! Idle ──submit──▶ Submitting ──2xx──▶ Settled     (keep optimistic counts)
//!                      │       ──409──▶ Settled     (restore snapshot)
//!                      └──other/timeout──▶ Reverted (restore snapshot, retryable)
//! Reverted ──submit──▶ Submitting
//! ```
//!
//! The mutex guarding the counters is never held across the network await,
//! so a second call for the same slot observes `Submitting` and is skipped.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pn_core::error::{AppError, Result};
use pn_core::models::{ActionKind, Post, PostCounters, VoteKind};
use pn_core::wire::{ReportRequest, VoteRequest};

use crate::identity::IdentityContext;
use crate::ledger::DedupLedger;
use crate::transport::{ActionReply, BoardTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionState {
    #[default]
    Idle,
    Submitting,
    Settled,
    Reverted,
}

/// Why a submission never left the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InFlight,
    AlreadyActed,
    NotInitialized,
}

/// What a call to [`PostActions::vote`] or [`PostActions::report`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Skipped(SkipReason),
    /// Server accepted; counters keep the optimistic increment.
    Recorded,
    /// Server already had this action; counters restored.
    Duplicate,
    /// Request failed; counters restored and the slot can be retried.
    Reverted(AppError),
}

#[derive(Debug, Default)]
struct Slot {
    state: ActionState,
    error: Option<String>,
}

#[derive(Debug)]
struct Inner {
    counters: PostCounters,
    vote: Slot,
    report: Slot,
}

impl Inner {
    fn slot(&mut self, kind: ActionKind) -> &mut Slot {
        match kind {
            ActionKind::Vote => &mut self.vote,
            ActionKind::Report => &mut self.report,
        }
    }

    /// Copies back only the buckets `kind` touches, so an in-flight action
    /// of the other kind keeps its own optimistic change.
    fn restore(&mut self, kind: ActionKind, from: &PostCounters) {
        match kind {
            ActionKind::Vote => {
                self.counters.upvotes = from.upvotes;
                self.counters.downvotes = from.downvotes;
            }
            ActionKind::Report => self.counters.reports = from.reports,
        }
    }
}

pub struct PostActions {
    post_id: String,
    identity: Arc<IdentityContext>,
    votes: DedupLedger,
    reports: DedupLedger,
    transport: Arc<dyn BoardTransport>,
    timeout: Duration,
    inner: Mutex<Inner>,
}

impl PostActions {
    pub(crate) fn new(
        post: &Post,
        identity: Arc<IdentityContext>,
        votes: DedupLedger,
        reports: DedupLedger,
        transport: Arc<dyn BoardTransport>,
        timeout: Duration,
    ) -> Self {
        Self {
            post_id: post.id.to_string(),
            identity,
            votes,
            reports,
            transport,
            timeout,
            inner: Mutex::new(Inner {
                counters: post.counters(),
                vote: Slot::default(),
                report: Slot::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ledger(&self, kind: ActionKind) -> &DedupLedger {
        match kind {
            ActionKind::Vote => &self.votes,
            ActionKind::Report => &self.reports,
        }
    }

    pub fn counters(&self) -> PostCounters {
        self.lock().counters
    }

    pub fn state(&self, kind: ActionKind) -> ActionState {
        self.lock().slot(kind).state
    }

    pub fn last_error(&self, kind: ActionKind) -> Option<String> {
        self.lock().slot(kind).error.clone()
    }

    /// True once this client has voted/reported here, as far as it knows.
    pub fn has_acted(&self, kind: ActionKind) -> bool {
        self.state(kind) == ActionState::Settled || self.ledger(kind).has_acted(&self.post_id)
    }

    pub async fn vote(&self, kind: VoteKind) -> Submission {
        let snapshot = match self.begin(ActionKind::Vote, |counters| match kind {
            VoteKind::Up => counters.upvotes += 1,
            VoteKind::Down => counters.downvotes += 1,
        }) {
            Ok(snapshot) => snapshot,
            Err(reason) => return Submission::Skipped(reason),
        };

        let request = VoteRequest {
            post_id: Some(self.post_id.clone()),
            vote_kind: Some(kind.as_str().to_string()),
            fingerprint: Some(self.identity.fingerprint(&self.post_id, ActionKind::Vote)),
        };
        let reply = self.with_timeout(self.transport.submit_vote(&request)).await;
        self.settle(ActionKind::Vote, snapshot, reply)
    }

    pub async fn report(&self) -> Submission {
        let snapshot = match self.begin(ActionKind::Report, |counters| counters.reports += 1) {
            Ok(snapshot) => snapshot,
            Err(reason) => return Submission::Skipped(reason),
        };

        let request = ReportRequest {
            post_id: Some(self.post_id.clone()),
            fingerprint: Some(self.identity.fingerprint(&self.post_id, ActionKind::Report)),
        };
        let reply = self.with_timeout(self.transport.submit_report(&request)).await;
        self.settle(ActionKind::Report, snapshot, reply)
    }

    /// Entry guard plus the synchronous optimistic mutation.
    fn begin(
        &self,
        kind: ActionKind,
        apply: impl FnOnce(&mut PostCounters),
    ) -> std::result::Result<PostCounters, SkipReason> {
        let mut inner = self.lock();
        match inner.slot(kind).state {
            ActionState::Submitting => return Err(SkipReason::InFlight),
            ActionState::Settled => return Err(SkipReason::AlreadyActed),
            ActionState::Idle | ActionState::Reverted => {}
        }
        if self.ledger(kind).has_acted(&self.post_id) {
            return Err(SkipReason::AlreadyActed);
        }
        if !self.identity.is_initialized() {
            return Err(SkipReason::NotInitialized);
        }

        let snapshot = inner.counters;
        apply(&mut inner.counters);
        *inner.slot(kind) = Slot {
            state: ActionState::Submitting,
            error: None,
        };
        Ok(snapshot)
    }

    async fn with_timeout<F>(&self, request: F) -> Result<ActionReply>
    where
        F: Future<Output = Result<ActionReply>>,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(reply) => reply,
            Err(_) => Err(AppError::Network(format!(
                "request timed out after {:?}",
                self.timeout
            ))),
        }
    }

    fn settle(&self, kind: ActionKind, snapshot: PostCounters, reply: Result<ActionReply>) -> Submission {
        let mut inner = self.lock();
        match reply {
            Ok(ActionReply::Accepted(server)) => {
                self.ledger(kind).mark_acted(&self.post_id);
                if let Some(server) = server {
                    // adopt the authoritative numbers for our own buckets
                    inner.restore(kind, &server);
                }
                *inner.slot(kind) = Slot {
                    state: ActionState::Settled,
                    error: None,
                };
                Submission::Recorded
            }
            Ok(ActionReply::Duplicate) => {
                // the local ledger was stale
                self.ledger(kind).mark_acted(&self.post_id);
                inner.restore(kind, &snapshot);
                *inner.slot(kind) = Slot {
                    state: ActionState::Settled,
                    error: None,
                };
                Submission::Duplicate
            }
            Err(err) => {
                log::warn!("{} on post {} failed: {}", kind, self.post_id, err);
                inner.restore(kind, &snapshot);
                *inner.slot(kind) = Slot {
                    state: ActionState::Reverted,
                    error: Some(format!("{kind} failed")),
                };
                Submission::Reverted(err)
            }
        }
    }
}
