//! Authorization request lifecycle: creation, listing, resolution, polling.
//!
//! Requests are time-limited single-decision records. All shared state lives
//! in the durable store; the only cross-call ordering requirement is the
//! conditional update in [`AuthorizationRequestRepository::resolve_if_pending`],
//! which serializes concurrent approve/deny/expiry writers with exactly one
//! winner.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use assent_core::{AppError, AppResult};
use assent_domain::{AuthRequestId, RequestStatus, ResolveAction, expires_at_for, is_live};

#[cfg(test)]
mod tests;

/// Authorization request as persisted in the database.
#[derive(Debug, Clone)]
pub struct AuthorizationRequestRecord {
    /// Opaque caller-visible identifier, generated at creation.
    pub request_id: AuthRequestId,
    /// Subject who must approve; set from the authenticated creator.
    pub subject: String,
    /// Human-readable description shown to the approving user.
    pub binding_message: String,
    /// Space-delimited requested permissions.
    pub scope: String,
    /// Current lifecycle status.
    pub status: RequestStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Instant after which the request is unresolvable.
    pub expires_at: DateTime<Utc>,
    /// Timestamp of the last status mutation.
    pub updated_at: DateTime<Utc>,
}

/// Audit record of a resolving decision. One entry per resolution; rejected
/// duplicate attempts produce none.
#[derive(Debug, Clone)]
pub struct ApprovalDecision {
    /// The resolved request.
    pub request_id: AuthRequestId,
    /// The deciding subject.
    pub subject: String,
    /// The action taken.
    pub action: ResolveAction,
    /// When the decision was recorded.
    pub decided_at: DateTime<Utc>,
}

/// Repository port for authorization request persistence.
///
/// The two `*_if_pending` operations are conditional updates
/// (`UPDATE ... WHERE status = 'pending'` semantics) and return the updated
/// row only when the caller won the write; `None` means another writer got
/// there first and the caller must re-read to classify the loss.
#[async_trait]
pub trait AuthorizationRequestRepository: Send + Sync {
    /// Persists a new `pending` request.
    async fn insert(&self, record: &AuthorizationRequestRecord) -> AppResult<()>;

    /// Fetches a request by id, scoped to the owning subject.
    ///
    /// A request belonging to a different subject is indistinguishable from
    /// one that never existed.
    async fn find(
        &self,
        request_id: AuthRequestId,
        subject: &str,
    ) -> AppResult<Option<AuthorizationRequestRecord>>;

    /// Lists the subject's `pending` requests with `expires_at > now`,
    /// newest first. Read-only: stale rows are filtered, never mutated.
    async fn list_pending_live(
        &self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<AuthorizationRequestRecord>>;

    /// Atomically transitions `pending -> action` if the row is still
    /// pending and live at write time.
    async fn resolve_if_pending(
        &self,
        request_id: AuthRequestId,
        subject: &str,
        action: ResolveAction,
        now: DateTime<Utc>,
    ) -> AppResult<Option<AuthorizationRequestRecord>>;

    /// Atomically transitions `pending -> expired` if the row is still
    /// pending and overdue at write time.
    async fn expire_if_pending(
        &self,
        request_id: AuthRequestId,
        subject: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<AuthorizationRequestRecord>>;

    /// Bulk-expires every overdue `pending` row. Reconciliation hygiene for
    /// the background sweeper; returns the number of rows flipped.
    async fn expire_overdue(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Append-only log of resolving decisions, consumed by external reporting.
#[async_trait]
pub trait DecisionLog: Send + Sync {
    /// Appends one decision entry.
    async fn append(&self, decision: &ApprovalDecision) -> AppResult<()>;
}

/// Side-channel notification emitted when a subject denies a request.
///
/// Fired post-commit; a failure here never rolls back the transition.
#[async_trait]
pub trait DenialNotifier: Send + Sync {
    /// Reports that `subject` denied an authorization request.
    async fn denial_recorded(&self, subject: &str) -> AppResult<()>;
}

/// Failure modes of [`AuthorizationRequestService::resolve`] and
/// [`AuthorizationRequestService::poll_outcome`].
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No matching request for that subject, live or terminal.
    #[error("authorization request not found")]
    NotFound,

    /// The request already reached a terminal status. Benign for retries and
    /// race losers; carries the status that actually won.
    #[error("authorization request already {current}")]
    AlreadyResolved {
        /// The terminal status the request holds.
        current: RequestStatus,
    },

    /// The TTL elapsed before a decision.
    #[error("authorization request expired")]
    Expired,

    /// The datastore failed underneath the state machine.
    #[error(transparent)]
    Store(#[from] AppError),
}

/// Application service owning the authorization request state machine.
#[derive(Clone)]
pub struct AuthorizationRequestService {
    repository: Arc<dyn AuthorizationRequestRepository>,
    decision_log: Arc<dyn DecisionLog>,
    denial_notifier: Arc<dyn DenialNotifier>,
}

impl AuthorizationRequestService {
    /// Creates a new authorization request service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AuthorizationRequestRepository>,
        decision_log: Arc<dyn DecisionLog>,
        denial_notifier: Arc<dyn DenialNotifier>,
    ) -> Self {
        Self {
            repository,
            decision_log,
            denial_notifier,
        }
    }

    /// Creates a fresh `pending` request expiring one TTL from now.
    pub async fn create_request(
        &self,
        subject: &str,
        binding_message: &str,
        scope: &str,
    ) -> AppResult<AuthorizationRequestRecord> {
        if binding_message.trim().is_empty() {
            return Err(AppError::Validation(
                "binding message must not be empty".to_owned(),
            ));
        }

        let now = Utc::now();
        let record = AuthorizationRequestRecord {
            request_id: AuthRequestId::new(),
            subject: subject.to_owned(),
            binding_message: binding_message.to_owned(),
            scope: scope.to_owned(),
            status: RequestStatus::Pending,
            created_at: now,
            expires_at: expires_at_for(now),
            updated_at: now,
        };

        self.repository.insert(&record).await?;
        Ok(record)
    }

    /// Returns the subject's pending-and-live requests, newest first.
    ///
    /// Pure liveness filter: rows past `expires_at` are omitted but left
    /// untouched; only the resolution path flips them to `expired`.
    pub async fn list_pending(&self, subject: &str) -> AppResult<Vec<AuthorizationRequestRecord>> {
        self.repository.list_pending_live(subject, Utc::now()).await
    }

    /// Applies the subject's decision to a pending request.
    ///
    /// Exactly one of two concurrent resolve calls for the same request can
    /// succeed; the loser observes [`ResolveError::AlreadyResolved`] with the
    /// winner's status. A request past its TTL is flipped to `expired` and
    /// reported as [`ResolveError::Expired`].
    pub async fn resolve(
        &self,
        request_id: AuthRequestId,
        subject: &str,
        action: ResolveAction,
    ) -> Result<AuthorizationRequestRecord, ResolveError> {
        let now = Utc::now();
        let existing = self
            .repository
            .find(request_id, subject)
            .await?
            .ok_or(ResolveError::NotFound)?;

        if existing.status != RequestStatus::Pending {
            return Err(ResolveError::AlreadyResolved {
                current: existing.status,
            });
        }

        if !is_live(existing.expires_at, now) {
            return Err(self.expire_stale(request_id, subject, now).await?);
        }

        match self
            .repository
            .resolve_if_pending(request_id, subject, action, now)
            .await?
        {
            Some(resolved) => {
                self.record_decision(&resolved, action, now).await;
                if action == ResolveAction::Denied {
                    self.notify_denied(subject).await;
                }
                Ok(resolved)
            }
            None => {
                // Lost the conditional update: either a concurrent resolver
                // won or the row crossed its TTL between read and write.
                let current = self
                    .repository
                    .find(request_id, subject)
                    .await?
                    .ok_or(ResolveError::NotFound)?;
                match current.status {
                    RequestStatus::Pending => {
                        Err(self.expire_stale(request_id, subject, now).await?)
                    }
                    RequestStatus::Expired => Err(ResolveError::Expired),
                    status => Err(ResolveError::AlreadyResolved { current: status }),
                }
            }
        }
    }

    /// Returns the current status snapshot of a request.
    ///
    /// Read-only except for the lazy expiry flip on an overdue pending row.
    /// Safe to call repeatedly after resolution; terminal rows are never
    /// deleted.
    pub async fn poll_outcome(
        &self,
        request_id: AuthRequestId,
        subject: &str,
    ) -> Result<AuthorizationRequestRecord, ResolveError> {
        let now = Utc::now();
        let existing = self
            .repository
            .find(request_id, subject)
            .await?
            .ok_or(ResolveError::NotFound)?;

        if existing.status == RequestStatus::Pending && !is_live(existing.expires_at, now) {
            if let Some(expired) = self
                .repository
                .expire_if_pending(request_id, subject, now)
                .await?
            {
                return Ok(expired);
            }

            // A concurrent writer reached the row first; report its outcome.
            return self
                .repository
                .find(request_id, subject)
                .await?
                .ok_or(ResolveError::NotFound);
        }

        Ok(existing)
    }

    /// Flips an overdue pending row to `expired` and classifies the outcome
    /// for the caller that observed the expiry.
    async fn expire_stale(
        &self,
        request_id: AuthRequestId,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<ResolveError, AppError> {
        if self
            .repository
            .expire_if_pending(request_id, subject, now)
            .await?
            .is_some()
        {
            return Ok(ResolveError::Expired);
        }

        let current = self.repository.find(request_id, subject).await?;
        Ok(match current {
            Some(record) if record.status == RequestStatus::Expired => ResolveError::Expired,
            Some(record) if record.status.is_terminal() => ResolveError::AlreadyResolved {
                current: record.status,
            },
            // Still pending under a divergent clock; the caller's view is
            // expired either way and the next reader converges the row.
            _ => ResolveError::Expired,
        })
    }

    async fn record_decision(
        &self,
        record: &AuthorizationRequestRecord,
        action: ResolveAction,
        decided_at: DateTime<Utc>,
    ) {
        let decision = ApprovalDecision {
            request_id: record.request_id,
            subject: record.subject.clone(),
            action,
            decided_at,
        };

        // Post-commit append: the transition stands even when the log write
        // fails; surface the failure for reconciliation.
        if let Err(error) = self.decision_log.append(&decision).await {
            warn!(
                request_id = %record.request_id,
                error = %error,
                "failed to append approval decision"
            );
        }
    }

    async fn notify_denied(&self, subject: &str) {
        if let Err(error) = self.denial_notifier.denial_recorded(subject).await {
            warn!(error = %error, "failed to emit denial notification");
        }
    }
}
