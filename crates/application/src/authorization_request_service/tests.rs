use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use assent_core::{AppError, AppResult};
use assent_domain::{
    AuthRequestId, DEFAULT_SCOPE, REQUEST_TTL_SECONDS, RequestStatus, ResolveAction,
    expires_at_for, is_live,
};

use super::{
    ApprovalDecision, AuthorizationRequestRecord, AuthorizationRequestRepository,
    AuthorizationRequestService, DecisionLog, DenialNotifier, ResolveError,
};

#[derive(Default)]
struct FakeAuthorizationRequestRepository {
    rows: Mutex<HashMap<Uuid, AuthorizationRequestRecord>>,
}

impl FakeAuthorizationRequestRepository {
    async fn stored_status(&self, request_id: AuthRequestId) -> Option<RequestStatus> {
        self.rows
            .lock()
            .await
            .get(&request_id.as_uuid())
            .map(|row| row.status)
    }
}

#[async_trait]
impl AuthorizationRequestRepository for FakeAuthorizationRequestRepository {
    async fn insert(&self, record: &AuthorizationRequestRecord) -> AppResult<()> {
        self.rows
            .lock()
            .await
            .insert(record.request_id.as_uuid(), record.clone());
        Ok(())
    }

    async fn find(
        &self,
        request_id: AuthRequestId,
        subject: &str,
    ) -> AppResult<Option<AuthorizationRequestRecord>> {
        Ok(self
            .rows
            .lock()
            .await
            .get(&request_id.as_uuid())
            .filter(|row| row.subject == subject)
            .cloned())
    }

    async fn list_pending_live(
        &self,
        subject: &str,
        now: chrono::DateTime<Utc>,
    ) -> AppResult<Vec<AuthorizationRequestRecord>> {
        let rows = self.rows.lock().await;
        let mut live: Vec<AuthorizationRequestRecord> = rows
            .values()
            .filter(|row| {
                row.subject == subject
                    && row.status == RequestStatus::Pending
                    && is_live(row.expires_at, now)
            })
            .cloned()
            .collect();
        live.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then(right.request_id.as_uuid().cmp(&left.request_id.as_uuid()))
        });
        Ok(live)
    }

    async fn resolve_if_pending(
        &self,
        request_id: AuthRequestId,
        subject: &str,
        action: ResolveAction,
        now: chrono::DateTime<Utc>,
    ) -> AppResult<Option<AuthorizationRequestRecord>> {
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&request_id.as_uuid()) {
            Some(row)
                if row.subject == subject
                    && row.status == RequestStatus::Pending
                    && is_live(row.expires_at, now) =>
            {
                row.status = action.status();
                row.updated_at = now;
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn expire_if_pending(
        &self,
        request_id: AuthRequestId,
        subject: &str,
        now: chrono::DateTime<Utc>,
    ) -> AppResult<Option<AuthorizationRequestRecord>> {
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&request_id.as_uuid()) {
            Some(row)
                if row.subject == subject
                    && row.status == RequestStatus::Pending
                    && !is_live(row.expires_at, now) =>
            {
                row.status = RequestStatus::Expired;
                row.updated_at = now;
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn expire_overdue(&self, now: chrono::DateTime<Utc>) -> AppResult<u64> {
        let mut rows = self.rows.lock().await;
        let mut flipped = 0;
        for row in rows.values_mut() {
            if row.status == RequestStatus::Pending && !is_live(row.expires_at, now) {
                row.status = RequestStatus::Expired;
                row.updated_at = now;
                flipped += 1;
            }
        }
        Ok(flipped)
    }
}

#[derive(Default)]
struct FakeDecisionLog {
    entries: Mutex<Vec<ApprovalDecision>>,
}

#[async_trait]
impl DecisionLog for FakeDecisionLog {
    async fn append(&self, decision: &ApprovalDecision) -> AppResult<()> {
        self.entries.lock().await.push(decision.clone());
        Ok(())
    }
}

struct FailingDecisionLog;

#[async_trait]
impl DecisionLog for FailingDecisionLog {
    async fn append(&self, _decision: &ApprovalDecision) -> AppResult<()> {
        Err(AppError::Unavailable("decision log offline".to_owned()))
    }
}

#[derive(Default)]
struct FakeDenialNotifier {
    notified: Mutex<Vec<String>>,
}

#[async_trait]
impl DenialNotifier for FakeDenialNotifier {
    async fn denial_recorded(&self, subject: &str) -> AppResult<()> {
        self.notified.lock().await.push(subject.to_owned());
        Ok(())
    }
}

struct Harness {
    service: AuthorizationRequestService,
    repository: Arc<FakeAuthorizationRequestRepository>,
    decision_log: Arc<FakeDecisionLog>,
    notifier: Arc<FakeDenialNotifier>,
}

fn harness() -> Harness {
    let repository = Arc::new(FakeAuthorizationRequestRepository::default());
    let decision_log = Arc::new(FakeDecisionLog::default());
    let notifier = Arc::new(FakeDenialNotifier::default());
    let service = AuthorizationRequestService::new(
        repository.clone(),
        decision_log.clone(),
        notifier.clone(),
    );
    Harness {
        service,
        repository,
        decision_log,
        notifier,
    }
}

async fn create_request(harness: &Harness, subject: &str) -> AuthRequestId {
    match harness
        .service
        .create_request(subject, "AI wants to access your personal information", DEFAULT_SCOPE)
        .await
    {
        Ok(record) => record.request_id,
        Err(error) => panic!("failed to create request: {error}"),
    }
}

async fn insert_overdue(harness: &Harness, subject: &str) -> AuthRequestId {
    let created_at = Utc::now() - TimeDelta::seconds(2 * REQUEST_TTL_SECONDS);
    let record = AuthorizationRequestRecord {
        request_id: AuthRequestId::new(),
        subject: subject.to_owned(),
        binding_message: "AI wants to access your personal information".to_owned(),
        scope: DEFAULT_SCOPE.to_owned(),
        status: RequestStatus::Pending,
        created_at,
        expires_at: expires_at_for(created_at),
        updated_at: created_at,
    };
    if let Err(error) = harness.repository.insert(&record).await {
        panic!("failed to seed overdue request: {error}");
    }
    record.request_id
}

#[tokio::test]
async fn create_then_poll_returns_pending_with_no_mutation() {
    let harness = harness();
    let request_id = create_request(&harness, "auth0|alice").await;

    let polled = harness.service.poll_outcome(request_id, "auth0|alice").await;
    match polled {
        Ok(record) => assert_eq!(record.status, RequestStatus::Pending),
        Err(error) => panic!("poll failed: {error}"),
    }
    assert!(harness.decision_log.entries.lock().await.is_empty());
}

#[tokio::test]
async fn create_rejects_empty_binding_message() {
    let harness = harness();
    let result = harness
        .service
        .create_request("auth0|alice", "   ", DEFAULT_SCOPE)
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn full_approval_flow_reaches_approved() {
    let harness = harness();
    let request_id = create_request(&harness, "auth0|alice").await;

    let pending = match harness.service.list_pending("auth0|alice").await {
        Ok(pending) => pending,
        Err(error) => panic!("list_pending failed: {error}"),
    };
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].request_id, request_id);
    assert_eq!(pending[0].scope, DEFAULT_SCOPE);

    let resolved = harness
        .service
        .resolve(request_id, "auth0|alice", ResolveAction::Approved)
        .await;
    match resolved {
        Ok(record) => assert_eq!(record.status, RequestStatus::Approved),
        Err(error) => panic!("resolve failed: {error}"),
    }

    let polled = harness.service.poll_outcome(request_id, "auth0|alice").await;
    match polled {
        Ok(record) => assert_eq!(record.status, RequestStatus::Approved),
        Err(error) => panic!("poll failed: {error}"),
    }

    let entries = harness.decision_log.entries.lock().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, ResolveAction::Approved);
    assert!(harness.notifier.notified.lock().await.is_empty());
}

#[tokio::test]
async fn overdue_request_resolves_to_expired_and_stays_expired() {
    let harness = harness();
    let request_id = insert_overdue(&harness, "auth0|alice").await;

    let resolved = harness
        .service
        .resolve(request_id, "auth0|alice", ResolveAction::Approved)
        .await;
    assert!(matches!(resolved, Err(ResolveError::Expired)));
    assert_eq!(
        harness.repository.stored_status(request_id).await,
        Some(RequestStatus::Expired)
    );

    let polled = harness.service.poll_outcome(request_id, "auth0|alice").await;
    match polled {
        Ok(record) => assert_eq!(record.status, RequestStatus::Expired),
        Err(error) => panic!("poll failed: {error}"),
    }
    assert!(harness.decision_log.entries.lock().await.is_empty());
}

#[tokio::test]
async fn poll_lazily_expires_an_overdue_pending_row() {
    let harness = harness();
    let request_id = insert_overdue(&harness, "auth0|alice").await;

    let polled = harness.service.poll_outcome(request_id, "auth0|alice").await;
    match polled {
        Ok(record) => assert_eq!(record.status, RequestStatus::Expired),
        Err(error) => panic!("poll failed: {error}"),
    }
    assert_eq!(
        harness.repository.stored_status(request_id).await,
        Some(RequestStatus::Expired)
    );
}

#[tokio::test]
async fn duplicate_resolve_reports_the_first_decision() {
    let harness = harness();
    let request_id = create_request(&harness, "auth0|alice").await;

    let denied = harness
        .service
        .resolve(request_id, "auth0|alice", ResolveAction::Denied)
        .await;
    assert!(denied.is_ok());

    let second = harness
        .service
        .resolve(request_id, "auth0|alice", ResolveAction::Approved)
        .await;
    match second {
        Err(ResolveError::AlreadyResolved { current }) => {
            assert_eq!(current, RequestStatus::Denied);
        }
        other => panic!("expected AlreadyResolved, got {other:?}"),
    }

    assert_eq!(
        harness.repository.stored_status(request_id).await,
        Some(RequestStatus::Denied)
    );
    // one decision entry per resolution, none for the rejected duplicate
    assert_eq!(harness.decision_log.entries.lock().await.len(), 1);
    assert_eq!(
        harness.notifier.notified.lock().await.as_slice(),
        ["auth0|alice"]
    );
}

#[tokio::test]
async fn concurrent_resolves_have_exactly_one_winner() {
    let harness = harness();
    let request_id = create_request(&harness, "auth0|alice").await;

    let (first, second) = tokio::join!(
        harness
            .service
            .resolve(request_id, "auth0|alice", ResolveAction::Approved),
        harness
            .service
            .resolve(request_id, "auth0|alice", ResolveAction::Denied),
    );

    let results = [first, second];
    let winner_status = results
        .iter()
        .find_map(|result| result.as_ref().ok().map(|record| record.status));
    let Some(winner_status) = winner_status else {
        panic!("expected one resolve to win");
    };

    let losers: Vec<&ResolveError> = results
        .iter()
        .filter_map(|result| result.as_ref().err())
        .collect();
    assert_eq!(losers.len(), 1);
    match losers[0] {
        ResolveError::AlreadyResolved { current } => assert_eq!(*current, winner_status),
        other => panic!("expected AlreadyResolved for the loser, got {other:?}"),
    }

    assert_eq!(harness.decision_log.entries.lock().await.len(), 1);
}

#[tokio::test]
async fn list_pending_filters_stale_rows_without_mutating_them() {
    let harness = harness();
    let live_id = create_request(&harness, "auth0|alice").await;
    let stale_id = insert_overdue(&harness, "auth0|alice").await;
    create_request(&harness, "auth0|bob").await;

    let pending = match harness.service.list_pending("auth0|alice").await {
        Ok(pending) => pending,
        Err(error) => panic!("list_pending failed: {error}"),
    };
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].request_id, live_id);

    // the stale row keeps its persisted pending status until a resolution
    // path touches it
    assert_eq!(
        harness.repository.stored_status(stale_id).await,
        Some(RequestStatus::Pending)
    );
}

#[tokio::test]
async fn poll_after_approval_is_idempotent() {
    let harness = harness();
    let request_id = create_request(&harness, "auth0|alice").await;
    let resolved = harness
        .service
        .resolve(request_id, "auth0|alice", ResolveAction::Approved)
        .await;
    assert!(resolved.is_ok());

    for _ in 0..3 {
        let polled = harness.service.poll_outcome(request_id, "auth0|alice").await;
        match polled {
            Ok(record) => assert_eq!(record.status, RequestStatus::Approved),
            Err(error) => panic!("poll failed: {error}"),
        }
    }
}

#[tokio::test]
async fn unknown_and_foreign_requests_are_not_found() {
    let harness = harness();
    let request_id = create_request(&harness, "auth0|alice").await;

    let unknown = harness
        .service
        .resolve(AuthRequestId::new(), "auth0|alice", ResolveAction::Approved)
        .await;
    assert!(matches!(unknown, Err(ResolveError::NotFound)));

    // another subject's id reads as if it never existed
    let foreign = harness
        .service
        .resolve(request_id, "auth0|mallory", ResolveAction::Approved)
        .await;
    assert!(matches!(foreign, Err(ResolveError::NotFound)));

    let foreign_poll = harness
        .service
        .poll_outcome(request_id, "auth0|mallory")
        .await;
    assert!(matches!(foreign_poll, Err(ResolveError::NotFound)));
}

#[tokio::test]
async fn decision_log_failure_does_not_roll_back_the_transition() {
    let repository = Arc::new(FakeAuthorizationRequestRepository::default());
    let notifier = Arc::new(FakeDenialNotifier::default());
    let service = AuthorizationRequestService::new(
        repository.clone(),
        Arc::new(FailingDecisionLog),
        notifier.clone(),
    );

    let record = match service
        .create_request("auth0|alice", "AI wants profile access", DEFAULT_SCOPE)
        .await
    {
        Ok(record) => record,
        Err(error) => panic!("failed to create request: {error}"),
    };

    let resolved = service
        .resolve(record.request_id, "auth0|alice", ResolveAction::Approved)
        .await;
    assert!(resolved.is_ok());
    assert_eq!(
        repository.stored_status(record.request_id).await,
        Some(RequestStatus::Approved)
    );
}

#[tokio::test]
async fn expire_overdue_flips_only_overdue_pending_rows() {
    let harness = harness();
    let live_id = create_request(&harness, "auth0|alice").await;
    let stale_id = insert_overdue(&harness, "auth0|alice").await;

    let flipped = match harness.repository.expire_overdue(Utc::now()).await {
        Ok(flipped) => flipped,
        Err(error) => panic!("expire_overdue failed: {error}"),
    };
    assert_eq!(flipped, 1);
    assert_eq!(
        harness.repository.stored_status(stale_id).await,
        Some(RequestStatus::Expired)
    );
    assert_eq!(
        harness.repository.stored_status(live_id).await,
        Some(RequestStatus::Pending)
    );
}
