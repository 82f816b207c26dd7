//! PostgreSQL-backed authorization request repository.
//!
//! The resolution and expiry writes are conditional updates
//! (`... WHERE status = 'pending'`) so concurrent writers for the same row
//! serialize with exactly one winner; no external lock is involved.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use assent_application::{AuthorizationRequestRecord, AuthorizationRequestRepository};
use assent_core::{AppError, AppResult};
use assent_domain::{AuthRequestId, RequestStatus, ResolveAction};


/// PostgreSQL implementation of the authorization request repository port.
#[derive(Clone)]
pub struct PostgresAuthorizationRequestRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRequestRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const REQUEST_COLUMNS: &str =
    "request_id, subject, binding_message, scope, status, created_at, expires_at, updated_at";

#[async_trait]
impl AuthorizationRequestRepository for PostgresAuthorizationRequestRepository {
    async fn insert(&self, record: &AuthorizationRequestRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO authorization_requests
                (request_id, subject, binding_message, scope, status, created_at, expires_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.request_id.as_uuid())
        .bind(record.subject.as_str())
        .bind(record.binding_message.as_str())
        .bind(record.scope.as_str())
        .bind(record.status.as_str())
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!("failed to insert authorization request: {error}"))
        })?;

        Ok(())
    }

    async fn find(
        &self,
        request_id: AuthRequestId,
        subject: &str,
    ) -> AppResult<Option<AuthorizationRequestRecord>> {
        let row = sqlx::query_as::<_, AuthorizationRequestRow>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM authorization_requests
            WHERE request_id = $1 AND subject = $2
            "#
        ))
        .bind(request_id.as_uuid())
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!("failed to fetch authorization request: {error}"))
        })?;

        row.map(AuthorizationRequestRow::into_record).transpose()
    }

    async fn list_pending_live(
        &self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<AuthorizationRequestRecord>> {
        let rows = sqlx::query_as::<_, AuthorizationRequestRow>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM authorization_requests
            WHERE subject = $1 AND status = 'pending' AND expires_at > $2
            ORDER BY created_at DESC, request_id DESC
            "#
        ))
        .bind(subject)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!("failed to list pending authorization requests: {error}"))
        })?;

        rows.into_iter()
            .map(AuthorizationRequestRow::into_record)
            .collect()
    }

    async fn resolve_if_pending(
        &self,
        request_id: AuthRequestId,
        subject: &str,
        action: ResolveAction,
        now: DateTime<Utc>,
    ) -> AppResult<Option<AuthorizationRequestRecord>> {
        let row = sqlx::query_as::<_, AuthorizationRequestRow>(&format!(
            r#"
            UPDATE authorization_requests
            SET status = $3, updated_at = $4
            WHERE request_id = $1
              AND subject = $2
              AND status = 'pending'
              AND expires_at > $4
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(request_id.as_uuid())
        .bind(subject)
        .bind(action.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!("failed to resolve authorization request: {error}"))
        })?;

        row.map(AuthorizationRequestRow::into_record).transpose()
    }

    async fn expire_if_pending(
        &self,
        request_id: AuthRequestId,
        subject: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<AuthorizationRequestRecord>> {
        let row = sqlx::query_as::<_, AuthorizationRequestRow>(&format!(
            r#"
            UPDATE authorization_requests
            SET status = 'expired', updated_at = $3
            WHERE request_id = $1
              AND subject = $2
              AND status = 'pending'
              AND expires_at <= $3
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(request_id.as_uuid())
        .bind(subject)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!("failed to expire authorization request: {error}"))
        })?;

        row.map(AuthorizationRequestRow::into_record).transpose()
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE authorization_requests
            SET status = 'expired', updated_at = $1
            WHERE status = 'pending' AND expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!("failed to expire overdue authorization requests: {error}"))
        })?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AuthorizationRequestRow {
    request_id: uuid::Uuid,
    subject: String,
    binding_message: String,
    scope: String,
    status: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AuthorizationRequestRow {
    fn into_record(self) -> AppResult<AuthorizationRequestRecord> {
        Ok(AuthorizationRequestRecord {
            request_id: AuthRequestId::from_uuid(self.request_id),
            subject: self.subject,
            binding_message: self.binding_message,
            scope: self.scope,
            status: RequestStatus::parse(self.status.as_str())?,
            created_at: self.created_at,
            expires_at: self.expires_at,
            updated_at: self.updated_at,
        })
    }
}
