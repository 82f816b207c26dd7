//! PostgreSQL-backed append-only decision log.

use async_trait::async_trait;
use sqlx::PgPool;

use assent_application::{ApprovalDecision, DecisionLog};
use assent_core::{AppError, AppResult};

/// PostgreSQL implementation of the decision log port.
///
/// Write-only from the core's perspective; the table is read by external
/// reporting.
#[derive(Clone)]
pub struct PostgresDecisionLogRepository {
    pool: PgPool,
}

impl PostgresDecisionLogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DecisionLog for PostgresDecisionLogRepository {
    async fn append(&self, decision: &ApprovalDecision) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO approval_decisions (request_id, subject, action, decided_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(decision.request_id.as_uuid())
        .bind(decision.subject.as_str())
        .bind(decision.action.as_str())
        .bind(decision.decided_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!("failed to append approval decision: {error}"))
        })?;

        Ok(())
    }
}
