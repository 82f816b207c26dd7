//! PostgreSQL-backed conversation log repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use assent_application::{ChatMessageRecord, ConversationRepository};
use assent_core::{AppError, AppResult};
use assent_domain::MessageRole;

/// PostgreSQL implementation of the conversation repository port.
#[derive(Clone)]
pub struct PostgresConversationRepository {
    pool: PgPool,
}

impl PostgresConversationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for PostgresConversationRepository {
    async fn append(&self, message: &ChatMessageRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO conversation_messages
                (id, subject, role, content, requires_approval, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id)
        .bind(message.subject.as_str())
        .bind(message.role.as_str())
        .bind(message.content.as_str())
        .bind(message.requires_approval)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!("failed to append conversation message: {error}"))
        })?;

        Ok(())
    }

    async fn last_user_message(&self, subject: &str) -> AppResult<Option<ChatMessageRecord>> {
        let row = sqlx::query_as::<_, ConversationMessageRow>(
            r#"
            SELECT id, subject, role, content, requires_approval, created_at
            FROM conversation_messages
            WHERE subject = $1 AND role = 'user'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!("failed to fetch last user message: {error}"))
        })?;

        row.map(ConversationMessageRow::into_record).transpose()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ConversationMessageRow {
    id: uuid::Uuid,
    subject: String,
    role: String,
    content: String,
    requires_approval: bool,
    created_at: DateTime<Utc>,
}

impl ConversationMessageRow {
    fn into_record(self) -> AppResult<ChatMessageRecord> {
        Ok(ChatMessageRecord {
            id: self.id,
            subject: self.subject,
            role: MessageRole::parse(self.role.as_str())?,
            content: self.content,
            requires_approval: self.requires_approval,
            created_at: self.created_at,
        })
    }
}
