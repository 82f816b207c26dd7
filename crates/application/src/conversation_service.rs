//! Conversation log: the chat transcript the agent and the approval flow
//! share.
//!
//! The log feeds two things: the "last pending question" used to derive a
//! personalized answer on the approved poll path, and the assistant-side
//! messages recorded around approval prompts and denials.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use assent_core::AppResult;
use assent_domain::MessageRole;

/// Chat message as persisted in the database.
#[derive(Debug, Clone)]
pub struct ChatMessageRecord {
    /// Message identifier.
    pub id: Uuid,
    /// Subject owning the conversation.
    pub subject: String,
    /// Author role.
    pub role: MessageRole,
    /// Message text.
    pub content: String,
    /// Whether this message asks the user to act on an approval.
    pub requires_approval: bool,
    /// When the message was recorded.
    pub created_at: DateTime<Utc>,
}

/// Repository port for conversation persistence.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Appends a message to the log.
    async fn append(&self, message: &ChatMessageRecord) -> AppResult<()>;

    /// Returns the subject's newest `user` message, if any.
    async fn last_user_message(&self, subject: &str) -> AppResult<Option<ChatMessageRecord>>;
}

/// Application service for the conversation log.
#[derive(Clone)]
pub struct ConversationService {
    repository: Arc<dyn ConversationRepository>,
}

impl ConversationService {
    /// Creates a new conversation service.
    #[must_use]
    pub fn new(repository: Arc<dyn ConversationRepository>) -> Self {
        Self { repository }
    }

    /// Records a message and returns the stored record.
    pub async fn record(
        &self,
        subject: &str,
        role: MessageRole,
        content: &str,
        requires_approval: bool,
    ) -> AppResult<ChatMessageRecord> {
        let record = ChatMessageRecord {
            id: Uuid::new_v4(),
            subject: subject.to_owned(),
            role,
            content: content.to_owned(),
            requires_approval,
            created_at: Utc::now(),
        };
        self.repository.append(&record).await?;
        Ok(record)
    }

    /// Returns the text of the subject's most recent question.
    pub async fn last_user_question(&self, subject: &str) -> AppResult<Option<String>> {
        Ok(self
            .repository
            .last_user_message(subject)
            .await?
            .map(|message| message.content))
    }
}
