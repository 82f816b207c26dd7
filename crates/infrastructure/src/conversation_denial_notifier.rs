//! Denial notification adapter backed by the conversation log.

use async_trait::async_trait;

use assent_application::{ConversationService, DenialNotifier};
use assent_core::AppResult;
use assent_domain::MessageRole;

/// Message posted to the chat when the user denies profile access.
const DENIAL_MESSAGE: &str = "You denied access to your personal information. \
    I can only answer general questions without that access.";

/// Posts the fixed denial advisory into the subject's conversation.
///
/// Invoked post-commit by the resolution path; failures are reported, never
/// rolled back into the transition.
#[derive(Clone)]
pub struct ConversationDenialNotifier {
    conversation: ConversationService,
}

impl ConversationDenialNotifier {
    /// Creates a notifier writing through the given conversation service.
    #[must_use]
    pub fn new(conversation: ConversationService) -> Self {
        Self { conversation }
    }
}

#[async_trait]
impl DenialNotifier for ConversationDenialNotifier {
    async fn denial_recorded(&self, subject: &str) -> AppResult<()> {
        self.conversation
            .record(subject, MessageRole::Assistant, DENIAL_MESSAGE, false)
            .await?;
        Ok(())
    }
}
