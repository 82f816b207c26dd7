//! Conversation log roles.

use std::fmt::{Display, Formatter};

use assent_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Author of a recorded chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The end user asking questions.
    User,
    /// The agent answering them.
    Assistant,
}

impl MessageRole {
    /// Returns the persisted discriminator string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Parses a persisted discriminator string.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(AppError::Internal(format!("unknown message role '{other}'"))),
        }
    }
}

impl Display for MessageRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
