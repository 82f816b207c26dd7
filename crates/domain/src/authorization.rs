//! Backchannel authorization request types and the status state machine.
//!
//! A request is created `pending` and resolved exactly once: approved or
//! denied by the owning subject, or expired once its TTL elapses. Terminal
//! states are absorbing.

use std::fmt::{Display, Formatter};

use assent_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scope requested for every profile-access authorization.
pub const DEFAULT_SCOPE: &str = "openid profile email";

/// Maximum number of question characters echoed into a binding message.
pub const BINDING_MESSAGE_QUESTION_LIMIT: usize = 100;

/// Opaque caller-visible identifier of an authorization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthRequestId(Uuid);

impl AuthRequestId {
    /// Creates a new random request identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a request identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AuthRequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for AuthRequestId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Lifecycle status of an authorization request.
///
/// Status only ever moves forward: `pending` reaches exactly one of the
/// terminal states and no terminal state transitions further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting the subject's decision.
    Pending,
    /// Subject granted access. Terminal.
    Approved,
    /// Subject refused access. Terminal.
    Denied,
    /// TTL elapsed before a decision. Terminal.
    Expired,
}

impl RequestStatus {
    /// Returns the persisted discriminator string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::Expired => "expired",
        }
    }

    /// Parses a persisted discriminator string.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            "expired" => Ok(Self::Expired),
            other => Err(AppError::Internal(format!(
                "unknown request status '{other}'"
            ))),
        }
    }

    /// Returns whether this status admits no further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns whether `next` is a legal successor of this status.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Denied)
                | (Self::Pending, Self::Expired)
        )
    }
}

impl Display for RequestStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A subject's decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveAction {
    /// Grant the requested access.
    Approved,
    /// Refuse the requested access.
    Denied,
}

impl ResolveAction {
    /// Returns the wire discriminator string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }

    /// Parses a wire discriminator string.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            other => Err(AppError::Validation(format!(
                "action must be 'approved' or 'denied', got '{other}'"
            ))),
        }
    }

    /// Returns the terminal status this action transitions a request to.
    #[must_use]
    pub fn status(&self) -> RequestStatus {
        match self {
            Self::Approved => RequestStatus::Approved,
            Self::Denied => RequestStatus::Denied,
        }
    }
}

impl Display for ResolveAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Builds the human-readable binding message shown to the approving user.
///
/// Echoes the triggering question truncated to
/// [`BINDING_MESSAGE_QUESTION_LIMIT`] characters.
#[must_use]
pub fn binding_message_for_question(question: &str) -> String {
    let truncated: String = question
        .chars()
        .take(BINDING_MESSAGE_QUESTION_LIMIT)
        .collect();
    format!("AI wants to access your personal information to answer: \"{truncated}...\"")
}
