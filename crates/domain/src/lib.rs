//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod authorization;
mod conversation;
mod expiry;

pub use authorization::{
    AuthRequestId, BINDING_MESSAGE_QUESTION_LIMIT, DEFAULT_SCOPE, RequestStatus, ResolveAction,
    binding_message_for_question,
};
pub use conversation::MessageRole;
pub use expiry::{REQUEST_TTL_SECONDS, expires_at_for, is_live};
