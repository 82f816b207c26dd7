//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_request_service;
mod conversation_service;
mod profile;
mod rate_limit_service;
mod sensitivity;

pub use authorization_request_service::{
    ApprovalDecision, AuthorizationRequestRecord, AuthorizationRequestRepository,
    AuthorizationRequestService, DecisionLog, DenialNotifier, ResolveError,
};
pub use conversation_service::{ChatMessageRecord, ConversationRepository, ConversationService};
pub use profile::{ProfileFetcher, UserProfile, compose_profile_answer};
pub use rate_limit_service::{AttemptInfo, RateLimitRepository, RateLimitRule, RateLimitService};
pub use sensitivity::SensitivityClassifier;
