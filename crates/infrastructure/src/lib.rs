//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod conversation_denial_notifier;
mod http_profile_fetcher;
mod keyword_classifier;
mod postgres_authorization_request_repository;
mod postgres_conversation_repository;
mod postgres_decision_log_repository;
mod postgres_rate_limit_repository;

pub use conversation_denial_notifier::ConversationDenialNotifier;
pub use http_profile_fetcher::HttpProfileFetcher;
pub use keyword_classifier::KeywordSensitivityClassifier;
pub use postgres_authorization_request_repository::PostgresAuthorizationRequestRepository;
pub use postgres_conversation_repository::PostgresConversationRepository;
pub use postgres_decision_log_repository::PostgresDecisionLogRepository;
pub use postgres_rate_limit_repository::PostgresRateLimitRepository;
