//! Assent API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use assent_application::{
    AuthorizationRequestService, ConversationService, ProfileFetcher, RateLimitService,
    SensitivityClassifier,
};
use assent_core::AppError;
use assent_infrastructure::{
    ConversationDenialNotifier, HttpProfileFetcher, KeywordSensitivityClassifier,
    PostgresAuthorizationRequestRepository, PostgresConversationRepository,
    PostgresDecisionLogRepository, PostgresRateLimitRepository,
};

use crate::api_config::ApiConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Unavailable(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let authorization_repository =
        Arc::new(PostgresAuthorizationRequestRepository::new(pool.clone()));
    let decision_log = Arc::new(PostgresDecisionLogRepository::new(pool.clone()));
    let conversation_service =
        ConversationService::new(Arc::new(PostgresConversationRepository::new(pool.clone())));
    let denial_notifier = Arc::new(ConversationDenialNotifier::new(conversation_service.clone()));
    let authorization_service =
        AuthorizationRequestService::new(authorization_repository, decision_log, denial_notifier);
    let rate_limit_service =
        RateLimitService::new(Arc::new(PostgresRateLimitRepository::new(pool.clone())));
    let profile_fetcher: Arc<dyn ProfileFetcher> =
        Arc::new(HttpProfileFetcher::new(config.userinfo_url.clone())?);
    let classifier: Arc<dyn SensitivityClassifier> = Arc::new(KeywordSensitivityClassifier::new());

    let app_state = AppState {
        authorization_service,
        conversation_service,
        rate_limit_service,
        profile_fetcher,
        classifier,
        client_api_key: config.client_api_key.clone(),
    };

    let router = api_router::build_router(app_state, config.frontend_url.as_str())?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind {address}: {error}")))?;

    info!(%address, "assent-api listening");

    axum::serve(listener, router)
        .await
        .map_err(|error| AppError::Internal(format!("server error: {error}")))
}
