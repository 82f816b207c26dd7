use std::sync::Arc;

use assent_application::{
    AuthorizationRequestService, ConversationService, ProfileFetcher, RateLimitService,
    SensitivityClassifier,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationRequestService,
    pub conversation_service: ConversationService,
    pub rate_limit_service: RateLimitService,
    pub profile_fetcher: Arc<dyn ProfileFetcher>,
    pub classifier: Arc<dyn SensitivityClassifier>,
    pub client_api_key: String,
}
