use axum::extract::State;
use axum::{Extension, Json};

use assent_core::{AppError, UserIdentity};
use assent_domain::{DEFAULT_SCOPE, MessageRole, binding_message_for_question};

use crate::dto::{ChatRequest, ChatResponse};
use crate::error::ApiResult;
use crate::handlers::authorizations::create_rate_rule;
use crate::state::AppState;

/// Reply recorded when a question needs the user's approval first.
const APPROVAL_PROMPT: &str = "I need your permission to access your personal information \
    to answer that question. Please approve the authorization request.";

/// Reply for questions that need no profile access.
const GENERAL_ANSWER: &str = "I can answer general questions without accessing your personal \
    data. For questions about your specific information, I'll need your approval first.";

/// Agent-side chat entry point.
///
/// Records the user message, consults the sensitivity classifier, and parks
/// an authorization request when the answer would need profile data.
pub async fn chat_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("message must not be empty".to_owned()).into());
    }

    state
        .conversation_service
        .record(user.subject(), MessageRole::User, message, false)
        .await?;

    if state.classifier.requires_approval(message) {
        state
            .rate_limit_service
            .check_rate_limit(&create_rate_rule(), user.subject())
            .await?;

        let binding_message = binding_message_for_question(message);
        let record = state
            .authorization_service
            .create_request(user.subject(), binding_message.as_str(), DEFAULT_SCOPE)
            .await?;

        state
            .conversation_service
            .record(user.subject(), MessageRole::Assistant, APPROVAL_PROMPT, true)
            .await?;

        return Ok(Json(ChatResponse {
            response: APPROVAL_PROMPT.to_owned(),
            requires_approval: true,
            request_id: Some(record.request_id.to_string()),
        }));
    }

    state
        .conversation_service
        .record(user.subject(), MessageRole::Assistant, GENERAL_ANSWER, false)
        .await?;

    Ok(Json(ChatResponse {
        response: GENERAL_ANSWER.to_owned(),
        requires_approval: false,
        request_id: None,
    }))
}
