use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use assent_application::{RateLimitRule, compose_profile_answer};
use assent_core::{AppError, UserIdentity};
use assent_domain::{
    AuthRequestId, DEFAULT_SCOPE, MessageRole, RequestStatus, ResolveAction,
};

use crate::dto::{
    CreateAuthorizationRequest, CreateAuthorizationResponse, PendingAuthorizationResponse,
    PendingAuthorizationsResponse, PollRequest, PollResponse, ResolveRequest, ResolveResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Advisory returned when polling a denied request.
const DENIED_ADVISORY: &str = "Request is denied";

/// Advisory returned when polling an expired request.
const EXPIRED_ADVISORY: &str = "Authorization request expired";

/// Budget for parking new authorization requests, per subject.
pub(crate) fn create_rate_rule() -> RateLimitRule {
    RateLimitRule::new("authorization_create", 10, 5 * 60)
}

fn parse_request_id(raw: &str) -> Result<AuthRequestId, ApiError> {
    uuid::Uuid::parse_str(raw)
        .map(AuthRequestId::from_uuid)
        .map_err(|error| {
            ApiError::from(AppError::Validation(format!("invalid request id: {error}")))
        })
}

/// Parks a new pending authorization request for the calling subject.
pub async fn create_authorization_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateAuthorizationRequest>,
) -> ApiResult<(StatusCode, Json<CreateAuthorizationResponse>)> {
    state
        .rate_limit_service
        .check_rate_limit(&create_rate_rule(), user.subject())
        .await?;

    let record = state
        .authorization_service
        .create_request(
            user.subject(),
            payload.binding_message.as_str(),
            DEFAULT_SCOPE,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateAuthorizationResponse {
            request_id: record.request_id.to_string(),
        }),
    ))
}

/// Lists the subject's pending-and-live requests, newest first.
pub async fn list_pending_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<PendingAuthorizationsResponse>> {
    let requests: Vec<PendingAuthorizationResponse> = state
        .authorization_service
        .list_pending(user.subject())
        .await?
        .into_iter()
        .map(PendingAuthorizationResponse::from)
        .collect();

    let count = requests.len();
    Ok(Json(PendingAuthorizationsResponse { requests, count }))
}

/// Applies the subject's approve/deny decision to a pending request.
pub async fn resolve_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(request_id): Path<String>,
    Json(payload): Json<ResolveRequest>,
) -> ApiResult<Json<ResolveResponse>> {
    let request_id = parse_request_id(request_id.as_str())?;
    let action = ResolveAction::parse(payload.action.as_str())?;

    state
        .authorization_service
        .resolve(request_id, user.subject(), action)
        .await?;

    Ok(Json(ResolveResponse {
        action: action.as_str().to_owned(),
        message: format!("Request {action} successfully"),
    }))
}

/// Reports a request's outcome; on approval, answers the parked question
/// from the freshly fetched profile.
pub async fn poll_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(request_id): Path<String>,
    Json(payload): Json<PollRequest>,
) -> ApiResult<Json<PollResponse>> {
    let request_id = parse_request_id(request_id.as_str())?;

    let snapshot = state
        .authorization_service
        .poll_outcome(request_id, user.subject())
        .await?;

    let response = match snapshot.status {
        RequestStatus::Approved => {
            let profile = state
                .profile_fetcher
                .fetch(payload.access_token.as_str())
                .await?;
            let question = state
                .conversation_service
                .last_user_question(user.subject())
                .await?
                .unwrap_or_default();
            let answer = compose_profile_answer(question.as_str(), &profile);

            state
                .conversation_service
                .record(user.subject(), MessageRole::Assistant, answer.as_str(), false)
                .await?;

            PollResponse {
                status: snapshot.status.as_str().to_owned(),
                response: Some(answer),
                message: None,
            }
        }
        RequestStatus::Denied => PollResponse {
            status: snapshot.status.as_str().to_owned(),
            response: None,
            message: Some(DENIED_ADVISORY.to_owned()),
        },
        RequestStatus::Expired => PollResponse {
            status: snapshot.status.as_str().to_owned(),
            response: None,
            message: Some(EXPIRED_ADVISORY.to_owned()),
        },
        RequestStatus::Pending => PollResponse {
            status: snapshot.status.as_str().to_owned(),
            response: None,
            message: None,
        },
    };

    Ok(Json(response))
}
