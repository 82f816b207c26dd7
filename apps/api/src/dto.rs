use serde::{Deserialize, Serialize};
use ts_rs::TS;

use assent_application::AuthorizationRequestRecord;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming chat message from the agent surface.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/chat-request.ts"
)]
pub struct ChatRequest {
    pub message: String,
}

/// Agent reply, optionally parking an authorization request.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/chat-response.ts"
)]
pub struct ChatResponse {
    pub response: String,
    pub requires_approval: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Incoming payload for direct authorization request creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-authorization-request.ts"
)]
pub struct CreateAuthorizationRequest {
    pub binding_message: String,
}

/// Identifier of a freshly parked authorization request.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-authorization-response.ts"
)]
pub struct CreateAuthorizationResponse {
    pub request_id: String,
}

/// One pending-and-live authorization request awaiting the subject.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/pending-authorization-response.ts"
)]
pub struct PendingAuthorizationResponse {
    pub request_id: String,
    pub binding_message: String,
    pub scope: String,
    pub created_at: String,
    pub expires_at: String,
}

impl From<AuthorizationRequestRecord> for PendingAuthorizationResponse {
    fn from(record: AuthorizationRequestRecord) -> Self {
        Self {
            request_id: record.request_id.to_string(),
            binding_message: record.binding_message,
            scope: record.scope,
            created_at: record.created_at.to_rfc3339(),
            expires_at: record.expires_at.to_rfc3339(),
        }
    }
}

/// The subject's pending approval queue, newest first.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/pending-authorizations-response.ts"
)]
pub struct PendingAuthorizationsResponse {
    pub requests: Vec<PendingAuthorizationResponse>,
    pub count: usize,
}

/// Incoming approve/deny decision.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/resolve-request.ts"
)]
pub struct ResolveRequest {
    pub action: String,
}

/// Echo of the decision that was applied.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/resolve-response.ts"
)]
pub struct ResolveResponse {
    pub action: String,
    pub message: String,
}

/// Incoming poll for a request's outcome, carrying the profile credential
/// used only on the approved path.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/poll-request.ts"
)]
pub struct PollRequest {
    pub access_token: String,
}

/// Status snapshot of a polled request.
///
/// `response` is present only when approved; `message` carries the fixed
/// advisory for denied/expired outcomes.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/poll-response.ts"
)]
pub struct PollResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
