use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use assent_core::{AppError, UserIdentity};

use crate::auth::subject_from_bearer;
use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the per-deployment client API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authenticates the caller and attaches their verified identity.
///
/// Requires the deployment's client API key and a bearer token whose `sub`
/// claim names the calling subject.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let headers = request.headers();

    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if api_key != state.client_api_key {
        return Err(AppError::Unauthorized("invalid client API key".to_owned()).into());
    }

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;

    let subject = subject_from_bearer(bearer)?;
    request.extensions_mut().insert(UserIdentity::new(subject));

    Ok(next.run(request).await)
}
