use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use ts_rs::TS;

use assent_application::ResolveError;
use assent_core::AppError;

/// API error payload.
///
/// `error` is a stable kind code callers branch on; `current_status` is set
/// only for duplicate resolve attempts so a second tap reads as "already
/// approved/denied" instead of a generic failure.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_status: Option<String>,
}

/// HTTP API error wrapper around application errors.
#[derive(Debug)]
pub enum ApiError {
    App(AppError),
    Resolve(ResolveError),
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self::App(value)
    }
}

impl From<ResolveError> for ApiError {
    fn from(value: ResolveError) -> Self {
        match value {
            ResolveError::Store(error) => Self::App(error),
            other => Self::Resolve(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message, current_status) = match self {
            Self::App(error) => {
                let status = match &error {
                    AppError::Validation(_) => StatusCode::BAD_REQUEST,
                    AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                    AppError::NotFound(_) => StatusCode::NOT_FOUND,
                    AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                    AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let kind = match &error {
                    AppError::Validation(_) => "validation",
                    AppError::Unauthorized(_) => "unauthenticated",
                    AppError::NotFound(_) => "not_found",
                    AppError::RateLimited(_) => "rate_limited",
                    AppError::Unavailable(_) => "upstream_unavailable",
                    AppError::Internal(_) => "internal",
                };
                (status, kind, error.to_string(), None)
            }
            Self::Resolve(error) => match &error {
                ResolveError::NotFound => (
                    StatusCode::NOT_FOUND,
                    "not_found",
                    error.to_string(),
                    None,
                ),
                ResolveError::AlreadyResolved { current } => (
                    StatusCode::CONFLICT,
                    "already_resolved",
                    error.to_string(),
                    Some(current.as_str().to_owned()),
                ),
                ResolveError::Expired => {
                    (StatusCode::GONE, "expired", error.to_string(), None)
                }
                // From<ResolveError> unwraps Store before we get here
                ResolveError::Store(inner) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    inner.to_string(),
                    None,
                ),
            },
        };

        let payload = Json(ErrorResponse {
            error: kind,
            message,
            current_status,
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use assent_application::ResolveError;
    use assent_domain::RequestStatus;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::ApiError;

    #[test]
    fn duplicate_resolves_map_to_conflict() {
        let response = ApiError::from(ResolveError::AlreadyResolved {
            current: RequestStatus::Denied,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn expired_maps_to_gone() {
        let response = ApiError::from(ResolveError::Expired).into_response();
        assert_eq!(response.status(), StatusCode::GONE);
    }

    #[test]
    fn store_failures_surface_as_unavailable() {
        let error = ResolveError::Store(assent_core::AppError::Unavailable(
            "database offline".to_owned(),
        ));
        let response = ApiError::from(error).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
