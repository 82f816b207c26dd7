use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName, HeaderValue};
use axum::http::Method;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use assent_core::AppError;

use crate::state::AppState;
use crate::{handlers, middleware};

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/api/chat", post(handlers::chat::chat_handler))
        .route(
            "/api/authorizations",
            post(handlers::authorizations::create_authorization_handler),
        )
        .route(
            "/api/authorizations/pending",
            get(handlers::authorizations::list_pending_handler),
        )
        .route(
            "/api/authorizations/{request_id}/resolve",
            post(handlers::authorizations::resolve_handler),
        )
        .route(
            "/api/authorizations/{request_id}/poll",
            post(handlers::authorizations::poll_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    let allowed_origin = frontend_url
        .parse::<HeaderValue>()
        .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;

    let cors_layer = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(middleware::API_KEY_HEADER),
        ]);

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
