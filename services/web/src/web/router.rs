//! services/web/src/web/router.rs
//!
//! Builds the complete application router: public screens, the guarded
//! dashboard and relay, and the Swagger UI.

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    response::Redirect,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::{
    auth::{
        login_handler, login_page_handler, logout_handler, recovery_session_handler,
        reset_page_handler, reset_password_handler, reset_request_handler, signup_handler,
        signup_page_handler,
    },
    dashboard::{dashboard_handler, email_response_handler, enhance_handler},
    landing::{access_request_handler, landing_handler},
    locale::set_language_handler,
    middleware::{require_session_api, require_session_page},
    relay::{completion_handler, ApiDoc},
    state::AppState,
};

/// Form posts carry a few paragraphs of text at most.
const BODY_LIMIT: usize = 256 * 1024;

async fn redirect_home() -> Redirect {
    Redirect::to("/")
}

pub fn build_router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(landing_handler))
        .route("/access-request", post(access_request_handler))
        .route("/login", get(login_page_handler).post(login_handler))
        .route("/login/reset", post(reset_request_handler))
        .route("/signup", get(signup_page_handler).post(signup_handler))
        .route("/logout", post(logout_handler))
        .route("/reset-password", get(reset_page_handler).post(reset_password_handler))
        // Recovery links may carry more path after the fragment is stripped.
        .route("/reset-password/{*rest}", get(reset_page_handler))
        .route("/auth/recovery", post(recovery_session_handler))
        .route("/language", post(set_language_handler));

    // Protected pages (signed-out visitors are sent to /login)
    let protected_pages = Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/dashboard/enhance", post(enhance_handler))
        .route("/dashboard/email", post(email_response_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_session_page,
        ));

    // Protected JSON relay
    let protected_api = Router::new()
        .route("/api/completions", post(completion_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_session_api,
        ));

    let app_router = Router::new()
        .merge(public_routes)
        .merge(protected_pages)
        .merge(protected_api)
        .fallback(redirect_home)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Merge the app router with the Swagger UI router for a complete application.
    app_router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
