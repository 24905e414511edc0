//! services/web/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use clearcom_core::domain::Flow;
use std::sync::Arc;

use crate::web::locale::RequestLocale;
use crate::web::pages::Page;
use crate::web::relay::RelayError;
use crate::web::session::{resolve_session, SessionStatus};
use crate::web::state::AppState;

/// Guards a page.
///
/// With a valid session the `Session` is inserted into request extensions for
/// handlers to use, and any refreshed cookies ride along on the response.
/// Signed-out visitors are sent to `/login`. An unconfigured or unreachable
/// backend gets an error page instead, since neither means "logged out".
pub async fn require_session_page(
    State(state): State<Arc<AppState>>,
    RequestLocale(locale): RequestLocale,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let (jar, status) =
        resolve_session(&state.baas, &state.events, jar, state.config.secure_cookies).await;

    match status {
        SessionStatus::Active(session) => {
            req.extensions_mut().insert(session);
            (jar, next.run(req).await).into_response()
        }
        SessionStatus::SignedOut => (jar, Redirect::to("/login")).into_response(),
        SessionStatus::Unavailable => {
            let page = Page::new(&state, locale, req.uri().path());
            let markup = page.error("errors.unavailableBody", None);
            (StatusCode::SERVICE_UNAVAILABLE, markup).into_response()
        }
        SessionStatus::Failed(_) => {
            let retry = retry_href(&req);
            let page = Page::new(&state, locale, req.uri().path());
            let markup = page.error("errors.sessionCheckFailed", Some(&retry));
            (StatusCode::SERVICE_UNAVAILABLE, jar, markup).into_response()
        }
    }
}

/// Where "Retry" should lead. Form posts are retried through the page that
/// holds the form, since their routes only accept POST.
fn retry_href(req: &Request) -> String {
    if req.method() == Method::GET {
        return req.uri().to_string();
    }
    match req
        .uri()
        .path()
        .strip_prefix("/dashboard/")
        .and_then(|flow| flow.parse::<Flow>().ok())
    {
        Some(flow) => format!("/dashboard?tab={}", flow.as_str()),
        None => "/dashboard".to_string(),
    }
}

/// Guards a JSON endpoint. Same outcomes as [`require_session_page`], as
/// error envelopes.
pub async fn require_session_api(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, RelayError> {
    let (jar, status) =
        resolve_session(&state.baas, &state.events, jar, state.config.secure_cookies).await;

    match status {
        SessionStatus::Active(session) => {
            req.extensions_mut().insert(session);
            Ok((jar, next.run(req).await).into_response())
        }
        SessionStatus::SignedOut => Ok((jar, RelayError::Unauthorized).into_response()),
        SessionStatus::Unavailable => Err(RelayError::AuthUnavailable),
        SessionStatus::Failed(_) => Err(RelayError::SessionCheckFailed),
    }
}
