//! services/web/src/web/auth.rs
//!
//! Authentication endpoints: sign-in, the "forgot password" request, sign-up,
//! sign-out and the two halves of a password reset. Every operation is
//! delegated to the backend; these handlers validate input, keep the session
//! cookies in step and publish an `AuthEvent` on success.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use clearcom_core::{
    ports::PortError,
    recovery::parse_recovery_fragment,
    validation::{validate_email, validate_password, validate_password_change},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::web::events::AuthEvent;
use crate::web::locale::RequestLocale;
use crate::web::pages::{
    auth::{login, reset_password, signup, AuthForm, LoginMode, ResetForm},
    Page,
};
use crate::web::session::{access_token, clear_session, resolve_session, store_session, SessionStatus};
use crate::web::state::AppState;

/// The notice shown on the login page after a successful sign-up.
pub const CHECK_EMAIL_NOTICE: &str = "check-email";

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub mode: Option<String>,
    pub notice: Option<String>,
}

#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct EmailForm {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct PasswordChangeForm {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm: String,
}

#[derive(Deserialize)]
pub struct RecoveryForm {
    #[serde(default)]
    pub fragment: String,
}

/// What the user sees when a backend call fails: the provider's own message
/// when it gave one, otherwise a generic line for the operation.
fn failure_message(page: &Page, e: &PortError, fallback_key: &str) -> String {
    match e {
        PortError::Rejected(message) if !message.trim().is_empty() => message.clone(),
        _ => page.t(fallback_key),
    }
}

fn unavailable_form() -> AuthForm {
    AuthForm {
        unavailable: true,
        ..Default::default()
    }
}

//=========================================================================================
// Login
//=========================================================================================

/// GET /login - sign-in form, or the reset request form with `?mode=reset`.
pub async fn login_page_handler(
    State(state): State<Arc<AppState>>,
    RequestLocale(locale): RequestLocale,
    Query(query): Query<LoginQuery>,
) -> Response {
    let mode = match query.mode.as_deref() {
        Some("reset") => LoginMode::Reset,
        _ => LoginMode::SignIn,
    };
    let path = match mode {
        LoginMode::SignIn => "/login",
        LoginMode::Reset => "/login?mode=reset",
    };
    let page = Page::new(&state, locale, path);

    if !state.baas.is_available() {
        return (StatusCode::SERVICE_UNAVAILABLE, login(&page, mode, &unavailable_form())).into_response();
    }
    let form = AuthForm {
        notice: query
            .notice
            .filter(|n| n == CHECK_EMAIL_NOTICE)
            .map(|_| page.t("auth.signup.checkEmail")),
        ..Default::default()
    };
    login(&page, mode, &form).into_response()
}

/// POST /login - exchange credentials for a session.
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    RequestLocale(locale): RequestLocale,
    jar: CookieJar,
    Form(req): Form<CredentialsForm>,
) -> Response {
    let page = Page::new(&state, locale, "/login");
    let Some(auth) = state.baas.auth() else {
        return (StatusCode::SERVICE_UNAVAILABLE, login(&page, LoginMode::SignIn, &unavailable_form()))
            .into_response();
    };

    let mut form = AuthForm {
        email: req.email.trim().to_string(),
        ..Default::default()
    };
    let email = match validate_email(&req.email) {
        Ok(email) => email,
        Err(e) => {
            form.error = Some(page.t(e.translation_key()));
            return (StatusCode::UNPROCESSABLE_ENTITY, login(&page, LoginMode::SignIn, &form)).into_response();
        }
    };

    match auth.sign_in(&email, &req.password).await {
        Ok(session) => {
            info!("User {} signed in", session.user.id);
            state.events.publish(AuthEvent::SignedIn {
                user_id: session.user.id,
            });
            let jar = store_session(jar, &session, state.config.secure_cookies);
            (jar, Redirect::to("/dashboard")).into_response()
        }
        Err(e) => {
            error!("Sign-in failed: {}", e);
            form.error = Some(failure_message(&page, &e, "auth.login.failed"));
            (StatusCode::UNAUTHORIZED, login(&page, LoginMode::SignIn, &form)).into_response()
        }
    }
}

/// POST /login/reset - send password reset instructions.
pub async fn reset_request_handler(
    State(state): State<Arc<AppState>>,
    RequestLocale(locale): RequestLocale,
    Form(req): Form<EmailForm>,
) -> Response {
    let page = Page::new(&state, locale, "/login?mode=reset");
    let Some(auth) = state.baas.auth() else {
        return (StatusCode::SERVICE_UNAVAILABLE, login(&page, LoginMode::Reset, &unavailable_form()))
            .into_response();
    };

    let mut form = AuthForm {
        email: req.email.trim().to_string(),
        ..Default::default()
    };
    let email = match validate_email(&req.email) {
        Ok(email) => email,
        Err(e) => {
            form.error = Some(page.t(e.translation_key()));
            return (StatusCode::UNPROCESSABLE_ENTITY, login(&page, LoginMode::Reset, &form)).into_response();
        }
    };

    let redirect_to = state.public_link("/reset-password");
    match auth.request_password_reset(&email, &redirect_to).await {
        Ok(()) => {
            form.notice = Some(page.t("auth.resetRequest.sent"));
            login(&page, LoginMode::Reset, &form).into_response()
        }
        Err(e) => {
            error!("Password reset request failed: {}", e);
            form.error = Some(failure_message(&page, &e, "auth.resetRequest.failed"));
            (StatusCode::BAD_GATEWAY, login(&page, LoginMode::Reset, &form)).into_response()
        }
    }
}

//=========================================================================================
// Sign-up and Sign-out
//=========================================================================================

/// GET /signup
pub async fn signup_page_handler(
    State(state): State<Arc<AppState>>,
    RequestLocale(locale): RequestLocale,
) -> Response {
    let page = Page::new(&state, locale, "/signup");
    if !state.baas.is_available() {
        return (StatusCode::SERVICE_UNAVAILABLE, signup(&page, &unavailable_form())).into_response();
    }
    signup(&page, &AuthForm::default()).into_response()
}

/// POST /signup - register; the provider emails a confirmation link.
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    RequestLocale(locale): RequestLocale,
    Form(req): Form<CredentialsForm>,
) -> Response {
    let page = Page::new(&state, locale, "/signup");
    let Some(auth) = state.baas.auth() else {
        return (StatusCode::SERVICE_UNAVAILABLE, signup(&page, &unavailable_form())).into_response();
    };

    let mut form = AuthForm {
        email: req.email.trim().to_string(),
        ..Default::default()
    };
    let checked = validate_email(&req.email).and_then(|email| {
        validate_password(&req.password)?;
        Ok(email)
    });
    let email = match checked {
        Ok(email) => email,
        Err(e) => {
            form.error = Some(page.t(e.translation_key()));
            return (StatusCode::UNPROCESSABLE_ENTITY, signup(&page, &form)).into_response();
        }
    };

    match auth.sign_up(&email, &req.password, &state.public_link("/")).await {
        Ok(()) => {
            info!("Sign-up requested; confirmation email sent");
            Redirect::to(&format!("/login?notice={}", CHECK_EMAIL_NOTICE)).into_response()
        }
        Err(e) => {
            error!("Sign-up failed: {}", e);
            form.error = Some(failure_message(&page, &e, "auth.signup.failed"));
            (StatusCode::BAD_GATEWAY, signup(&page, &form)).into_response()
        }
    }
}

/// POST /logout - end the session and return to the landing page.
///
/// A token the provider already considers invalid still signs the user out
/// locally. Any other failure keeps the session and reports it on the dashboard.
pub async fn logout_handler(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if let (Some(auth), Some(token)) = (state.baas.auth(), access_token(&jar)) {
        match auth.sign_out(&token).await {
            Ok(()) | Err(PortError::Unauthorized) => {}
            Err(e) => {
                error!("Sign-out failed: {}", e);
                return Redirect::to("/dashboard?error=sign-out").into_response();
            }
        }
    }
    state.events.publish(AuthEvent::SignedOut);
    (clear_session(jar), Redirect::to("/")).into_response()
}

//=========================================================================================
// Password Reset
//=========================================================================================

/// GET /reset-password and /reset-password/{*rest}
pub async fn reset_page_handler(
    State(state): State<Arc<AppState>>,
    RequestLocale(locale): RequestLocale,
) -> Response {
    let page = Page::new(&state, locale, "/reset-password");
    if !state.baas.is_available() {
        let form = ResetForm {
            unavailable: true,
            ..Default::default()
        };
        return (StatusCode::SERVICE_UNAVAILABLE, reset_password(&page, &form)).into_response();
    }
    reset_password(&page, &ResetForm::default()).into_response()
}

/// POST /auth/recovery - exchange the recovery link's fragment for
/// a session. Called by the reset page's script, which has the fragment.
pub async fn recovery_session_handler(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(req): Form<RecoveryForm>,
) -> Response {
    let Some(auth) = state.baas.auth() else {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };
    let Some(tokens) = parse_recovery_fragment(&req.fragment) else {
        warn!("Recovery link carried no access token");
        return StatusCode::BAD_REQUEST.into_response();
    };

    match auth.set_session(&tokens).await {
        Ok(session) => {
            state.events.publish(AuthEvent::PasswordRecovery {
                user_id: session.user.id,
            });
            let jar = store_session(jar, &session, state.config.secure_cookies);
            (jar, StatusCode::NO_CONTENT).into_response()
        }
        Err(e) => {
            error!("Error setting up password recovery: {}", e);
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

/// POST /reset-password - set a new password for the recovered session.
pub async fn reset_password_handler(
    State(state): State<Arc<AppState>>,
    RequestLocale(locale): RequestLocale,
    jar: CookieJar,
    Form(req): Form<PasswordChangeForm>,
) -> Response {
    let page = Page::new(&state, locale, "/reset-password");
    let Some(auth) = state.baas.auth() else {
        let form = ResetForm {
            unavailable: true,
            ..Default::default()
        };
        return (StatusCode::SERVICE_UNAVAILABLE, reset_password(&page, &form)).into_response();
    };
    let failed = |key: &str| ResetForm {
        error: Some(page.t(key)),
        ..Default::default()
    };

    if let Err(e) = validate_password_change(&req.password, &req.confirm) {
        let form = failed(e.translation_key());
        return (StatusCode::UNPROCESSABLE_ENTITY, reset_password(&page, &form)).into_response();
    }

    let (jar, status) =
        resolve_session(&state.baas, &state.events, jar, state.config.secure_cookies).await;
    let session = match status {
        SessionStatus::Active(session) => session,
        SessionStatus::SignedOut | SessionStatus::Unavailable => {
            let form = failed("auth.reset.invalidLink");
            return (StatusCode::UNAUTHORIZED, jar, reset_password(&page, &form)).into_response();
        }
        SessionStatus::Failed(_) => {
            let form = failed("auth.reset.failed");
            return (StatusCode::SERVICE_UNAVAILABLE, jar, reset_password(&page, &form)).into_response();
        }
    };

    match auth.update_password(&session.access_token, &req.password).await {
        Ok(()) => {
            info!("Password updated for user {}", session.user.id);
            state.events.publish(AuthEvent::UserUpdated {
                user_id: session.user.id,
            });
            let form = ResetForm {
                success: true,
                ..Default::default()
            };
            (jar, reset_password(&page, &form)).into_response()
        }
        Err(e) => {
            error!("Password update failed: {}", e);
            let form = ResetForm {
                error: Some(failure_message(&page, &e, "auth.reset.failed")),
                ..Default::default()
            };
            (StatusCode::BAD_GATEWAY, jar, reset_password(&page, &form)).into_response()
        }
    }
}
