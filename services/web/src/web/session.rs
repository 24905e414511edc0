//! services/web/src/web/session.rs
//!
//! Keeps the provider-issued session in two HttpOnly cookies and resolves it
//! back into a `Session` on every guarded request.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use clearcom_core::{
    domain::Session,
    ports::{AuthService, PortError},
};
use tracing::{error, warn};

use crate::adapters::BaasHandle;
use crate::web::events::{AuthEvent, AuthEvents};

pub const ACCESS_COOKIE: &str = "sb-access-token";
pub const REFRESH_COOKIE: &str = "sb-refresh-token";

/// The outcome of checking a request for a signed-in user.
#[derive(Debug, Clone)]
pub enum SessionStatus {
    Active(Session),
    SignedOut,
    /// No backend is configured, so no session can exist.
    Unavailable,
    /// The backend could not be asked. This is not the same as signed out.
    Failed(PortError),
}

fn auth_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Adds both session cookies to the jar.
pub fn store_session(jar: CookieJar, session: &Session, secure: bool) -> CookieJar {
    jar.add(auth_cookie(ACCESS_COOKIE, session.access_token.clone(), secure))
        .add(auth_cookie(REFRESH_COOKIE, session.refresh_token.clone(), secure))
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_COOKIE).path("/"))
}

pub fn access_token(jar: &CookieJar) -> Option<String> {
    jar.get(ACCESS_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

fn refresh_token(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolves the session carried by the request cookies.
///
/// An expired access token is refreshed once when a refresh token is present;
/// the returned jar then carries the new pair. A session the provider no
/// longer accepts clears both cookies.
pub async fn resolve_session(
    baas: &BaasHandle,
    events: &AuthEvents,
    jar: CookieJar,
    secure: bool,
) -> (CookieJar, SessionStatus) {
    let Some(auth) = baas.auth() else {
        return (jar, SessionStatus::Unavailable);
    };
    let Some(access) = access_token(&jar) else {
        return (jar, SessionStatus::SignedOut);
    };
    let refresh = refresh_token(&jar);

    match auth.get_user(&access).await {
        Ok(user) => {
            let session = Session {
                access_token: access,
                refresh_token: refresh.unwrap_or_default(),
                expires_at: None,
                user,
            };
            (jar, SessionStatus::Active(session))
        }
        Err(PortError::Unauthorized) => match refresh {
            Some(refresh) => refresh_or_sign_out(auth.as_ref(), events, jar, &refresh, secure).await,
            None => {
                events.publish(AuthEvent::SignedOut);
                (clear_session(jar), SessionStatus::SignedOut)
            }
        },
        Err(e) => {
            error!("Failed to look up the current session: {}", e);
            (jar, SessionStatus::Failed(e))
        }
    }
}

async fn refresh_or_sign_out(
    auth: &dyn AuthService,
    events: &AuthEvents,
    jar: CookieJar,
    refresh: &str,
    secure: bool,
) -> (CookieJar, SessionStatus) {
    match auth.refresh_session(refresh).await {
        Ok(session) => {
            events.publish(AuthEvent::TokenRefreshed {
                user_id: session.user.id,
            });
            let jar = store_session(jar, &session, secure);
            (jar, SessionStatus::Active(session))
        }
        Err(PortError::Unauthorized) | Err(PortError::Rejected(_)) => {
            warn!("Session expired and could not be refreshed; signing out");
            events.publish(AuthEvent::SignedOut);
            (clear_session(jar), SessionStatus::SignedOut)
        }
        Err(e) => {
            error!("Failed to refresh the session: {}", e);
            (jar, SessionStatus::Failed(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clearcom_core::domain::AuthUser;
    use uuid::Uuid;

    fn session() -> Session {
        Session {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: None,
            user: AuthUser {
                id: Uuid::new_v4(),
                email: None,
            },
        }
    }

    #[test]
    fn stored_cookies_are_http_only_and_scoped_to_root() {
        let jar = store_session(CookieJar::new(), &session(), true);
        let access = jar.get(ACCESS_COOKIE).expect("access cookie set");
        assert_eq!(access.value(), "access");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.path(), Some("/"));
        assert_eq!(jar.get(REFRESH_COOKIE).map(|c| c.value()), Some("refresh"));
    }

    #[test]
    fn clearing_removes_both_cookies() {
        let jar = clear_session(store_session(CookieJar::new(), &session(), false));
        assert!(access_token(&jar).is_none());
        assert!(jar.get(REFRESH_COOKIE).is_none());
    }

    #[tokio::test]
    async fn unavailable_backend_is_not_signed_out() {
        let jar = store_session(CookieJar::new(), &session(), false);
        let (_, status) =
            resolve_session(&BaasHandle::unavailable(), &AuthEvents::new(), jar, false).await;
        assert!(matches!(status, SessionStatus::Unavailable));
    }
}
