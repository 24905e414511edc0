//! services/web/src/web/locale.rs
//!
//! Works out which language to render a request in, and lets the user pick
//! one. The choice is kept in a long-lived cookie so it survives reloads.

use axum::{
    extract::{FromRequestParts, Form},
    http::{header, request::Parts},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use clearcom_core::i18n::Locale;
use serde::Deserialize;
use std::convert::Infallible;

pub const LANG_COOKIE: &str = "lang";
const LANG_COOKIE_DAYS: i64 = 365;

/// The language a request should be rendered in: the saved choice, else the
/// browser's preference, else English.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLocale(pub Locale);

impl RequestLocale {
    pub fn from_parts(parts: &Parts) -> Self {
        let saved = CookieJar::from_headers(&parts.headers)
            .get(LANG_COOKIE)
            .and_then(|c| Locale::from_code(c.value()));
        let browser = || {
            parts
                .headers
                .get(header::ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok())
                .and_then(Locale::negotiate)
        };
        RequestLocale(saved.or_else(browser).unwrap_or_default())
    }
}

impl<S> FromRequestParts<S> for RequestLocale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[derive(Deserialize)]
pub struct LanguageForm {
    pub lang: String,
    pub redirect: Option<String>,
}

/// Only same-origin absolute paths are followed after switching language.
pub fn safe_redirect(target: Option<&str>) -> &str {
    match target {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/",
    }
}

/// POST /language - remember the chosen language and go back.
pub async fn set_language_handler(jar: CookieJar, Form(form): Form<LanguageForm>) -> impl IntoResponse {
    let redirect = Redirect::to(safe_redirect(form.redirect.as_deref()));
    match Locale::from_code(&form.lang) {
        Some(locale) => {
            let cookie = Cookie::build((LANG_COOKIE, locale.code()))
                .path("/")
                .same_site(SameSite::Lax)
                .max_age(time::Duration::days(LANG_COOKIE_DAYS));
            (jar.add(cookie), redirect)
        }
        None => (jar, redirect),
    }
}
