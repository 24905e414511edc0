//! services/web/src/web/landing.rs

use axum::{extract::State, Form};
use clearcom_core::{domain::AccessRequest, validation::validate_email};
use maud::Markup;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::web::locale::RequestLocale;
use crate::web::pages::{
    landing::{landing, AccessRequestState},
    Page,
};
use crate::web::state::AppState;

#[derive(Deserialize)]
pub struct AccessRequestForm {
    #[serde(default)]
    pub email: String,
}

/// GET /
pub async fn landing_handler(
    State(state): State<Arc<AppState>>,
    RequestLocale(locale): RequestLocale,
) -> Markup {
    let page = Page::new(&state, locale, "/");
    let form_state = if state.baas.access_requests().is_some() {
        AccessRequestState::Idle
    } else {
        AccessRequestState::Unavailable
    };
    landing(&page, "", &form_state)
}

/// POST /access-request - record an email asking for early access.
pub async fn access_request_handler(
    State(state): State<Arc<AppState>>,
    RequestLocale(locale): RequestLocale,
    Form(form): Form<AccessRequestForm>,
) -> Markup {
    let page = Page::new(&state, locale, "/");
    let Some(store) = state.baas.access_requests() else {
        return landing(&page, "", &AccessRequestState::Unavailable);
    };

    let email = match validate_email(&form.email) {
        Ok(email) => email,
        Err(e) => {
            let form_state = AccessRequestState::Error(page.t(e.translation_key()));
            return landing(&page, form.email.trim(), &form_state);
        }
    };

    match store.insert_access_request(&AccessRequest { email }).await {
        Ok(()) => {
            info!("Access request recorded");
            landing(&page, "", &AccessRequestState::Sent)
        }
        Err(e) => {
            error!("Error submitting access request: {}", e);
            let form_state = AccessRequestState::Error(page.t("landing.errors.submitFailed"));
            landing(&page, form.email.trim(), &form_state)
        }
    }
}
