//! services/web/src/web/dashboard.rs
//!
//! The signed-in dashboard. Both flows post back to their own endpoint and the
//! page is re-rendered with that flow's result or error.

use axum::{
    extract::{Query, State},
    Extension, Form,
};
use clearcom_core::{
    domain::{EmailDraftRequest, EnhancementRequest, Flow, Session, Tone},
    i18n::Locale,
};
use maud::Markup;
use serde::Deserialize;
use std::sync::Arc;

use crate::web::locale::RequestLocale;
use crate::web::pages::{
    dashboard::{dashboard, DashboardView},
    Page,
};
use crate::web::relay::GenerationRequest;
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub tab: Option<String>,
    pub tone: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct EnhanceForm {
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Deserialize)]
pub struct EmailResponseForm {
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub original_email: String,
    #[serde(default)]
    pub draft_points: String,
}

/// Unknown or missing tones fall back to formal.
fn parse_tone(raw: Option<&str>) -> Tone {
    raw.and_then(|t| t.parse::<Tone>().ok()).unwrap_or_default()
}

fn page_path(flow: Flow, tone: Tone) -> String {
    format!("/dashboard?tab={}&tone={}", flow.as_str(), tone.as_str())
}

/// GET /dashboard
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    RequestLocale(locale): RequestLocale,
    Extension(session): Extension<Session>,
    Query(query): Query<DashboardQuery>,
) -> Markup {
    let tab = query
        .tab
        .as_deref()
        .and_then(|t| t.parse::<Flow>().ok())
        .unwrap_or_default();
    let tone = parse_tone(query.tone.as_deref());
    let page = Page::new(&state, locale, page_path(tab, tone));

    let view = DashboardView {
        email: session.email().map(str::to_string),
        tab,
        tone,
        error: query
            .error
            .filter(|e| e == "sign-out")
            .map(|_| page.t("dashboard.errors.signOutFailed")),
        ..Default::default()
    };
    dashboard(&page, &view)
}

/// POST /dashboard/enhance
pub async fn enhance_handler(
    State(state): State<Arc<AppState>>,
    RequestLocale(locale): RequestLocale,
    Extension(session): Extension<Session>,
    Form(form): Form<EnhanceForm>,
) -> Markup {
    let tone = parse_tone(Some(&form.tone));
    let request = GenerationRequest::Enhance(EnhancementRequest {
        text: form.text.clone(),
        tone,
    });
    let view = DashboardView {
        tab: Flow::Enhance,
        text: form.text,
        ..Default::default()
    };
    run_flow(&state, locale, &session, request, view).await
}

/// POST /dashboard/email
pub async fn email_response_handler(
    State(state): State<Arc<AppState>>,
    RequestLocale(locale): RequestLocale,
    Extension(session): Extension<Session>,
    Form(form): Form<EmailResponseForm>,
) -> Markup {
    let tone = parse_tone(Some(&form.tone));
    let request = GenerationRequest::Email(EmailDraftRequest {
        original_email: form.original_email.clone(),
        draft_points: form.draft_points.clone(),
        tone,
    });
    let view = DashboardView {
        tab: Flow::Email,
        original_email: form.original_email,
        draft_points: form.draft_points,
        ..Default::default()
    };
    run_flow(&state, locale, &session, request, view).await
}

/// Runs one generation and renders the dashboard with its outcome. The form
/// is rendered ready for another submission whatever happened.
async fn run_flow(
    state: &AppState,
    locale: Locale,
    session: &Session,
    request: GenerationRequest,
    mut view: DashboardView,
) -> Markup {
    let flow = request.flow();
    view.tone = match &request {
        GenerationRequest::Enhance(req) => req.tone,
        GenerationRequest::Email(req) => req.tone,
    };
    view.email = session.email().map(str::to_string);

    let page = Page::new(state, locale, page_path(flow, view.tone));
    match state.generation.generate(session.user.id, &request).await {
        Ok(result) => view.result = Some(result),
        Err(e) => view.error = Some(page.t(e.translation_key(flow))),
    }
    dashboard(&page, &view)
}
