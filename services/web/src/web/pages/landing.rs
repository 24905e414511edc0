//! services/web/src/web/pages/landing.rs

use maud::{html, Markup};

use super::{alert, notice, Page};

/// Where the "request early access" form stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AccessRequestState {
    #[default]
    Idle,
    Sent,
    /// A translated message for the user.
    Error(String),
    /// No backend is configured; the form is replaced by a notice.
    Unavailable,
}

pub fn landing(page: &Page, email: &str, state: &AccessRequestState) -> Markup {
    let title = page.t("common.appName");
    page.render(
        &title,
        html! {
            section.card {
                div.row {
                    h1 { (page.t("landing.heroTitle")) }
                    a.button href="/login" { (page.t("common.signIn")) }
                }
                p { (page.t("landing.heroSubtitle")) }
            }
            section.features {
                (feature_card(page, "landing.features.enhance"))
                (feature_card(page, "landing.features.email"))
            }
            section.card #request-access {
                h2 { (page.t("landing.requestAccess.title")) }
                @match state {
                    AccessRequestState::Unavailable => {
                        (alert(Some(&page.t("common.serviceUnavailable"))))
                    }
                    AccessRequestState::Sent => {
                        (notice(Some(&page.t("landing.requestAccess.success"))))
                    }
                    AccessRequestState::Idle | AccessRequestState::Error(_) => {
                        @if let AccessRequestState::Error(message) = state {
                            (alert(Some(message)))
                        }
                        form method="post" action="/access-request" novalidate
                            data-loading-label=(page.t("landing.requestAccess.button")) {
                            label for="access-email" { (page.t("common.email")) }
                            input #access-email type="email" name="email" value=(email)
                                placeholder=(page.t("landing.requestAccess.placeholder"));
                            button type="submit" { (page.t("landing.requestAccess.button")) }
                        }
                    }
                }
            }
        },
    )
}

fn feature_card(page: &Page, key: &str) -> Markup {
    html! {
        article.card {
            h3 { (page.t(&format!("{}.title", key))) }
            p { (page.t(&format!("{}.description", key))) }
        }
    }
}
