//! services/web/src/web/pages/dashboard.rs

use clearcom_core::domain::{Flow, Tone};
use maud::{html, Markup};

use super::{alert, Page};

/// Everything the dashboard shows for the active tab. Each flow keeps its own
/// inputs, result and error; nothing here is shared between the two.
#[derive(Debug, Default)]
pub struct DashboardView {
    pub email: Option<String>,
    pub tab: Flow,
    pub tone: Tone,
    pub text: String,
    pub original_email: String,
    pub draft_points: String,
    pub result: Option<String>,
    pub error: Option<String>,
}

fn tone_key(tone: Tone) -> &'static str {
    match tone {
        Tone::Formal => "dashboard.tone.formal",
        Tone::SemiFormal => "dashboard.tone.semiFormal",
        Tone::Informal => "dashboard.tone.informal",
    }
}

/// The id of the element holding a flow's generated text.
pub fn result_id(flow: Flow) -> &'static str {
    match flow {
        Flow::Enhance => "enhance-result",
        Flow::Email => "email-result",
    }
}

fn tab_href(flow: Flow, tone: Tone) -> String {
    format!("/dashboard?tab={}&tone={}", flow.as_str(), tone.as_str())
}

pub fn dashboard(page: &Page, view: &DashboardView) -> Markup {
    let title = page.t("common.appName");
    page.render(
        &title,
        html! {
            section.card {
                div.row {
                    div {
                        h1 { (title) }
                        @if let Some(email) = &view.email {
                            p { (page.t_with("dashboard.signedInAs", &[("email", email.as_str())])) }
                        }
                    }
                    div.row {
                        a href="/" { (page.t("common.home")) }
                        form method="post" action="/logout" {
                            button.link type="submit" { (page.t("common.signOut")) }
                        }
                    }
                }
                nav.tabs {
                    @for flow in [Flow::Enhance, Flow::Email] {
                        a href=(tab_href(flow, view.tone))
                            aria-current=[(flow == view.tab).then_some("page")] {
                            (page.t(&format!("dashboard.tabs.{}", flow.as_str())))
                        }
                    }
                }
                @match view.tab {
                    Flow::Enhance => { (enhance_form(page, view)) }
                    Flow::Email => { (email_form(page, view)) }
                }
                (alert(view.error.as_deref()))
                @if let Some(result) = &view.result {
                    (result_panel(page, view.tab, result))
                }
            }
        },
    )
}

fn tone_picker(page: &Page, selected: Tone) -> Markup {
    html! {
        fieldset.tones {
            legend { (page.t("dashboard.tone.label")) }
            @for tone in Tone::ALL {
                label {
                    input type="radio" name="tone" value=(tone.as_str()) checked[tone == selected];
                    " " (page.t(tone_key(tone)))
                }
            }
        }
    }
}

fn actions(page: &Page, view: &DashboardView, button_key: &str) -> Markup {
    html! {
        div.row {
            button type="submit" { (page.t(button_key)) }
            a href=(tab_href(view.tab, view.tone)) { (page.t("dashboard.clear")) }
        }
    }
}

fn enhance_form(page: &Page, view: &DashboardView) -> Markup {
    html! {
        form method="post" action="/dashboard/enhance"
            data-loading-label=(page.t("dashboard.enhance.loading")) {
            (tone_picker(page, view.tone))
            label for="text" { (page.t("dashboard.enhance.inputLabel")) }
            textarea #text name="text" placeholder=(page.t("dashboard.enhance.placeholder")) {
                (view.text)
            }
            (actions(page, view, "dashboard.enhance.button"))
        }
    }
}

fn email_form(page: &Page, view: &DashboardView) -> Markup {
    html! {
        form method="post" action="/dashboard/email"
            data-loading-label=(page.t("dashboard.email.loading")) {
            (tone_picker(page, view.tone))
            label for="original_email" { (page.t("dashboard.email.originalLabel")) }
            textarea #original_email name="original_email"
                placeholder=(page.t("dashboard.email.originalPlaceholder")) {
                (view.original_email)
            }
            label for="draft_points" { (page.t("dashboard.email.draftLabel")) }
            textarea #draft_points name="draft_points"
                placeholder=(page.t("dashboard.email.draftPlaceholder")) {
                (view.draft_points)
            }
            (actions(page, view, "dashboard.email.button"))
        }
    }
}

fn result_panel(page: &Page, flow: Flow, result: &str) -> Markup {
    let label_key = match flow {
        Flow::Enhance => "dashboard.enhance.resultLabel",
        Flow::Email => "dashboard.email.resultLabel",
    };
    html! {
        section {
            div.row {
                h2 { (page.t(label_key)) }
                button type="button" data-copy-target=(result_id(flow))
                    data-copied-label=(page.t("dashboard.copied")) {
                    (page.t("dashboard.copy"))
                }
            }
            div.result id=(result_id(flow)) { (result) }
        }
    }
}
