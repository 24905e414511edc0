//! services/web/src/web/pages/mod.rs
//!
//! Server-rendered screens. Every page is built through [`Page::render`],
//! which wraps the content in the shared layout: `lang`/`dir` attributes,
//! the language selector, the footer and the small script that disables a
//! form's submit button while it is in flight.

pub mod auth;
pub mod dashboard;
pub mod landing;

use clearcom_core::i18n::{Locale, Translator};
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::web::state::AppState;

const STYLE: &str = r#"
*{box-sizing:border-box}
body{margin:0;font-family:system-ui,sans-serif;color:#111827;background:#f9fafb;display:flex;flex-direction:column;min-height:100vh}
header.top,footer{display:flex;justify-content:space-between;align-items:center;gap:1rem;padding:1rem 1.5rem;background:#fff;border-bottom:1px solid #e5e7eb}
footer{border-top:1px solid #e5e7eb;border-bottom:0;font-size:.875rem;color:#4b5563;flex-wrap:wrap}
main{flex:1;width:100%;max-width:56rem;margin:0 auto;padding:2rem 1.5rem}
a{color:#4f46e5}
.brand{font-weight:700;font-size:1.25rem;text-decoration:none;color:#111827}
.card{background:#fff;border:1px solid #e5e7eb;border-radius:.75rem;padding:2rem;margin-bottom:1.5rem}
.features{display:grid;grid-template-columns:repeat(auto-fit,minmax(16rem,1fr));gap:1.5rem}
label{display:block;font-weight:500;margin:.75rem 0 .25rem}
input[type=email],input[type=password],textarea,select{width:100%;padding:.5rem .75rem;border:1px solid #d1d5db;border-radius:.5rem;font:inherit}
textarea{min-height:8rem}
button,.button{display:inline-block;margin-top:1rem;padding:.5rem 1rem;border:0;border-radius:.5rem;background:#4f46e5;color:#fff;font:inherit;cursor:pointer;text-decoration:none}
button:disabled{opacity:.6;cursor:wait}
.link{background:none;color:#4f46e5;padding:0;margin:0}
.error{color:#b91c1c;background:#fef2f2;border-radius:.5rem;padding:.75rem}
.notice{color:#166534;background:#f0fdf4;border-radius:.5rem;padding:.75rem}
.tabs{display:flex;gap:1rem;border-bottom:1px solid #e5e7eb;margin-bottom:1.5rem}
.tabs a{padding:.5rem 0;text-decoration:none;color:#4b5563}
.tabs a[aria-current=page]{color:#4f46e5;border-bottom:2px solid #4f46e5}
.tones{display:flex;gap:1rem;border:0;padding:0}
.tones label{display:inline;font-weight:400}
.result{white-space:pre-wrap;background:#f9fafb;border:1px solid #e5e7eb;border-radius:.5rem;padding:1rem}
.row{display:flex;justify-content:space-between;align-items:center;gap:1rem}
.sr-only{position:absolute;width:1px;height:1px;overflow:hidden;clip:rect(0 0 0 0)}
"#;

const SCRIPT: &str = r#"
document.querySelectorAll('form[data-loading-label]').forEach(function (form) {
  form.addEventListener('submit', function () {
    form.querySelectorAll('button[type=submit]').forEach(function (button) {
      button.disabled = true;
      button.textContent = form.dataset.loadingLabel;
    });
  });
});
window.addEventListener('pageshow', function (event) {
  if (event.persisted) { window.location.reload(); }
});
document.querySelectorAll('[data-copy-target]').forEach(function (button) {
  button.addEventListener('click', function () {
    var target = document.getElementById(button.dataset.copyTarget);
    if (!target || !navigator.clipboard) { return; }
    var label = button.textContent;
    navigator.clipboard.writeText(target.textContent).then(function () {
      button.textContent = button.dataset.copiedLabel;
      setTimeout(function () { button.textContent = label; }, 2000);
    }, function (err) { console.error('Failed to copy text:', err); });
  });
});
"#;

/// Per-request rendering context.
pub struct Page<'a> {
    pub locale: Locale,
    translator: &'a Translator,
    support_email: &'a str,
    /// Where the language selector returns to.
    path: String,
}

impl<'a> Page<'a> {
    pub fn new(state: &'a AppState, locale: Locale, path: impl Into<String>) -> Self {
        Self {
            locale,
            translator: &state.translator,
            support_email: &state.config.support_email,
            path: path.into(),
        }
    }

    pub fn t(&self, key: &str) -> String {
        self.translator.t(self.locale, key)
    }

    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.translator.t_with(self.locale, key, args)
    }

    /// Wraps `content` in the shared layout.
    pub fn render(&self, title: &str, content: Markup) -> Markup {
        let app_name = self.t("common.appName");
        html! {
            (DOCTYPE)
            html lang=(self.locale.code()) dir=(self.locale.direction()) {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { (title) " | " (app_name) }
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    header.top {
                        a.brand href="/" { (app_name) }
                        (self.language_selector())
                    }
                    main { (content) }
                    footer {
                        span { (self.t("common.copyright")) }
                        span {
                            (self.t("common.support")) " "
                            a href={ "mailto:" (self.support_email) } { (self.support_email) }
                        }
                    }
                    script { (PreEscaped(SCRIPT)) }
                }
            }
        }
    }

    fn language_selector(&self) -> Markup {
        html! {
            form method="post" action="/language" {
                input type="hidden" name="redirect" value=(self.path);
                label.sr-only for="lang" { (self.t("common.language")) }
                select #lang name="lang" onchange="this.form.submit()" {
                    @for locale in Locale::ALL {
                        option value=(locale.code()) selected[locale == self.locale] {
                            (locale.native_name())
                        }
                    }
                }
                noscript { button type="submit" { "OK" } }
            }
        }
    }

    /// The full-page error shown when the backend cannot be used.
    pub fn error(&self, body_key: &str, retry_href: Option<&str>) -> Markup {
        let title = self.t("errors.unavailableTitle");
        self.render(
            &title,
            html! {
                section.card {
                    h1 { (title) }
                    p.error role="alert" { (self.t(body_key)) }
                    @if let Some(href) = retry_href {
                        a.button href=(href) { (self.t("errors.retry")) }
                    }
                    p { a href="/" { (self.t("common.backToHome")) } }
                }
            },
        )
    }
}

/// An inline alert, rendered only when there is something to say.
pub fn alert(message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message {
            p.error role="alert" { (message) }
        }
    }
}

pub fn notice(message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message {
            p.notice role="status" { (message) }
        }
    }
}
