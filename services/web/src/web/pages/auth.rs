//! services/web/src/web/pages/auth.rs
//!
//! Login (with its "forgot password" mode), sign-up and password reset.

use maud::{html, Markup, PreEscaped};

use super::{alert, notice, Page};

/// Hands the recovery fragment to the server, which never sees it otherwise.
/// A fragment without an access token is reported as an invalid link at once.
const RECOVERY_SCRIPT: &str = r#"
(function () {
  var box = document.getElementById('reset-link-error');
  function invalid() { if (box) { box.hidden = false; } }
  var fragment = window.location.hash.substring(1);
  if (!new URLSearchParams(fragment).get('access_token')) { invalid(); return; }
  history.replaceState(null, '', window.location.pathname);
  var body = new URLSearchParams();
  body.set('fragment', fragment);
  fetch('/auth/recovery', { method: 'POST', body: body, credentials: 'same-origin' })
    .then(function (res) { if (!res.ok) { invalid(); } }, invalid);
})();
"#;

/// Seconds before a successful reset moves on to the login page.
pub const RESET_REDIRECT_SECS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginMode {
    #[default]
    SignIn,
    /// "Forgot password": only an email is asked for.
    Reset,
}

#[derive(Debug, Default)]
pub struct AuthForm {
    pub email: String,
    pub error: Option<String>,
    pub notice: Option<String>,
    /// No backend is configured.
    pub unavailable: bool,
}

pub fn login(page: &Page, mode: LoginMode, form: &AuthForm) -> Markup {
    let title = match mode {
        LoginMode::SignIn => page.t("auth.login.title"),
        LoginMode::Reset => page.t("auth.resetRequest.title"),
    };
    page.render(
        &title,
        html! {
            section.card {
                h1 { (title) }
                @if form.unavailable {
                    (alert(Some(&page.t("common.serviceUnavailable"))))
                } @else {
                    (alert(form.error.as_deref()))
                    (notice(form.notice.as_deref()))
                    @match mode {
                        LoginMode::SignIn => {
                            form method="post" action="/login"
                                data-loading-label=(page.t("auth.login.signingIn")) {
                                (email_field(page, &form.email))
                                label for="password" { (page.t("common.password")) }
                                input #password type="password" name="password" required
                                    autocomplete="current-password";
                                button type="submit" { (page.t("common.signIn")) }
                            }
                            p { a href="/login?mode=reset" { (page.t("auth.login.forgotPassword")) } }
                            p { a href="/signup" { (page.t("auth.login.noAccount")) } }
                        }
                        LoginMode::Reset => {
                            form method="post" action="/login/reset"
                                data-loading-label=(page.t("auth.resetRequest.sending")) {
                                (email_field(page, &form.email))
                                button type="submit" { (page.t("auth.resetRequest.send")) }
                            }
                            p { a href="/login" { (page.t("common.backToLogin")) } }
                        }
                    }
                }
                p { a href="/" { (page.t("common.backToHome")) } }
            }
        },
    )
}

pub fn signup(page: &Page, form: &AuthForm) -> Markup {
    let title = page.t("auth.signup.title");
    page.render(
        &title,
        html! {
            section.card {
                h1 { (title) }
                @if form.unavailable {
                    (alert(Some(&page.t("common.serviceUnavailable"))))
                } @else {
                    (alert(form.error.as_deref()))
                    form method="post" action="/signup"
                        data-loading-label=(page.t("auth.signup.creatingAccount")) {
                        (email_field(page, &form.email))
                        label for="password" { (page.t("common.password")) }
                        input #password type="password" name="password" required
                            autocomplete="new-password";
                        button type="submit" { (page.t("common.createAccount")) }
                    }
                    p { a href="/login" { (page.t("auth.signup.haveAccount")) } }
                }
                p { a href="/" { (page.t("common.backToHome")) } }
            }
        },
    )
}

#[derive(Debug, Default)]
pub struct ResetForm {
    pub error: Option<String>,
    pub success: bool,
    pub unavailable: bool,
}

pub fn reset_password(page: &Page, form: &ResetForm) -> Markup {
    let title = page.t("auth.reset.title");
    page.render(
        &title,
        html! {
            @if form.success {
                meta http-equiv="refresh" content={ (RESET_REDIRECT_SECS) ";url=/login" };
            }
            section.card {
                h1 { (title) }
                @if form.unavailable {
                    (alert(Some(&page.t("common.serviceUnavailable"))))
                } @else if form.success {
                    (notice(Some(&page.t("auth.reset.success"))))
                } @else {
                    p.error #reset-link-error role="alert" hidden {
                        (page.t("auth.reset.invalidLink"))
                    }
                    (alert(form.error.as_deref()))
                    form method="post" action="/reset-password"
                        data-loading-label=(page.t("auth.reset.resetting")) {
                        label for="password" { (page.t("auth.reset.newPassword")) }
                        input #password type="password" name="password" required
                            autocomplete="new-password";
                        label for="confirm" { (page.t("auth.reset.confirmPassword")) }
                        input #confirm type="password" name="confirm" required
                            autocomplete="new-password";
                        button type="submit" { (page.t("auth.reset.submit")) }
                    }
                    // Re-rendered forms carry an error and no fragment.
                    @if form.error.is_none() {
                        script { (PreEscaped(RECOVERY_SCRIPT)) }
                    }
                }
                p { a href="/login" { (page.t("common.backToLogin")) } }
            }
        },
    )
}

fn email_field(page: &Page, value: &str) -> Markup {
    html! {
        label for="email" { (page.t("common.email")) }
        input #email type="email" name="email" value=(value) required autocomplete="email";
    }
}
