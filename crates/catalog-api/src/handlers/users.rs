//! Account pages: login, logout, password change and profile.
//!
//! Every form goes through the shared [`form_page`] template.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::info;

use catalog_core::{ChangePasswordRequest, Error, LoginRequest, UserRepository};

use crate::error::PageError;
use crate::htmx::HtmxSignals;
use crate::middleware::auth::{clear_session_cookie, session_cookie};
use crate::middleware::Auth;
use crate::render::{form_page, html_escape, Page};
use crate::AppState;

const LOGIN_PATH: &str = "/user/login/";
const PROFILE_PATH: &str = "/user/profile/";
const PASSWORD_CHANGE_PATH: &str = "/user/password/change/";

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed after login.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => PROFILE_PATH,
    }
}

/// Login path carrying `next` as a percent-encoded query value.
fn login_url(next: Option<&str>) -> String {
    match next {
        Some(n) => format!("{}?next={}", LOGIN_PATH, urlencoding::encode(n)),
        None => LOGIN_PATH.to_string(),
    }
}

fn login_form(next: Option<&str>, errors: &[String]) -> Page {
    form_page(
        "Log in",
        &login_url(next),
        &[
            ("username", "Username", "text"),
            ("password", "Password", "password"),
        ],
        "Log in",
        errors,
    )
}

fn password_change_form(errors: &[String]) -> Page {
    form_page(
        "Password change",
        PASSWORD_CHANGE_PATH,
        &[
            ("old_password", "Old password", "password"),
            ("new_password1", "New password", "password"),
            ("new_password2", "New password confirmation", "password"),
        ],
        "Change my password",
        errors,
    )
}

fn login_redirect(back_to: &str) -> Response {
    Redirect::to(&login_url(Some(back_to))).into_response()
}

pub async fn login_page(Query(query): Query<NextQuery>, signals: HtmxSignals) -> Response {
    login_form(query.next.as_deref(), &[]).render(&signals)
}

pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    signals: HtmxSignals,
    Form(form): Form<LoginRequest>,
) -> Result<Response, PageError> {
    let Some(user) = state
        .db
        .users
        .authenticate(&form.username, &form.password)
        .await?
    else {
        let errors = ["Please enter a correct username and password.".to_string()];
        return Ok(login_form(query.next.as_deref(), &errors).render(&signals));
    };

    let token = state
        .db
        .users
        .create_session(user.id, state.session_ttl)
        .await?;
    info!(
        subsystem = "api",
        component = "users",
        op = "login",
        user_id = %user.id,
        "User logged in"
    );

    Ok((
        [(header::SET_COOKIE, session_cookie(&token, state.session_ttl))],
        Redirect::to(safe_next(query.next.as_deref())),
    )
        .into_response())
}

pub async fn logout_page(signals: HtmxSignals) -> Response {
    Page::new(
        "Log out",
        r#"<h1>Log out</h1>
<form method="post" action="/user/logout/"><button type="submit" autofocus>Log out</button></form>"#,
    )
    .render(&signals)
}

pub async fn logout(
    State(state): State<AppState>,
    auth: Auth,
    signals: HtmxSignals,
) -> Result<Response, PageError> {
    if let Some(token) = &auth.token {
        state.db.users.delete_session(token).await?;
    }
    let page = Page::new(
        "Logged out",
        r#"<h1>Logged out</h1>
<p>Thanks for spending some quality time with the catalogue today.</p>
<p><a href="/user/login/">Log in again</a></p>"#,
    );
    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        page.render(&signals),
    )
        .into_response())
}

pub async fn password_change_page(auth: Auth, signals: HtmxSignals) -> Response {
    if auth.session.is_none() {
        return login_redirect(PASSWORD_CHANGE_PATH);
    }
    password_change_form(&[]).render(&signals)
}

pub async fn password_change(
    State(state): State<AppState>,
    auth: Auth,
    signals: HtmxSignals,
    Form(form): Form<ChangePasswordRequest>,
) -> Result<Response, PageError> {
    let (Some(session), Some(token)) = (auth.session, auth.token) else {
        return Ok(login_redirect(PASSWORD_CHANGE_PATH));
    };

    let result = match form.validate() {
        Ok(()) => {
            state
                .db
                .users
                .change_password(
                    session.user.id,
                    &form.old_password,
                    &form.new_password1,
                    &token,
                )
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Ok(Page::new(
            "Password change successful",
            "<h1>Password change successful</h1>\n<p>Your password was changed.</p>",
        )
        .render(&signals)),
        Err(Error::InvalidInput(msg)) => Ok(password_change_form(&[msg]).render(&signals)),
        Err(e) => Err(e.into()),
    }
}

pub async fn profile(auth: Auth, signals: HtmxSignals) -> Response {
    let Some(session) = auth.session else {
        return login_redirect(PROFILE_PATH);
    };
    let user = &session.user;
    let last_login = user
        .last_login
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());

    Page::new(
        user.username.clone(),
        format!(
            r#"<h1>{username}</h1>
<dl>
    <dt>Joined</dt><dd>{joined}</dd>
    <dt>Last login</dt><dd>{last_login}</dd>
    <dt>Staff</dt><dd>{staff}</dd>
</dl>
<p><a href="/user/password/change/">Change password</a></p>"#,
            username = html_escape(&user.username),
            joined = user.date_joined.format("%Y-%m-%d"),
            last_login = last_login,
            staff = if user.is_staff { "yes" } else { "no" },
        ),
    )
    .render(&signals)
}
