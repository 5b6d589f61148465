//! Fragments loaded by htmx into the page layout.
//!
//! These routes sit behind `partial_refresh_only`; a direct browser visit
//! gets a 404.

use axum::{http::StatusCode, response::Response};

use crate::middleware::Auth;
use crate::render::{html_escape, html_response};

/// Site header: navigation plus the sign-in state.
pub async fn header(auth: Auth) -> Response {
    let account = match &auth.session {
        Some(session) => format!(
            r#"<a href="/user/profile/">{}</a> <a href="/user/logout/">salir</a>"#,
            html_escape(&session.user.username)
        ),
        None => r#"<a href="/user/login/">entrar</a>"#.to_string(),
    };

    let html = format!(
        r#"<nav class="site-nav">
    <a href="/">inicio</a>
    <a href="/categories/">categorías</a>
    <a href="/collections/">colecciones</a>
    <a href="/brands/">marcas</a>
    <a href="/products/">productos</a>
    <span class="account">{}</span>
</nav>"#,
        account
    );
    html_response(StatusCode::OK, html)
}
