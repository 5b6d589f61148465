//! Session authentication extractors.
//!
//! The session token travels in the `catalog_session` cookie for browser
//! pages, or as `Authorization: Bearer <token>` for API clients.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::warn;

use catalog_core::{Session, UserRepository};

use crate::error::ApiError;
use crate::AppState;

pub const SESSION_COOKIE: &str = "catalog_session";

/// Value of a cookie in the `Cookie` request header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

/// Session token from the bearer header or the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    bearer.or_else(|| cookie_value(headers, SESSION_COOKIE).filter(|t| !t.is_empty()))
}

/// `Set-Cookie` value opening a session.
pub fn session_cookie(token: &str, ttl: chrono::Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl.num_seconds()
    )
}

/// `Set-Cookie` value removing the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Optional session of the current request.
///
/// Unknown or expired tokens resolve to `None`.
#[derive(Debug, Clone)]
pub struct Auth {
    pub session: Option<Session>,
    pub token: Option<String>,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(Auth {
                session: None,
                token: None,
            });
        };

        let session = state.db.users.session(&token).await?;
        Ok(Auth {
            session,
            token: Some(token),
        })
    }
}

/// Staff session required; used by the admin API.
#[derive(Debug, Clone)]
pub struct RequireStaff {
    pub session: Session,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = Auth::from_request_parts(parts, state).await?;

        let Some(session) = auth.session else {
            return Err(ApiError::Unauthorized(
                "Authentication required".to_string(),
            ));
        };
        if !session.user.is_staff {
            warn!(
                subsystem = "api",
                component = "auth",
                user_id = %session.user.id,
                "Non-staff user denied admin access"
            );
            return Err(ApiError::Forbidden("Staff access required".to_string()));
        }

        Ok(RequireStaff { session })
    }
}
