//! Request-scoped plumbing for [`HtmxSignals`].

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderValue, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use tracing::debug;

use super::signals::{classify, require_partial_refresh, HtmxSignals, NotFound};

/// Classify the request once and attach the signals to its extensions.
///
/// Every response gets `Vary: HX-Request`, since the same URL renders either
/// a full page or a fragment.
pub async fn htmx_middleware(mut request: Request, next: Next) -> Response {
    let signals = classify(request.headers());
    if signals.is_partial_refresh() {
        debug!(
            subsystem = "api",
            component = "htmx",
            partial_refresh = true,
            hx_target = signals.target.as_deref().unwrap_or(""),
            hx_trigger = signals.trigger.as_deref().unwrap_or(""),
            path = %request.uri().path(),
            "Partial refresh request"
        );
    }
    request.extensions_mut().insert(signals);

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("HX-Request"));
    response
}

/// Guard for fragment-only routes; install with `route_layer`.
///
/// Answers 404 unless the request is a partial refresh.
pub async fn partial_refresh_only(request: Request, next: Next) -> Response {
    let signals = request
        .extensions()
        .get::<HtmxSignals>()
        .cloned()
        .unwrap_or_else(|| classify(request.headers()));

    match require_partial_refresh(&signals) {
        Ok(()) => next.run(request).await,
        Err(not_found) => {
            debug!(
                subsystem = "api",
                component = "htmx",
                path = %request.uri().path(),
                "Fragment requested outside of a partial refresh"
            );
            not_found.into_response()
        }
    }
}

impl IntoResponse for NotFound {
    fn into_response(self) -> Response {
        (StatusCode::NOT_FOUND, Html("<h1>Not Found</h1>")).into_response()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for HtmxSignals
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<HtmxSignals>()
            .cloned()
            .unwrap_or_else(|| classify(&parts.headers)))
    }
}

/// Extractor form of the guard: rejects with 404 unless the request is a
/// partial refresh.
#[derive(Debug, Clone)]
pub struct PartialRefresh(pub HtmxSignals);

#[axum::async_trait]
impl<S> FromRequestParts<S> for PartialRefresh
where
    S: Send + Sync,
{
    type Rejection = NotFound;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let signals = HtmxSignals::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});
        require_partial_refresh(&signals)?;
        Ok(PartialRefresh(signals))
    }
}
