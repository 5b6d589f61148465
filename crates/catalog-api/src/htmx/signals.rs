//! Partial-refresh request signals.
//!
//! htmx marks the requests it issues with a fixed set of `HX-*` headers.
//! [`classify`] reads them once into an immutable [`HtmxSignals`] value that
//! handlers receive explicitly.

use axum::http::{HeaderMap, HeaderName};
use serde::Serialize;

pub const HX_BOOSTED: HeaderName = HeaderName::from_static("hx-boosted");
pub const HX_CURRENT_URL: HeaderName = HeaderName::from_static("hx-current-url");
pub const HX_HISTORY_RESTORE_REQUEST: HeaderName =
    HeaderName::from_static("hx-history-restore-request");
pub const HX_PROMPT: HeaderName = HeaderName::from_static("hx-prompt");
pub const HX_REQUEST: HeaderName = HeaderName::from_static("hx-request");
pub const HX_TARGET: HeaderName = HeaderName::from_static("hx-target");
pub const HX_TRIGGER_NAME: HeaderName = HeaderName::from_static("hx-trigger-name");
pub const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");

/// Signals extracted from the `HX-*` request headers.
///
/// Every field is `None` when its header is absent. Header names are matched
/// case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HtmxSignals {
    pub boosted: Option<String>,
    pub current_url: Option<String>,
    pub history_restore_request: Option<String>,
    pub prompt: Option<String>,
    pub request: Option<String>,
    pub target: Option<String>,
    pub trigger_name: Option<String>,
    pub trigger: Option<String>,
}

impl HtmxSignals {
    /// True when the request was issued by htmx (`HX-Request` is set).
    pub fn is_partial_refresh(&self) -> bool {
        is_set(&self.request)
    }

    /// True for links and forms upgraded with `hx-boost`.
    pub fn is_boosted(&self) -> bool {
        is_set(&self.boosted)
    }

    /// True when htmx is restoring a page missing from its history cache.
    /// Such requests need the full document.
    pub fn is_history_restore(&self) -> bool {
        is_set(&self.history_restore_request)
    }

    /// Whether the response should be the bare content fragment.
    pub fn wants_fragment(&self) -> bool {
        self.is_partial_refresh() && !self.is_history_restore()
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

fn header(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Read the `HX-*` headers of a request.
pub fn classify(headers: &HeaderMap) -> HtmxSignals {
    HtmxSignals {
        boosted: header(headers, &HX_BOOSTED),
        current_url: header(headers, &HX_CURRENT_URL),
        history_restore_request: header(headers, &HX_HISTORY_RESTORE_REQUEST),
        prompt: header(headers, &HX_PROMPT),
        request: header(headers, &HX_REQUEST),
        target: header(headers, &HX_TARGET),
        trigger_name: header(headers, &HX_TRIGGER_NAME),
        trigger: header(headers, &HX_TRIGGER),
    }
}

/// Outcome of a fragment-only endpoint hit outside of a partial refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("not found")]
pub struct NotFound;

/// Let a fragment-only handler proceed only for partial refreshes.
pub fn require_partial_refresh(signals: &HtmxSignals) -> Result<(), NotFound> {
    if signals.is_partial_refresh() {
        Ok(())
    } else {
        Err(NotFound)
    }
}
