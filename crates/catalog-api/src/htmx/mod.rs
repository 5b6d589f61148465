//! htmx partial-refresh support.

pub mod middleware;
pub mod signals;

pub use middleware::{htmx_middleware, partial_refresh_only, PartialRefresh};
pub use signals::{
    classify, require_partial_refresh, HtmxSignals, NotFound, HX_BOOSTED, HX_CURRENT_URL,
    HX_HISTORY_RESTORE_REQUEST, HX_PROMPT, HX_REQUEST, HX_TARGET, HX_TRIGGER, HX_TRIGGER_NAME,
};
