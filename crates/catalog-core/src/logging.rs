//! Structured logging schema and field name constants for the catalogue.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue (hierarchy cycle, failed login) |
//! | INFO  | Lifecycle events (startup, shutdown), writes |
//! | DEBUG | Decision points, request classification |
//! | TRACE | Per-item iteration (hierarchy hops, rows) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across a request. Format: UUIDv7.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "hierarchy"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "categories", "products", "htmx", "auth"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "breadcrumb", "create", "classify"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Category UUID being operated on.
pub const CATEGORY_ID: &str = "category_id";

/// Product UUID being operated on.
pub const PRODUCT_ID: &str = "product_id";

/// Parent category UUID during re-parenting.
pub const PARENT_ID: &str = "parent_id";

/// Account UUID.
pub const USER_ID: &str = "user_id";

/// URL slug used for a lookup.
pub const SLUG: &str = "slug";

/// Hierarchy depth reached by a walk.
pub const DEPTH: &str = "depth";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of rows or items returned.
pub const RESULT_COUNT: &str = "result_count";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Database table or entity affected.
pub const DB_TABLE: &str = "db_table";

// ─── Partial-refresh fields ────────────────────────────────────────────────

/// Whether the request was classified as a partial refresh.
pub const PARTIAL_REFRESH: &str = "partial_refresh";

/// Element id targeted by a partial refresh.
pub const HX_TARGET: &str = "hx_target";

/// Element id that triggered a partial refresh.
pub const HX_TRIGGER: &str = "hx_trigger";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_are_distinct_snake_case() {
        let fields = [
            REQUEST_ID, SUBSYSTEM, COMPONENT, OPERATION, CATEGORY_ID, PARENT_ID, USER_ID,
            PRODUCT_ID, SLUG, DEPTH, DURATION_MS, RESULT_COUNT, POOL_SIZE, POOL_IDLE, DB_TABLE,
            PARTIAL_REFRESH, HX_TARGET, HX_TRIGGER, SUCCESS, ERROR_MSG,
        ];
        let unique: std::collections::HashSet<_> = fields.iter().collect();
        assert_eq!(unique.len(), fields.len());
        assert!(fields
            .iter()
            .all(|f| f.chars().all(|c| c.is_ascii_lowercase() || c == '_')));
    }
}
