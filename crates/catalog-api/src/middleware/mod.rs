pub mod auth;
pub mod rate_limit;

pub use auth::{Auth, RequireStaff};
pub use rate_limit::{build_rate_limiter, rate_limit_middleware, GlobalRateLimiter};
