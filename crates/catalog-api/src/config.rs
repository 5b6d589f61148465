//! Server configuration from environment variables.
//!
//! ```text
//! DATABASE_URL            postgres://localhost/catalog
//! HOST / PORT             0.0.0.0 / 3000
//! ALLOWED_ORIGINS         comma-separated CORS origins
//! RATE_LIMIT_ENABLED      true
//! RATE_LIMIT_REQUESTS     100 per RATE_LIMIT_PERIOD_SECS (60)
//! SESSION_TTL_HOURS       336
//! DB_MAX_CONNECTIONS      10
//! ```

use std::str::FromStr;

use axum::http::HeaderValue;

pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub allowed_origins: String,
    pub rate_limit_enabled: bool,
    pub rate_limit_requests: u64,
    pub rate_limit_period_secs: u64,
    pub session_ttl_hours: i64,
    pub db_max_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/catalog".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.to_string(),
            rate_limit_enabled: true,
            rate_limit_requests: 100,
            rate_limit_period_secs: 60,
            session_ttl_hours: 24 * 14,
            db_max_connections: catalog_db::pool::DEFAULT_MAX_CONNECTIONS,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

impl ServerConfig {
    /// Read the configuration; unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(d.database_url),
            host: std::env::var("HOST").unwrap_or(d.host),
            port: env_or("PORT", d.port),
            allowed_origins: std::env::var("ALLOWED_ORIGINS").unwrap_or(d.allowed_origins),
            rate_limit_enabled: env_flag("RATE_LIMIT_ENABLED", d.rate_limit_enabled),
            rate_limit_requests: env_or("RATE_LIMIT_REQUESTS", d.rate_limit_requests),
            rate_limit_period_secs: env_or("RATE_LIMIT_PERIOD_SECS", d.rate_limit_period_secs),
            session_ttl_hours: env_or("SESSION_TTL_HOURS", d.session_ttl_hours),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", d.db_max_connections),
        }
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours.max(1))
    }
}

/// Parse a comma-separated origin whitelist, skipping invalid entries.
///
/// ```text
/// ALLOWED_ORIGINS=https://shop.example.com,http://localhost:3000
/// ```
pub fn parse_allowed_origins(raw: &str) -> Vec<HeaderValue> {
    if raw.trim().is_empty() {
        return vec![HeaderValue::from_static(DEFAULT_ALLOWED_ORIGINS)];
    }

    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.session_ttl(), chrono::Duration::hours(336));
        assert!(config.rate_limit_enabled);
    }

    #[test]
    fn test_parse_allowed_origins() {
        let origins = parse_allowed_origins(" https://a.example , ,http://localhost:3000");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "https://a.example");
    }

    #[test]
    fn test_empty_origins_use_default() {
        let origins = parse_allowed_origins("  ");
        assert_eq!(origins, vec![HeaderValue::from_static(DEFAULT_ALLOWED_ORIGINS)]);
    }

    #[test]
    fn test_non_positive_ttl_is_clamped() {
        let config = ServerConfig {
            session_ttl_hours: 0,
            ..Default::default()
        };
        assert_eq!(config.session_ttl(), chrono::Duration::hours(1));
    }
}
