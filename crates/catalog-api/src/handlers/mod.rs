//! HTTP handlers.

pub mod admin;
pub mod components;
pub mod pages;
pub mod users;

use axum::{extract::State, response::IntoResponse, Json};

use crate::AppState;

/// Liveness plus pool occupancy.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let pool = state.db.pool_status();
    let status = if pool.is_saturated() {
        "degraded"
    } else {
        "healthy"
    };
    Json(serde_json::json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "pool": {
            "size": pool.size,
            "idle": pool.idle,
            "in_use": pool.in_use(),
            "max_connections": pool.max_connections,
        },
    }))
}
