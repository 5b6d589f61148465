//! # catalog-api
//!
//! HTTP server for the product catalogue: public HTML pages that render as
//! full documents or htmx fragments, account pages, and a staff-only JSON
//! API under `/api/v1`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod htmx;
pub mod middleware;
pub mod render;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use catalog_db::Database;

use crate::config::ServerConfig;
use crate::handlers::{admin, components, pages, users};
use crate::middleware::{build_rate_limiter, rate_limit_middleware, GlobalRateLimiter};

/// Request bodies above this size are rejected.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
    pub session_ttl: chrono::Duration,
}

impl AppState {
    pub fn new(db: Database, config: &ServerConfig) -> Self {
        Self {
            db,
            rate_limiter: build_rate_limiter(config),
            session_ttl: config.session_ttl(),
        }
    }
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(admin::list_categories).post(admin::create_category),
        )
        .route(
            "/categories/:id",
            get(admin::get_category)
                .put(admin::update_category)
                .delete(admin::delete_category),
        )
        .route("/categories/:id/children", get(admin::category_children))
        .route("/categories/:id/breadcrumb", get(admin::category_breadcrumb))
        .route("/brands", get(admin::list_brands).post(admin::create_brand))
        .route(
            "/brands/:id",
            get(admin::get_brand)
                .put(admin::update_brand)
                .delete(admin::delete_brand),
        )
        .route(
            "/collections",
            get(admin::list_collections).post(admin::create_collection),
        )
        .route(
            "/collections/:id",
            get(admin::get_collection)
                .put(admin::update_collection)
                .delete(admin::delete_collection),
        )
        .route("/collections/:id/products", get(admin::collection_products))
        .route(
            "/attributes",
            get(admin::list_attributes).post(admin::create_attribute),
        )
        .route(
            "/attributes/:id",
            get(admin::get_attribute)
                .put(admin::rename_attribute)
                .delete(admin::delete_attribute),
        )
        .route(
            "/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/products/:id",
            get(admin::get_product)
                .put(admin::update_product)
                .delete(admin::delete_product),
        )
        .route(
            "/products/:id/collections",
            put(admin::set_product_collections),
        )
        .route(
            "/products/:id/images",
            get(admin::list_product_images).post(admin::add_product_image),
        )
        .route(
            "/products/:id/attributes",
            get(admin::list_product_attribute_values),
        )
        .route("/images/:id", delete(admin::delete_product_image))
        .route(
            "/product-attributes",
            get(admin::list_product_attributes).post(admin::create_product_attribute),
        )
        .route(
            "/product-attributes/:id",
            get(admin::get_product_attribute).delete(admin::delete_product_attribute),
        )
        .route(
            "/product-attributes/:id/products/:product_id",
            put(admin::link_product_attribute).delete(admin::unlink_product_attribute),
        )
        .route("/users", post(admin::create_user))
}

/// Assemble the full application router.
pub fn build_router(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    let fragments = Router::new()
        .route("/components/header/", get(components::header))
        .route_layer(axum::middleware::from_fn(htmx::partial_refresh_only));

    Router::new()
        .route("/", get(pages::index))
        .route("/categories/", get(pages::list_categories))
        .route("/categories/:slug/", get(pages::category_detail))
        .route("/collections/", get(pages::list_collections))
        .route("/collections/:slug/", get(pages::collection_detail))
        .route("/brands/", get(pages::list_brands))
        .route("/products/", get(pages::list_products))
        .route("/products/:slug/", get(pages::product_detail))
        .route("/user/login/", get(users::login_page).post(users::login))
        .route("/user/logout/", get(users::logout_page).post(users::logout))
        .route(
            "/user/password/change/",
            get(users::password_change_page).post(users::password_change),
        )
        .route("/user/profile/", get(users::profile))
        .merge(fragments)
        .nest("/api/v1", admin_routes())
        .route("/health", get(handlers::health_check))
        .fallback(pages::not_found)
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        // Outside the limiter so 429 responses also vary on HX-Request.
        .layer(axum::middleware::from_fn(htmx::htmx_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::AUTHORIZATION,
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    htmx::HX_REQUEST,
                    htmx::HX_BOOSTED,
                    htmx::HX_CURRENT_URL,
                    htmx::HX_HISTORY_RESTORE_REQUEST,
                    htmx::HX_PROMPT,
                    htmx::HX_TARGET,
                    htmx::HX_TRIGGER,
                    htmx::HX_TRIGGER_NAME,
                ])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
