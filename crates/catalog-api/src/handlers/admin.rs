//! Staff-only JSON API for managing the catalogue.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use catalog_core::{
    AttributeRepository, BrandRepository, CategoryRepository, CollectionRepository,
    CreateAttributeRequest, CreateBrandRequest, CreateCategoryRequest, CreateCollectionRequest,
    CreateProductAttributeRequest, CreateProductImageRequest, CreateProductRequest,
    CreateUserRequest, ProductAttributeRepository, ProductImageRepository, ProductRepository,
    UserRepository,
};

use crate::error::ApiError;
use crate::middleware::RequireStaff;
use crate::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

fn created(id: Uuid) -> impl IntoResponse {
    (StatusCode::CREATED, Json(serde_json::json!({ "id": id })))
}

fn not_found(kind: &str, id: Uuid) -> ApiError {
    ApiError::NotFound(format!("{} {} not found", kind, id))
}

// =============================================================================
// CATEGORIES
// =============================================================================

pub async fn list_categories(
    _staff: RequireStaff,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.categories.list_all().await?))
}

pub async fn create_category(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created(state.db.categories.create(body).await?))
}

pub async fn get_category(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .db
        .categories
        .get(id)
        .await?
        .ok_or_else(|| not_found("Category", id))?;
    Ok(Json(category))
}

pub async fn update_category(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.categories.update(id, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_category(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn category_children(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.categories.list_children(id).await?))
}

/// Breadcrumb as entries plus its rendered text.
pub async fn category_breadcrumb(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let crumb = state.db.categories.breadcrumb(id).await?;
    Ok(Json(serde_json::json!({
        "names": crumb.names(),
        "text": crumb.to_string(),
        "entries": &crumb.entries,
    })))
}

// =============================================================================
// BRANDS
// =============================================================================

pub async fn list_brands(
    _staff: RequireStaff,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.brands.list().await?))
}

pub async fn create_brand(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Json(body): Json<CreateBrandRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created(state.db.brands.create(body).await?))
}

pub async fn get_brand(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let brand = state
        .db
        .brands
        .get(id)
        .await?
        .ok_or_else(|| not_found("Brand", id))?;
    Ok(Json(brand))
}

pub async fn update_brand(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateBrandRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.brands.update(id, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_brand(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.brands.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// COLLECTIONS
// =============================================================================

pub async fn list_collections(
    _staff: RequireStaff,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.collections.list().await?))
}

pub async fn create_collection(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Json(body): Json<CreateCollectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created(state.db.collections.create(body).await?))
}

pub async fn get_collection(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = state
        .db
        .collections
        .get(id)
        .await?
        .ok_or_else(|| not_found("Collection", id))?;
    Ok(Json(collection))
}

pub async fn update_collection(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateCollectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.collections.update(id, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_collection(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.collections.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn collection_products(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.collections.list_products(id).await?))
}

// =============================================================================
// ATTRIBUTES
// =============================================================================

pub async fn list_attributes(
    _staff: RequireStaff,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.attributes.list().await?))
}

pub async fn create_attribute(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Json(body): Json<CreateAttributeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created(state.db.attributes.create(body).await?))
}

pub async fn get_attribute(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let attribute = state
        .db
        .attributes
        .get(id)
        .await?
        .ok_or_else(|| not_found("Attribute", id))?;
    Ok(Json(attribute))
}

pub async fn rename_attribute(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateAttributeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.attributes.rename(id, &body.name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_attribute(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.attributes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// PRODUCTS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Restrict to published products.
    #[serde(default)]
    pub published: bool,
}

pub async fn list_products(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);
    let products = if query.published {
        state.db.products.list_published(limit, offset).await?
    } else {
        state.db.products.list(limit, offset).await?
    };
    Ok(Json(products))
}

pub async fn create_product(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created(state.db.products.create(body).await?))
}

pub async fn get_product(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .db
        .products
        .get(id)
        .await?
        .ok_or_else(|| not_found("Product", id))?;
    Ok(Json(product))
}

pub async fn update_product(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.products.update(id, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_product(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.products.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SetCollectionsBody {
    pub collection_ids: Vec<Uuid>,
}

pub async fn set_product_collections(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetCollectionsBody>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .products
        .set_collections(id, &body.collection_ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_product_images(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.product_images.list_for_product(id).await?))
}

pub async fn add_product_image(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateProductImageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created(state.db.product_images.add(id, body).await?))
}

pub async fn delete_product_image(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.product_images.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_product_attribute_values(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.product_attributes.list_for_product(id).await?))
}

// =============================================================================
// PRODUCT ATTRIBUTE VALUES
// =============================================================================

pub async fn list_product_attributes(
    _staff: RequireStaff,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.product_attributes.list().await?))
}

pub async fn create_product_attribute(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Json(body): Json<CreateProductAttributeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created(state.db.product_attributes.create(body).await?))
}

pub async fn get_product_attribute(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let value = state
        .db
        .product_attributes
        .get(id)
        .await?
        .ok_or_else(|| not_found("Product attribute", id))?;
    Ok(Json(value))
}

pub async fn delete_product_attribute(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.product_attributes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn link_product_attribute(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .product_attributes
        .link_product(id, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unlink_product_attribute(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .product_attributes
        .unlink_product(id, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// USERS
// =============================================================================

pub async fn create_user(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created(state.db.users.create(body).await?))
}
