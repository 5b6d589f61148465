//! Repository trait definitions.
//!
//! Persistence is reached only through these traits; `catalog-db` provides
//! the PostgreSQL implementations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    Attribute, Brand, Breadcrumb, Category, CategoryDetail, Collection, CreateAttributeRequest,
    CreateBrandRequest, CreateCategoryRequest, CreateCollectionRequest,
    CreateProductAttributeRequest, CreateProductImageRequest, CreateProductRequest,
    CreateUserRequest, Product, ProductAttribute, ProductDetail, ProductImage, Result, Session,
    UpdateBrandRequest, UpdateCategoryRequest, UpdateCollectionRequest, UpdateProductRequest,
    User,
};

// =============================================================================
// CATEGORY REPOSITORY
// =============================================================================

/// Repository for the category tree.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a category. The parent, when given, must exist.
    async fn create(&self, req: CreateCategoryRequest) -> Result<Uuid>;

    /// Get a category by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Category>>;

    /// Get a category by slug.
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// Categories with no parent, ordered by name.
    async fn list_roots(&self) -> Result<Vec<Category>>;

    /// Direct children of a category, ordered by name.
    async fn list_children(&self, parent_id: Uuid) -> Result<Vec<Category>>;

    /// Every category, ordered by name.
    async fn list_all(&self) -> Result<Vec<Category>>;

    /// Replace a category. Re-parenting that would form a cycle fails with
    /// `CycleDetected` and writes nothing.
    async fn update(&self, id: Uuid, req: UpdateCategoryRequest) -> Result<()>;

    /// Delete a category; its children become roots.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Ancestor names from the root down to this category.
    async fn breadcrumb(&self, id: Uuid) -> Result<Breadcrumb>;

    /// Category page data: breadcrumb, children, and published products.
    async fn detail_by_slug(&self, slug: &str) -> Result<Option<CategoryDetail>>;
}

// =============================================================================
// BRAND / COLLECTION / ATTRIBUTE REPOSITORIES
// =============================================================================

#[async_trait]
pub trait BrandRepository: Send + Sync {
    async fn create(&self, req: CreateBrandRequest) -> Result<Uuid>;
    async fn get(&self, id: Uuid) -> Result<Option<Brand>>;
    async fn list(&self) -> Result<Vec<Brand>>;
    async fn update(&self, id: Uuid, req: UpdateBrandRequest) -> Result<()>;
    /// Delete a brand; its products keep existing without one.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait CollectionRepository: Send + Sync {
    async fn create(&self, req: CreateCollectionRequest) -> Result<Uuid>;
    async fn get(&self, id: Uuid) -> Result<Option<Collection>>;
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Collection>>;
    async fn list(&self) -> Result<Vec<Collection>>;
    async fn update(&self, id: Uuid, req: UpdateCollectionRequest) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    /// Published products in a collection, newest first.
    async fn list_products(&self, id: Uuid) -> Result<Vec<Product>>;
}

#[async_trait]
pub trait AttributeRepository: Send + Sync {
    async fn create(&self, req: CreateAttributeRequest) -> Result<Uuid>;
    async fn get(&self, id: Uuid) -> Result<Option<Attribute>>;
    async fn list(&self) -> Result<Vec<Attribute>>;
    async fn rename(&self, id: Uuid, name: &str) -> Result<()>;
    /// Delete an attribute type together with all of its values.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// PRODUCT REPOSITORIES
// =============================================================================

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, req: CreateProductRequest) -> Result<Uuid>;
    async fn get(&self, id: Uuid) -> Result<Option<Product>>;
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>>;

    /// Every product (published or not), newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Product>>;

    /// Published products, newest first.
    async fn list_published(&self, limit: i64, offset: i64) -> Result<Vec<Product>>;

    /// Published products in one category, newest first.
    async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<Product>>;

    async fn update(&self, id: Uuid, req: UpdateProductRequest) -> Result<()>;

    /// Delete a product with its images and attribute links.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Replace the set of collections a product belongs to.
    async fn set_collections(&self, id: Uuid, collection_ids: &[Uuid]) -> Result<()>;

    /// Product page data for a published product.
    async fn detail_by_slug(&self, slug: &str) -> Result<Option<ProductDetail>>;
}

#[async_trait]
pub trait ProductImageRepository: Send + Sync {
    async fn add(&self, product_id: Uuid, req: CreateProductImageRequest) -> Result<Uuid>;
    /// Images of a product ordered by display order.
    async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<ProductImage>>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait ProductAttributeRepository: Send + Sync {
    async fn create(&self, req: CreateProductAttributeRequest) -> Result<Uuid>;
    async fn get(&self, id: Uuid) -> Result<Option<ProductAttribute>>;
    /// All attribute values, ordered by attribute name.
    async fn list(&self) -> Result<Vec<ProductAttribute>>;
    async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<ProductAttribute>>;
    async fn link_product(&self, id: Uuid, product_id: Uuid) -> Result<()>;
    async fn unlink_product(&self, id: Uuid, product_id: Uuid) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Accounts and sign-in sessions.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, req: CreateUserRequest) -> Result<Uuid>;

    /// Check credentials; `None` when the username or password is wrong.
    async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>>;

    /// Open a session and return its bearer token.
    async fn create_session(&self, user_id: Uuid, ttl: chrono::Duration) -> Result<String>;

    /// Resolve an unexpired session token.
    async fn session(&self, token: &str) -> Result<Option<Session>>;

    async fn delete_session(&self, token: &str) -> Result<()>;

    /// Change a password after verifying the old one. Other sessions of the
    /// user are closed.
    async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
        keep_session: &str,
    ) -> Result<()>;
}
