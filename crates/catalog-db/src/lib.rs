//! # catalog-db
//!
//! PostgreSQL database layer for the product catalogue.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for every catalogue entity
//! - Depth-bounded ancestor queries for the category tree
//! - Accounts with Argon2id password hashes and hashed session tokens
//!
//! ## Example
//!
//! ```rust,ignore
//! use catalog_db::{CategoryRepository, CreateCategoryRequest, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/catalog").await?;
//!
//!     let id = db.categories.create(CreateCategoryRequest {
//!         name: "Clothing".to_string(),
//!         ..Default::default()
//!     }).await?;
//!
//!     println!("{}", db.categories.breadcrumb(id).await?);
//!     Ok(())
//! }
//! ```
pub mod attributes;
pub mod brands;
pub mod categories;
pub mod collections;
pub mod pool;
pub mod product_attributes;
pub mod product_images;
pub mod products;
pub mod users;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use catalog_core::*;

pub use attributes::PgAttributeRepository;
pub use brands::PgBrandRepository;
pub use categories::PgCategoryRepository;
pub use collections::PgCollectionRepository;
pub use pool::{PoolConfig, PoolStatus};
pub use product_attributes::PgProductAttributeRepository;
pub use product_images::PgProductImageRepository;
pub use products::PgProductRepository;
pub use users::PgUserRepository;

/// Map a failed INSERT/UPDATE onto the domain error.
///
/// Unique violations become `Conflict`, foreign key violations (unknown
/// parent, category, brand...) become `InvalidInput`.
pub(crate) fn map_write_error(entity: &str, err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or("unknown");
        if db_err.is_unique_violation() {
            return Error::Conflict(format!(
                "{} violates unique constraint {}",
                entity, constraint
            ));
        }
        if db_err.is_foreign_key_violation() {
            return Error::InvalidInput(format!(
                "{} references a missing row ({})",
                entity, constraint
            ));
        }
        if db_err.is_check_violation() {
            return Error::InvalidInput(format!(
                "{} violates check constraint {}",
                entity, constraint
            ));
        }
    }
    Error::Database(err)
}

/// Map a failed DELETE onto the domain error.
///
/// A restricting foreign key (a category that still has products) becomes
/// `Conflict`.
pub(crate) fn map_delete_error(entity: &str, err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return Error::Conflict(format!("{} is still referenced and cannot be deleted", entity));
        }
    }
    Error::Database(err)
}

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Category tree repository.
    pub categories: PgCategoryRepository,
    pub brands: PgBrandRepository,
    pub collections: PgCollectionRepository,
    /// Attribute types (Color, Size...).
    pub attributes: PgAttributeRepository,
    pub products: PgProductRepository,
    pub product_images: PgProductImageRepository,
    /// Attribute values linked to products.
    pub product_attributes: PgProductAttributeRepository,
    /// Accounts and sessions.
    pub users: PgUserRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            categories: PgCategoryRepository::new(pool.clone()),
            brands: PgBrandRepository::new(pool.clone()),
            collections: PgCollectionRepository::new(pool.clone()),
            attributes: PgAttributeRepository::new(pool.clone()),
            products: PgProductRepository::new(pool.clone()),
            product_images: PgProductImageRepository::new(pool.clone()),
            product_attributes: PgProductAttributeRepository::new(pool.clone()),
            users: PgUserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = pool::connect(url, PoolConfig::default()).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = pool::connect(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Current pool occupancy.
    pub fn pool_status(&self) -> PoolStatus {
        PoolStatus::of(&self.pool)
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
