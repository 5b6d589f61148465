//! Product repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use catalog_core::{
    new_v7, BrandRepository, CreateProductRequest, Error, Product, ProductAttributeRepository,
    ProductDetail, ProductImageRepository, ProductRepository, Result, UpdateProductRequest,
};

use crate::brands::PgBrandRepository;
use crate::categories::fetch_breadcrumb;
use crate::collections::PgCollectionRepository;
use crate::product_attributes::PgProductAttributeRepository;
use crate::product_images::PgProductImageRepository;
use crate::{map_delete_error, map_write_error};

/// Columns selected for every product query; `p` aliases the product table.
pub(crate) const PRODUCT_COLUMNS: &str = r#"
    p.id, p.name, p.sku, p.slug, p.description, p.short_description,
    p.is_published, p.date_created, p.date_updated, p.category_id, p.brand_id,
    ARRAY(
        SELECT pc.collection_id FROM product_collection pc
        WHERE pc.product_id = p.id
        ORDER BY pc.collection_id
    ) AS collection_ids
"#;

pub(crate) fn product_from_row(r: &PgRow) -> Product {
    Product {
        id: r.get("id"),
        name: r.get("name"),
        sku: r.get("sku"),
        slug: r.get("slug"),
        description: r.get("description"),
        short_description: r.get("short_description"),
        is_published: r.get("is_published"),
        date_created: r.get("date_created"),
        date_updated: r.get("date_updated"),
        category_id: r.get("category_id"),
        brand_id: r.get("brand_id"),
        collection_ids: r.get("collection_ids"),
    }
}

/// PostgreSQL implementation of ProductRepository.
pub struct PgProductRepository {
    pool: Pool<Postgres>,
}

impl PgProductRepository {
    /// Create a new PgProductRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn replace_collections(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        collection_ids: &[Uuid],
    ) -> Result<()> {
        sqlx::query("DELETE FROM product_collection WHERE product_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        if !collection_ids.is_empty() {
            sqlx::query(
                "INSERT INTO product_collection (product_id, collection_id)
                 SELECT $1, c FROM UNNEST($2::uuid[]) AS c
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(collection_ids)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_write_error("product collection", e))?;
        }
        Ok(())
    }

    async fn fetch_where(&self, clause: &str, bind: ProductFilter<'_>) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM product p WHERE {} ORDER BY p.date_created DESC, p.id DESC",
            PRODUCT_COLUMNS, clause
        );
        let query = sqlx::query(&sql);
        let query = match bind {
            ProductFilter::Id(id) => query.bind(id),
            ProductFilter::Slug(slug) => query.bind(slug),
        };
        let rows = query.fetch_all(&self.pool).await.map_err(Error::Database)?;
        Ok(rows.iter().map(product_from_row).collect())
    }

    async fn fetch_page(&self, clause: &str, limit: i64, offset: i64) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM product p WHERE {}
             ORDER BY p.date_created DESC, p.id DESC LIMIT $1 OFFSET $2",
            PRODUCT_COLUMNS, clause
        );
        let rows = sqlx::query(&sql)
            .bind(limit.max(0))
            .bind(offset.max(0))
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows.iter().map(product_from_row).collect())
    }
}

/// Single parameter bound by `fetch_where`.
enum ProductFilter<'a> {
    Id(Uuid),
    Slug(&'a str),
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, req: CreateProductRequest) -> Result<Uuid> {
        let slug = req.validate()?;
        let id = new_v7();
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query(
            r#"
            INSERT INTO product (
                id, name, sku, slug, description, short_description, is_published,
                date_created, date_updated, category_id, brand_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(req.name.trim())
        .bind(req.sku.trim())
        .bind(&slug)
        .bind(&req.description)
        .bind(&req.short_description)
        .bind(req.is_published)
        .bind(now)
        .bind(req.category_id)
        .bind(req.brand_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error("product", e))?;

        Self::replace_collections(&mut tx, id, &req.collection_ids).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "products",
            op = "create",
            product_id = %id,
            slug = %slug,
            "Product created"
        );
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self
            .fetch_where("p.id = $1", ProductFilter::Id(id))
            .await?
            .into_iter()
            .next())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        Ok(self
            .fetch_where("p.slug = $1", ProductFilter::Slug(slug))
            .await?
            .into_iter()
            .next())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Product>> {
        self.fetch_page("TRUE", limit, offset).await
    }

    async fn list_published(&self, limit: i64, offset: i64) -> Result<Vec<Product>> {
        self.fetch_page("p.is_published", limit, offset).await
    }

    async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<Product>> {
        self.fetch_where(
            "p.category_id = $1 AND p.is_published",
            ProductFilter::Id(category_id),
        )
        .await
    }

    async fn update(&self, id: Uuid, req: UpdateProductRequest) -> Result<()> {
        let slug = req.validate()?;
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let result = sqlx::query(
            r#"
            UPDATE product SET
                name = $1, sku = $2, slug = $3, description = $4,
                short_description = $5, is_published = $6, category_id = $7,
                brand_id = $8, date_updated = $9
            WHERE id = $10
            "#,
        )
        .bind(req.name.trim())
        .bind(req.sku.trim())
        .bind(&slug)
        .bind(&req.description)
        .bind(&req.short_description)
        .bind(req.is_published)
        .bind(req.category_id)
        .bind(req.brand_id)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error("product", e))?;

        if result.rows_affected() == 0 {
            return Err(Error::ProductNotFound(id));
        }

        Self::replace_collections(&mut tx, id, &req.collection_ids).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "products",
            op = "update",
            product_id = %id,
            "Product updated"
        );
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        // Images and M2M links cascade.
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error("product", e))?;

        if result.rows_affected() == 0 {
            return Err(Error::ProductNotFound(id));
        }
        info!(
            subsystem = "db",
            component = "products",
            op = "delete",
            product_id = %id,
            "Product deleted"
        );
        Ok(())
    }

    async fn set_collections(&self, id: Uuid, collection_ids: &[Uuid]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM product WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(Error::Database)?;
        if !exists {
            return Err(Error::ProductNotFound(id));
        }

        Self::replace_collections(&mut tx, id, collection_ids).await?;
        sqlx::query("UPDATE product SET date_updated = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn detail_by_slug(&self, slug: &str) -> Result<Option<ProductDetail>> {
        let product = match self.get_by_slug(slug).await? {
            Some(p) if p.is_published => p,
            _ => {
                debug!(
                    subsystem = "db",
                    component = "products",
                    op = "detail",
                    slug = %slug,
                    "No published product for slug"
                );
                return Ok(None);
            }
        };

        let breadcrumb = fetch_breadcrumb(&self.pool, product.category_id).await?;
        let brand = match product.brand_id {
            Some(brand_id) => PgBrandRepository::new(self.pool.clone()).get(brand_id).await?,
            None => None,
        };
        let collections = PgCollectionRepository::new(self.pool.clone())
            .list_for_product(product.id)
            .await?;
        let images = PgProductImageRepository::new(self.pool.clone())
            .list_for_product(product.id)
            .await?;
        let attributes = PgProductAttributeRepository::new(self.pool.clone())
            .list_for_product(product.id)
            .await?;

        Ok(Some(ProductDetail {
            product,
            breadcrumb,
            brand,
            collections,
            images,
            attributes,
        }))
    }
}
