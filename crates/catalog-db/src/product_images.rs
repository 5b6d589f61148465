//! Product image repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use catalog_core::{
    new_v7, CreateProductImageRequest, Error, ProductImage, ProductImageRepository, Result,
};

use crate::map_write_error;

/// PostgreSQL implementation of ProductImageRepository.
pub struct PgProductImageRepository {
    pool: Pool<Postgres>,
}

impl PgProductImageRepository {
    /// Create a new PgProductImageRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductImageRepository for PgProductImageRepository {
    async fn add(&self, product_id: Uuid, req: CreateProductImageRequest) -> Result<Uuid> {
        req.validate()?;
        let id = new_v7();

        sqlx::query(
            r#"
            INSERT INTO product_image (id, product_id, image, alt_text, caption, display_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(product_id)
        .bind(&req.image)
        .bind(&req.alt_text)
        .bind(&req.caption)
        .bind(req.display_order)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("product image", e))?;

        info!(
            subsystem = "db",
            component = "product_images",
            op = "add",
            product_id = %product_id,
            image_id = %id,
            "Product image added"
        );
        Ok(id)
    }

    async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<ProductImage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, image, alt_text, caption, display_order
            FROM product_image
            WHERE product_id = $1
            ORDER BY display_order, id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| ProductImage {
                id: r.get("id"),
                product_id: r.get("product_id"),
                image: r.get("image"),
                alt_text: r.get("alt_text"),
                caption: r.get("caption"),
                display_order: r.get("display_order"),
            })
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM product_image WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Product image {}", id)));
        }
        Ok(())
    }
}
