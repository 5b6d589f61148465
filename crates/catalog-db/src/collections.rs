//! Collection repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use catalog_core::{
    new_v7, Collection, CollectionRepository, CreateCollectionRequest, Error, Product, Result,
    UpdateCollectionRequest,
};

use crate::products::{product_from_row, PRODUCT_COLUMNS};
use crate::{map_delete_error, map_write_error};

/// PostgreSQL implementation of CollectionRepository.
pub struct PgCollectionRepository {
    pool: Pool<Postgres>,
}

impl PgCollectionRepository {
    /// Create a new PgCollectionRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Collections a product belongs to, ordered by name.
    pub async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<Collection>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.name, c.slug, c.description
            FROM collection c
            JOIN product_collection pc ON pc.collection_id = c.id
            WHERE pc.product_id = $1
            ORDER BY c.name, c.id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(collection_from_row).collect())
    }
}

fn collection_from_row(r: &PgRow) -> Collection {
    Collection {
        id: r.get("id"),
        name: r.get("name"),
        slug: r.get("slug"),
        description: r.get("description"),
    }
}

#[async_trait]
impl CollectionRepository for PgCollectionRepository {
    async fn create(&self, req: CreateCollectionRequest) -> Result<Uuid> {
        let slug = req.validate()?;
        let id = new_v7();

        sqlx::query("INSERT INTO collection (id, name, slug, description) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(req.name.trim())
            .bind(&slug)
            .bind(&req.description)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error("collection", e))?;

        info!(
            subsystem = "db",
            component = "collections",
            op = "create",
            collection_id = %id,
            slug = %slug,
            "Collection created"
        );
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Collection>> {
        let row = sqlx::query("SELECT id, name, slug, description FROM collection WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.as_ref().map(collection_from_row))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Collection>> {
        let row = sqlx::query("SELECT id, name, slug, description FROM collection WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.as_ref().map(collection_from_row))
    }

    async fn list(&self) -> Result<Vec<Collection>> {
        let rows = sqlx::query("SELECT id, name, slug, description FROM collection ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(collection_from_row).collect())
    }

    async fn update(&self, id: Uuid, req: UpdateCollectionRequest) -> Result<()> {
        let slug = req.validate()?;

        let result =
            sqlx::query("UPDATE collection SET name = $1, slug = $2, description = $3 WHERE id = $4")
                .bind(req.name.trim())
                .bind(&slug)
                .bind(&req.description)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| map_write_error("collection", e))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Collection {}", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM collection WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error("collection", e))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Collection {}", id)));
        }
        Ok(())
    }

    async fn list_products(&self, id: Uuid) -> Result<Vec<Product>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM product p
            JOIN product_collection link ON link.product_id = p.id
            WHERE link.collection_id = $1 AND p.is_published
            ORDER BY p.date_created DESC, p.id DESC
            "#,
            PRODUCT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(product_from_row).collect())
    }
}
