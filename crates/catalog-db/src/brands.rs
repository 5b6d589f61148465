//! Brand repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use catalog_core::{
    new_v7, Brand, BrandRepository, CreateBrandRequest, Error, Result, UpdateBrandRequest,
};

use crate::{map_delete_error, map_write_error};

/// PostgreSQL implementation of BrandRepository.
pub struct PgBrandRepository {
    pool: Pool<Postgres>,
}

impl PgBrandRepository {
    /// Create a new PgBrandRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn brand_from_row(r: &PgRow) -> Brand {
    Brand {
        id: r.get("id"),
        name: r.get("name"),
        logo: r.get("logo"),
        website_url: r.get("website_url"),
        description: r.get("description"),
    }
}

#[async_trait]
impl BrandRepository for PgBrandRepository {
    async fn create(&self, req: CreateBrandRequest) -> Result<Uuid> {
        req.validate()?;
        let id = new_v7();

        sqlx::query(
            "INSERT INTO brand (id, name, logo, website_url, description)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(req.name.trim())
        .bind(&req.logo)
        .bind(req.website_url.trim())
        .bind(&req.description)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("brand", e))?;

        info!(
            subsystem = "db",
            component = "brands",
            op = "create",
            brand_id = %id,
            "Brand created"
        );
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Brand>> {
        let row = sqlx::query(
            "SELECT id, name, logo, website_url, description FROM brand WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(brand_from_row))
    }

    async fn list(&self) -> Result<Vec<Brand>> {
        let rows = sqlx::query(
            "SELECT id, name, logo, website_url, description FROM brand ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(brand_from_row).collect())
    }

    async fn update(&self, id: Uuid, req: UpdateBrandRequest) -> Result<()> {
        req.validate()?;

        let result = sqlx::query(
            "UPDATE brand SET name = $1, logo = $2, website_url = $3, description = $4
             WHERE id = $5",
        )
        .bind(req.name.trim())
        .bind(&req.logo)
        .bind(req.website_url.trim())
        .bind(&req.description)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("brand", e))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Brand {}", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM brand WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error("brand", e))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Brand {}", id)));
        }
        info!(
            subsystem = "db",
            component = "brands",
            op = "delete",
            brand_id = %id,
            "Brand deleted"
        );
        Ok(())
    }
}
