//! Attribute type repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use catalog_core::{
    new_v7, Attribute, AttributeRepository, CreateAttributeRequest, Error, Result,
};

use crate::{map_delete_error, map_write_error};

/// PostgreSQL implementation of AttributeRepository.
pub struct PgAttributeRepository {
    pool: Pool<Postgres>,
}

impl PgAttributeRepository {
    /// Create a new PgAttributeRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttributeRepository for PgAttributeRepository {
    async fn create(&self, req: CreateAttributeRequest) -> Result<Uuid> {
        req.validate()?;
        let id = new_v7();

        sqlx::query("INSERT INTO attribute (id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(req.name.trim())
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error("attribute", e))?;

        info!(
            subsystem = "db",
            component = "attributes",
            op = "create",
            attribute_id = %id,
            "Attribute created"
        );
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Attribute>> {
        let row = sqlx::query("SELECT id, name FROM attribute WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|r| Attribute {
            id: r.get("id"),
            name: r.get("name"),
        }))
    }

    async fn list(&self) -> Result<Vec<Attribute>> {
        let rows = sqlx::query("SELECT id, name FROM attribute ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Attribute {
                id: r.get("id"),
                name: r.get("name"),
            })
            .collect())
    }

    async fn rename(&self, id: Uuid, name: &str) -> Result<()> {
        CreateAttributeRequest {
            name: name.to_string(),
        }
        .validate()?;

        let result = sqlx::query("UPDATE attribute SET name = $1 WHERE id = $2")
            .bind(name.trim())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error("attribute", e))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Attribute {}", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        // Values cascade.
        let result = sqlx::query("DELETE FROM attribute WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error("attribute", e))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Attribute {}", id)));
        }
        Ok(())
    }
}
