//! Product attribute value repository implementation.
//!
//! A value ("Color - Red") belongs to one attribute type and is shared by any
//! number of products.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use catalog_core::{
    new_v7, CreateProductAttributeRequest, Error, ProductAttribute, ProductAttributeRepository,
    Result,
};

use crate::{map_delete_error, map_write_error};

const VALUE_COLUMNS: &str = r#"
    pa.id, pa.attribute_id, a.name AS attribute_name, pa.value,
    ARRAY(
        SELECT link.product_id FROM product_attribute_product link
        WHERE link.product_attribute_id = pa.id
        ORDER BY link.product_id
    ) AS product_ids
"#;

/// PostgreSQL implementation of ProductAttributeRepository.
pub struct PgProductAttributeRepository {
    pool: Pool<Postgres>,
}

impl PgProductAttributeRepository {
    /// Create a new PgProductAttributeRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn value_from_row(r: &PgRow) -> ProductAttribute {
    ProductAttribute {
        id: r.get("id"),
        attribute_id: r.get("attribute_id"),
        attribute_name: r.get("attribute_name"),
        value: r.get("value"),
        product_ids: r.get("product_ids"),
    }
}

#[async_trait]
impl ProductAttributeRepository for PgProductAttributeRepository {
    async fn create(&self, req: CreateProductAttributeRequest) -> Result<Uuid> {
        req.validate()?;
        let id = new_v7();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query("INSERT INTO product_attribute (id, attribute_id, value) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(req.attribute_id)
            .bind(req.value.trim())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error("product attribute", e))?;

        if !req.product_ids.is_empty() {
            sqlx::query(
                "INSERT INTO product_attribute_product (product_attribute_id, product_id)
                 SELECT $1, p FROM UNNEST($2::uuid[]) AS p
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(&req.product_ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error("product attribute", e))?;
        }

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "product_attributes",
            op = "create",
            product_attribute_id = %id,
            result_count = req.product_ids.len(),
            "Product attribute value created"
        );
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ProductAttribute>> {
        let sql = format!(
            "SELECT {} FROM product_attribute pa JOIN attribute a ON a.id = pa.attribute_id
             WHERE pa.id = $1",
            VALUE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.as_ref().map(value_from_row))
    }

    async fn list(&self) -> Result<Vec<ProductAttribute>> {
        let sql = format!(
            "SELECT {} FROM product_attribute pa JOIN attribute a ON a.id = pa.attribute_id
             ORDER BY a.name, pa.value, pa.id",
            VALUE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(value_from_row).collect())
    }

    async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<ProductAttribute>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM product_attribute pa
            JOIN attribute a ON a.id = pa.attribute_id
            JOIN product_attribute_product owner ON owner.product_attribute_id = pa.id
            WHERE owner.product_id = $1
            ORDER BY a.name, pa.value, pa.id
            "#,
            VALUE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(value_from_row).collect())
    }

    async fn link_product(&self, id: Uuid, product_id: Uuid) -> Result<()> {
        sqlx::query(
            "INSERT INTO product_attribute_product (product_attribute_id, product_id)
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(product_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("product attribute link", e))?;
        Ok(())
    }

    async fn unlink_product(&self, id: Uuid, product_id: Uuid) -> Result<()> {
        sqlx::query(
            "DELETE FROM product_attribute_product
             WHERE product_attribute_id = $1 AND product_id = $2",
        )
        .bind(id)
        .bind(product_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM product_attribute WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error("product attribute", e))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Product attribute {}", id)));
        }
        Ok(())
    }
}
