//! Category repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Pool, Postgres, Row};
use tracing::{debug, info, warn};
use uuid::Uuid;

use catalog_core::{
    breadcrumb, new_v7, would_create_cycle, Breadcrumb, Category, CategoryDetail,
    CategoryRepository, CategoryTree, CreateCategoryRequest, Error, ProductRepository, Result,
    UpdateCategoryRequest, MAX_CATEGORY_DEPTH,
};

use crate::products::PgProductRepository;
use crate::{map_delete_error, map_write_error};

/// PostgreSQL implementation of CategoryRepository.
pub struct PgCategoryRepository {
    pool: Pool<Postgres>,
}

impl PgCategoryRepository {
    /// Create a new PgCategoryRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn category_from_row(r: &PgRow) -> Category {
    Category {
        id: r.get("id"),
        name: r.get("name"),
        slug: r.get("slug"),
        description: r.get("description"),
        parent_id: r.get("parent_id"),
    }
}

/// Advisory lock key serializing parent changes across the whole tree.
///
/// Held until commit, so a concurrent re-parenting reads the committed chain.
const CATEGORY_TREE_LOCK: i64 = 0x6361_7465_676f_7279;

/// Load `id` and its ancestors into an arena.
///
/// The recursive CTE stops after `MAX_CATEGORY_DEPTH + 1` levels, so a cyclic
/// chain yields a finite row set and the in-memory walk reports the cycle.
pub(crate) async fn load_ancestors<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<CategoryTree> {
    let rows = sqlx::query(
        r#"
        WITH RECURSIVE chain AS (
            SELECT id, name, slug, description, parent_id, 1 AS depth
            FROM category
            WHERE id = $1
            UNION ALL
            SELECT c.id, c.name, c.slug, c.description, c.parent_id, chain.depth + 1
            FROM category c
            JOIN chain ON c.id = chain.parent_id
            WHERE chain.depth <= $2
        )
        SELECT id, name, slug, description, parent_id FROM chain
        "#,
    )
    .bind(id)
    .bind(MAX_CATEGORY_DEPTH as i32)
    .fetch_all(executor)
    .await
    .map_err(Error::Database)?;

    Ok(CategoryTree::from_categories(
        rows.iter().map(category_from_row),
    ))
}

/// Breadcrumb for a category, resolved through the database.
pub(crate) async fn fetch_breadcrumb(pool: &Pool<Postgres>, id: Uuid) -> Result<Breadcrumb> {
    let tree = load_ancestors(pool, id).await?;
    let path = breadcrumb(&tree, id)?;
    debug!(
        subsystem = "db",
        component = "categories",
        op = "breadcrumb",
        category_id = %id,
        depth = path.depth(),
        "Resolved category breadcrumb"
    );
    Ok(path)
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, req: CreateCategoryRequest) -> Result<Uuid> {
        let slug = req.validate()?;
        let id = new_v7();

        sqlx::query(
            "INSERT INTO category (id, name, slug, description, parent_id)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(req.name.trim())
        .bind(&slug)
        .bind(&req.description)
        .bind(req.parent_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("category", e))?;

        info!(
            subsystem = "db",
            component = "categories",
            op = "create",
            category_id = %id,
            slug = %slug,
            "Category created"
        );
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, name, slug, description, parent_id FROM category WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(category_from_row))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, name, slug, description, parent_id FROM category WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(category_from_row))
    }

    async fn list_roots(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, slug, description, parent_id
            FROM category
            WHERE parent_id IS NULL
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(category_from_row).collect())
    }

    async fn list_children(&self, parent_id: Uuid) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, slug, description, parent_id
            FROM category
            WHERE parent_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(category_from_row).collect())
    }

    async fn list_all(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT id, name, slug, description, parent_id FROM category ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(category_from_row).collect())
    }

    async fn update(&self, id: Uuid, req: UpdateCategoryRequest) -> Result<()> {
        let slug = req.validate()?;
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        if let Some(parent_id) = req.parent_id {
            sqlx::query("SELECT pg_advisory_xact_lock($1)")
                .bind(CATEGORY_TREE_LOCK)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;

            let ancestors = load_ancestors(&mut *tx, parent_id).await?;
            if ancestors.is_empty() {
                return Err(Error::InvalidInput(format!(
                    "parent category {} does not exist",
                    parent_id
                )));
            }
            if would_create_cycle(&ancestors, id, Some(parent_id))? {
                warn!(
                    subsystem = "db",
                    component = "categories",
                    op = "update",
                    category_id = %id,
                    parent_id = %parent_id,
                    "Rejected re-parenting that would create a cycle"
                );
                return Err(Error::CycleDetected {
                    id,
                    depth: ancestors.len(),
                });
            }
        }

        let result = sqlx::query(
            "UPDATE category SET name = $1, slug = $2, description = $3, parent_id = $4
             WHERE id = $5",
        )
        .bind(req.name.trim())
        .bind(&slug)
        .bind(&req.description)
        .bind(req.parent_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error("category", e))?;

        if result.rows_affected() == 0 {
            return Err(Error::CategoryNotFound(id));
        }

        tx.commit().await.map_err(Error::Database)?;
        info!(
            subsystem = "db",
            component = "categories",
            op = "update",
            category_id = %id,
            "Category updated"
        );
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        // Children are detached by ON DELETE SET NULL; products restrict.
        let result = sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_delete_error("category", e))?;

        if result.rows_affected() == 0 {
            return Err(Error::CategoryNotFound(id));
        }
        info!(
            subsystem = "db",
            component = "categories",
            op = "delete",
            category_id = %id,
            "Category deleted"
        );
        Ok(())
    }

    async fn breadcrumb(&self, id: Uuid) -> Result<Breadcrumb> {
        fetch_breadcrumb(&self.pool, id).await
    }

    async fn detail_by_slug(&self, slug: &str) -> Result<Option<CategoryDetail>> {
        let Some(category) = self.get_by_slug(slug).await? else {
            return Ok(None);
        };
        let breadcrumb = fetch_breadcrumb(&self.pool, category.id).await?;
        let children = self.list_children(category.id).await?;
        let products = PgProductRepository::new(self.pool.clone())
            .list_by_category(category.id)
            .await?;

        Ok(Some(CategoryDetail {
            category,
            breadcrumb,
            children,
            products,
        }))
    }
}
