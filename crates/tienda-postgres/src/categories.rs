//! # Category Store

use sqlx::PgPool;

use tienda_core::CategoryId;
use tienda_domain::Category;

use crate::error::{StoreError, StoreResult};

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id_key: i64,
    name: String,
    description: Option<String>,
}

impl CategoryRow {
    fn into_category(self) -> Category {
        Category {
            id: CategoryId::new(self.id_key),
            name: self.name,
            description: self.description,
        }
    }
}

/// Store for product categories.
#[derive(Clone)]
pub struct CategoryStore {
    pool: PgPool,
}

impl CategoryStore {
    /// Wrap a pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// `Conflict` on a duplicate name.
    pub async fn create(&self, name: &str, description: Option<&str>) -> StoreResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (name, description) VALUES ($1, $2)
             RETURNING id_key, name, description",
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(row.into_category())
    }

    /// Fetch a category by key.
    pub async fn get(&self, id: CategoryId) -> StoreResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id_key, name, description FROM categories WHERE id_key = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::RowNotFound {
            entity: "category",
            key: id.as_i64(),
        })?;
        Ok(row.into_category())
    }

    /// List categories by name.
    pub async fn list(&self, skip: i64, limit: i64) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id_key, name, description FROM categories
             ORDER BY name OFFSET $1 LIMIT $2",
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(rows.into_iter().map(CategoryRow::into_category).collect())
    }

    /// Rename or re-describe a category.
    pub async fn update(
        &self,
        id: CategoryId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> StoreResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "UPDATE categories
             SET name = COALESCE($2, name), description = COALESCE($3, description)
             WHERE id_key = $1
             RETURNING id_key, name, description",
        )
        .bind(id.as_i64())
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::RowNotFound {
            entity: "category",
            key: id.as_i64(),
        })?;
        Ok(row.into_category())
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// `ForeignKey` while products still reference it.
    pub async fn delete(&self, id: CategoryId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id_key = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound {
                entity: "category",
                key: id.as_i64(),
            });
        }
        Ok(())
    }
}
