//! Category repository
//!
//! Categories order the storefront navigation; `display_order` is
//! maintained by the back-office reorder operation.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use super::DbError;
use crate::models::Slug;

/// Category record from database
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Category with product count for list display
#[derive(Debug, Clone)]
pub struct CategoryWithCount {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub product_count: i64,
}

/// Category repository
pub struct CategoryRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List categories with published-product counts, in display order.
    ///
    /// Uses LEFT JOIN to get counts in a single query (no N+1).
    pub async fn list(&self) -> Result<Vec<CategoryWithCount>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT
                c.id, c.slug, c.name, c.description, c.display_order,
                COUNT(p.id) FILTER (WHERE p.published) AS product_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            GROUP BY c.id
            ORDER BY c.display_order, c.created_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CategoryWithCount {
                id: r.get("id"),
                slug: r.get("slug"),
                name: r.get("name"),
                description: r.get("description"),
                display_order: r.get("display_order"),
                product_count: r.get("product_count"),
            })
            .collect())
    }

    /// Create a category. Duplicate slug surfaces as a database error the
    /// handler maps to a conflict.
    pub async fn create(
        &self,
        slug: Slug,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, DbError> {
        let category: Category = sqlx::query_as(
            r#"
            INSERT INTO categories (slug, name, description, display_order)
            VALUES ($1, $2, $3,
                (SELECT COALESCE(MAX(display_order) + 1, 0) FROM categories))
            RETURNING id, slug, name, description, display_order, created_at
            "#,
        )
        .bind(slug.as_str())
        .bind(name)
        .bind(description)
        .fetch_one(self.pool)
        .await?;

        Ok(category)
    }

    /// Update name/description of a category.
    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, DbError> {
        let category: Option<Category> = sqlx::query_as(
            r#"
            UPDATE categories
            SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, slug, name, description, display_order, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(self.pool)
        .await?;

        category.ok_or_else(|| DbError::NotFound {
            resource: "category",
            id: id.to_string(),
        })
    }

    /// Delete a category. Products keep existing with category unset
    /// (FK is ON DELETE SET NULL).
    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "category",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Reassign display_order from an ordered id list, atomically.
    ///
    /// Ids not present in the list keep their old order value; unknown ids
    /// are ignored (the back-office sends what it currently sees).
    pub async fn reorder(&self, ordered_ids: &[Uuid]) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        for (position, id) in ordered_ids.iter().enumerate() {
            sqlx::query("UPDATE categories SET display_order = $2 WHERE id = $1")
                .bind(id)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // Integration tests - run with DATABASE_URL set
    // cargo test -p vitrine-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn reorder_is_atomic() {
        // A failed update mid-list must leave every display_order untouched
    }
}
