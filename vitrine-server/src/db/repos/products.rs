//! Product repository
//!
//! The public storefront only ever sees published rows; the back-office
//! operates on everything. Checkout reads prices from here - client-supplied
//! prices are never trusted.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use super::DbError;
use crate::models::{Paginated, Pagination, Slug};

/// Maximum hits returned by search-as-you-type
const SEARCH_LIMIT: i64 = 10;

/// Product record from database
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub category_id: Option<Uuid>,
    pub download_url: Option<String>,
    pub featured: bool,
    pub published: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact search hit for search-as-you-type
#[derive(Debug, Clone, FromRow)]
pub struct ProductHit {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub price_cents: i64,
}

/// Fields accepted when creating or updating a product
#[derive(Debug, Clone)]
pub struct ProductInput<'i> {
    pub name: &'i str,
    pub description: &'i str,
    pub price_cents: i64,
    pub category_id: Option<Uuid>,
    pub download_url: Option<&'i str>,
    pub featured: bool,
    pub published: bool,
}

/// Product repository
pub struct ProductRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List published products, optionally filtered by category slug and
    /// featured flag, in display order.
    pub async fn list_published(
        &self,
        category_slug: Option<&str>,
        featured: Option<bool>,
        page: Pagination,
    ) -> Result<Paginated<Product>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT
                p.id, p.slug, p.name, p.description, p.price_cents,
                p.category_id, p.download_url, p.featured, p.published,
                p.display_order, p.created_at, p.updated_at,
                COUNT(*) OVER() AS total
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.published
              AND ($1::text IS NULL OR c.slug = $1)
              AND ($2::boolean IS NULL OR p.featured = $2)
            ORDER BY p.display_order, p.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(category_slug)
        .bind(featured)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        let total = rows.first().map(|r| r.get::<i64, _>("total")).unwrap_or(0);
        let items = rows.into_iter().map(|r| row_to_product(&r)).collect();

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Get a published product by slug (storefront detail page).
    pub async fn get_published_by_slug(&self, slug: &str) -> Result<Product, DbError> {
        let product: Option<Product> = sqlx::query_as(
            r#"
            SELECT id, slug, name, description, price_cents, category_id,
                   download_url, featured, published, display_order,
                   created_at, updated_at
            FROM products
            WHERE slug = $1 AND published
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        product.ok_or_else(|| DbError::NotFound {
            resource: "product",
            id: slug.to_owned(),
        })
    }

    /// Case-insensitive substring search over published products.
    ///
    /// Backs the search-as-you-type endpoint, so the limit is small and
    /// fixed and there is no pagination envelope.
    pub async fn search(&self, query: &str) -> Result<Vec<ProductHit>, DbError> {
        let pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));

        let hits: Vec<ProductHit> = sqlx::query_as(
            r#"
            SELECT id, slug, name, price_cents
            FROM products
            WHERE published
              AND (name ILIKE $1 OR description ILIKE $1)
            ORDER BY featured DESC, display_order
            LIMIT $2
            "#,
        )
        .bind(&pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(hits)
    }

    /// Fetch published products by id for checkout pricing.
    ///
    /// Returns only the rows that exist and are published; the caller
    /// compares against the requested ids to reject unknown products.
    pub async fn fetch_for_checkout(&self, ids: &[Uuid]) -> Result<Vec<Product>, DbError> {
        let products: Vec<Product> = sqlx::query_as(
            r#"
            SELECT id, slug, name, description, price_cents, category_id,
                   download_url, featured, published, display_order,
                   created_at, updated_at
            FROM products
            WHERE id = ANY($1) AND published
            "#,
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// List all products for the back-office, unpublished included.
    pub async fn list_all(&self, page: Pagination) -> Result<Paginated<Product>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, slug, name, description, price_cents, category_id,
                   download_url, featured, published, display_order,
                   created_at, updated_at,
                   COUNT(*) OVER() AS total
            FROM products
            ORDER BY display_order, created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        let total = rows.first().map(|r| r.get::<i64, _>("total")).unwrap_or(0);
        let items = rows.into_iter().map(|r| row_to_product(&r)).collect();

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Create a product.
    pub async fn create(&self, slug: Slug, input: ProductInput<'_>) -> Result<Product, DbError> {
        let product: Product = sqlx::query_as(
            r#"
            INSERT INTO products
                (slug, name, description, price_cents, category_id,
                 download_url, featured, published, display_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                (SELECT COALESCE(MAX(display_order) + 1, 0) FROM products))
            RETURNING id, slug, name, description, price_cents, category_id,
                      download_url, featured, published, display_order,
                      created_at, updated_at
            "#,
        )
        .bind(slug.as_str())
        .bind(input.name)
        .bind(input.description)
        .bind(input.price_cents)
        .bind(input.category_id)
        .bind(input.download_url)
        .bind(input.featured)
        .bind(input.published)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Update a product's editable fields.
    pub async fn update(&self, id: Uuid, input: ProductInput<'_>) -> Result<Product, DbError> {
        let product: Option<Product> = sqlx::query_as(
            r#"
            UPDATE products
            SET name = $2, description = $3, price_cents = $4,
                category_id = $5, download_url = $6, featured = $7,
                published = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING id, slug, name, description, price_cents, category_id,
                      download_url, featured, published, display_order,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.name)
        .bind(input.description)
        .bind(input.price_cents)
        .bind(input.category_id)
        .bind(input.download_url)
        .bind(input.featured)
        .bind(input.published)
        .fetch_optional(self.pool)
        .await?;

        product.ok_or_else(|| DbError::NotFound {
            resource: "product",
            id: id.to_string(),
        })
    }

    /// Delete a product. Bundle memberships and reviews cascade; order
    /// items keep their snapshot with product_id unset.
    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "product",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Reassign display_order from an ordered id list, atomically.
    pub async fn reorder(&self, ordered_ids: &[Uuid]) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        for (position, id) in ordered_ids.iter().enumerate() {
            sqlx::query("UPDATE products SET display_order = $2 WHERE id = $1")
                .bind(id)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

fn row_to_product(r: &sqlx::postgres::PgRow) -> Product {
    Product {
        id: r.get("id"),
        slug: r.get("slug"),
        name: r.get("name"),
        description: r.get("description"),
        price_cents: r.get("price_cents"),
        category_id: r.get("category_id"),
        download_url: r.get("download_url"),
        featured: r.get("featured"),
        published: r.get("published"),
        display_order: r.get("display_order"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    #[tokio::test]
    #[ignore = "requires database"]
    async fn unpublished_products_hidden_from_storefront() {
        // list_published / get_published_by_slug / search must never
        // return rows with published = false
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn search_escapes_like_metacharacters() {
        // A query of "100%" must not match every row
    }
}
