//! Content page repository
//!
//! Footer pages (terms, refund policy) live as rows so the back-office can
//! edit them; migrations seed the two the storefront links to.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::Slug;

/// Content page record
#[derive(Debug, Clone, FromRow)]
pub struct Page {
    pub slug: String,
    pub title: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

/// Page repository
pub struct PageRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PageRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a page by slug.
    pub async fn get(&self, slug: &str) -> Result<Page, DbError> {
        let page: Option<Page> = sqlx::query_as(
            "SELECT slug, title, body, updated_at FROM pages WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        page.ok_or_else(|| DbError::NotFound {
            resource: "page",
            id: slug.to_owned(),
        })
    }

    /// List all pages (back-office index).
    pub async fn list(&self) -> Result<Vec<Page>, DbError> {
        let pages: Vec<Page> =
            sqlx::query_as("SELECT slug, title, body, updated_at FROM pages ORDER BY slug")
                .fetch_all(self.pool)
                .await?;

        Ok(pages)
    }

    /// Create or replace a page.
    pub async fn upsert(&self, slug: Slug, title: &str, body: &str) -> Result<Page, DbError> {
        let page: Page = sqlx::query_as(
            r#"
            INSERT INTO pages (slug, title, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO UPDATE
            SET title = EXCLUDED.title,
                body = EXCLUDED.body,
                updated_at = NOW()
            RETURNING slug, title, body, updated_at
            "#,
        )
        .bind(slug.as_str())
        .bind(title)
        .bind(body)
        .fetch_one(self.pool)
        .await?;

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    #[tokio::test]
    #[ignore = "requires database"]
    async fn upsert_replaces_body() {
        // Upserting an existing slug must update title/body in place
    }
}
