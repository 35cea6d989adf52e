//! Service repository
//!
//! Services are the consulting/customisation offerings sold next to the
//! digital products. Same publish/ordering model, no fulfilment asset.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;
use crate::models::Slug;

/// Service record from database
#[derive(Debug, Clone, FromRow)]
pub struct Service {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub published: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Service repository
pub struct ServiceRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ServiceRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List published services in display order.
    pub async fn list_published(&self) -> Result<Vec<Service>, DbError> {
        let services: Vec<Service> = sqlx::query_as(
            r#"
            SELECT id, slug, name, description, price_cents, published,
                   display_order, created_at, updated_at
            FROM services
            WHERE published
            ORDER BY display_order, created_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(services)
    }

    /// List every service for the back-office.
    pub async fn list_all(&self) -> Result<Vec<Service>, DbError> {
        let services: Vec<Service> = sqlx::query_as(
            r#"
            SELECT id, slug, name, description, price_cents, published,
                   display_order, created_at, updated_at
            FROM services
            ORDER BY display_order, created_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(services)
    }

    /// Create a service.
    pub async fn create(
        &self,
        slug: Slug,
        name: &str,
        description: &str,
        price_cents: i64,
        published: bool,
    ) -> Result<Service, DbError> {
        let service: Service = sqlx::query_as(
            r#"
            INSERT INTO services (slug, name, description, price_cents, published, display_order)
            VALUES ($1, $2, $3, $4, $5,
                (SELECT COALESCE(MAX(display_order) + 1, 0) FROM services))
            RETURNING id, slug, name, description, price_cents, published,
                      display_order, created_at, updated_at
            "#,
        )
        .bind(slug.as_str())
        .bind(name)
        .bind(description)
        .bind(price_cents)
        .bind(published)
        .fetch_one(self.pool)
        .await?;

        Ok(service)
    }

    /// Update a service's editable fields.
    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        description: &str,
        price_cents: i64,
        published: bool,
    ) -> Result<Service, DbError> {
        let service: Option<Service> = sqlx::query_as(
            r#"
            UPDATE services
            SET name = $2, description = $3, price_cents = $4,
                published = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, slug, name, description, price_cents, published,
                      display_order, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(price_cents)
        .bind(published)
        .fetch_optional(self.pool)
        .await?;

        service.ok_or_else(|| DbError::NotFound {
            resource: "service",
            id: id.to_string(),
        })
    }

    /// Delete a service.
    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "service",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
