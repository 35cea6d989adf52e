//! Order repository
//!
//! Orders snapshot product name and price at checkout time, so later
//! catalog edits and deletions never change what a customer bought.
//! `download_token` doubles as the paid marker: the status endpoint derives
//! its boolean from the token's presence.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use super::DbError;
use crate::models::{Paginated, Pagination};

/// Order record from database
#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub email: String,
    pub payment_status: String,
    pub payment_ref: Option<String>,
    pub download_token: Option<String>,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order line item (snapshot taken at checkout)
#[derive(Debug, Clone, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub quantity: i32,
}

/// Result of the status polling lookup
#[derive(Debug, Clone, Copy)]
pub struct OrderStatus {
    pub id: Uuid,
    pub paid: bool,
}

/// Snapshot passed in at order creation
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub quantity: i32,
}

/// Fulfilment line: receipt snapshot plus the live product's download URL.
/// The URL is NULL when the product has since been deleted.
#[derive(Debug, Clone, FromRow)]
pub struct Deliverable {
    pub product_name: String,
    pub quantity: i32,
    pub download_url: Option<String>,
}

/// Order repository
pub struct OrderRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order with its line items atomically.
    pub async fn create(
        &self,
        email: &str,
        lines: &[OrderLine],
        total_cents: i64,
    ) -> Result<Order, DbError> {
        let mut tx = self.pool.begin().await?;

        let order: Order = sqlx::query_as(
            r#"
            INSERT INTO orders (email, total_cents)
            VALUES ($1, $2)
            RETURNING id, email, payment_status, payment_ref, download_token,
                      total_cents, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(total_cents)
        .fetch_one(&mut *tx)
        .await?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO order_items
                    (order_id, product_id, product_name, unit_price_cents, quantity)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.unit_price_cents)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order)
    }

    /// Store the gateway session id after checkout session creation.
    pub async fn set_payment_ref(&self, id: Uuid, payment_ref: &str) -> Result<(), DbError> {
        let result = sqlx::query(
            "UPDATE orders SET payment_ref = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(payment_ref)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "order",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Get a single order by id.
    pub async fn get(&self, id: Uuid) -> Result<Order, DbError> {
        let order: Option<Order> = sqlx::query_as(
            r#"
            SELECT id, email, payment_status, payment_ref, download_token,
                   total_cents, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        order.ok_or_else(|| DbError::NotFound {
            resource: "order",
            id: id.to_string(),
        })
    }

    /// Single keyed lookup backing the status polling endpoint.
    ///
    /// `paid` is the presence of the download token, nothing more.
    pub async fn status(&self, id: Uuid) -> Result<OrderStatus, DbError> {
        let row = sqlx::query(
            "SELECT id, download_token IS NOT NULL AS paid FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "order",
            id: id.to_string(),
        })?;

        Ok(OrderStatus {
            id: row.get("id"),
            paid: row.get("paid"),
        })
    }

    /// Mark an order completed and issue its download token.
    ///
    /// COALESCE keeps the first token ever written: confirming twice never
    /// rotates the link already emailed to the customer.
    pub async fn mark_completed(&self, id: Uuid, token: &str) -> Result<Order, DbError> {
        let order: Option<Order> = sqlx::query_as(
            r#"
            UPDATE orders
            SET payment_status = 'completed',
                download_token = COALESCE(download_token, $2),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, payment_status, payment_ref, download_token,
                      total_cents, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        order.ok_or_else(|| DbError::NotFound {
            resource: "order",
            id: id.to_string(),
        })
    }

    /// Mark an order failed (gateway reported the session expired).
    pub async fn mark_failed(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET payment_status = 'failed', updated_at = NOW()
            WHERE id = $1 AND payment_status = 'pending'
            "#,
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        // Completed orders are never demoted; treat as a no-op
        let _ = result.rows_affected();
        Ok(())
    }

    /// Delete an order. Ownership and payment-status checks happen in the
    /// handler so it can answer 403/409 distinctly; this is the plain row
    /// removal (items cascade).
    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "order",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Fetch the line items of an order.
    pub async fn items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, DbError> {
        let items: Vec<OrderItem> = sqlx::query_as(
            r#"
            SELECT id, order_id, product_id, product_name, unit_price_cents, quantity
            FROM order_items
            WHERE order_id = $1
            ORDER BY product_name
            "#,
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Fulfilment lines for a completed order, download URLs resolved
    /// against the live catalog in one JOIN.
    pub async fn deliverables(&self, order_id: Uuid) -> Result<Vec<Deliverable>, DbError> {
        let items: Vec<Deliverable> = sqlx::query_as(
            r#"
            SELECT oi.product_name, oi.quantity, p.download_url
            FROM order_items oi
            LEFT JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.product_name
            "#,
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Resolve a download token to its completed order.
    pub async fn find_by_download_token(&self, token: &str) -> Result<Order, DbError> {
        let order: Option<Order> = sqlx::query_as(
            r#"
            SELECT id, email, payment_status, payment_ref, download_token,
                   total_cents, created_at, updated_at
            FROM orders
            WHERE download_token = $1 AND payment_status = 'completed'
            "#,
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        order.ok_or_else(|| DbError::NotFound {
            resource: "download",
            id: token.to_owned(),
        })
    }

    /// List orders for the back-office, newest first, optionally filtered
    /// by payment status.
    pub async fn list(
        &self,
        payment_status: Option<&str>,
        page: Pagination,
    ) -> Result<Paginated<Order>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, payment_status, payment_ref, download_token,
                   total_cents, created_at, updated_at,
                   COUNT(*) OVER() AS total
            FROM orders
            WHERE ($1::text IS NULL OR payment_status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(payment_status)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        let total = rows.first().map(|r| r.get::<i64, _>("total")).unwrap_or(0);
        let items = rows
            .into_iter()
            .map(|r| Order {
                id: r.get("id"),
                email: r.get("email"),
                payment_status: r.get("payment_status"),
                payment_ref: r.get("payment_ref"),
                download_token: r.get("download_token"),
                total_cents: r.get("total_cents"),
                created_at: r.get("created_at"),
                updated_at: r.get("updated_at"),
            })
            .collect();

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }
}

#[cfg(test)]
mod tests {
    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_order_transaction_rollback() {
        // If a line-item insert fails, the order row must not exist
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn mark_completed_keeps_first_token() {
        // Two confirmations must leave download_token at its first value
    }
}
