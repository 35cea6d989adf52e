//! Newsletter subscriber repository
//!
//! Subscription is idempotent at the database level (unique email +
//! ON CONFLICT), so there is never a duplicate row to clean up.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};

use super::DbError;
use crate::models::{EmailAddress, Paginated, Pagination};

/// Subscriber record from database
#[derive(Debug, Clone, FromRow)]
pub struct Subscriber {
    pub id: uuid::Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

/// What happened on a subscribe call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// Fresh subscription
    Subscribed,
    /// Email was already on the active list
    AlreadySubscribed,
    /// Email had unsubscribed before and is active again
    Resubscribed,
}

/// Newsletter repository
pub struct NewsletterRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> NewsletterRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Subscribe an email.
    ///
    /// INSERT .. ON CONFLICT DO NOTHING, then disambiguate: zero rows
    /// affected means the email already exists - either active (report
    /// "already subscribed") or unsubscribed (reactivate).
    pub async fn subscribe(&self, email: &EmailAddress) -> Result<SubscribeOutcome, DbError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO newsletter_subscribers (email)
            VALUES ($1)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(email.as_str())
        .execute(self.pool)
        .await?;

        if inserted.rows_affected() == 1 {
            return Ok(SubscribeOutcome::Subscribed);
        }

        let reactivated = sqlx::query(
            r#"
            UPDATE newsletter_subscribers
            SET unsubscribed_at = NULL
            WHERE email = $1 AND unsubscribed_at IS NOT NULL
            "#,
        )
        .bind(email.as_str())
        .execute(self.pool)
        .await?;

        if reactivated.rows_affected() == 1 {
            Ok(SubscribeOutcome::Resubscribed)
        } else {
            Ok(SubscribeOutcome::AlreadySubscribed)
        }
    }

    /// Unsubscribe an email (idempotent; unknown emails are a no-op).
    pub async fn unsubscribe(&self, email: &EmailAddress) -> Result<(), DbError> {
        sqlx::query(
            r#"
            UPDATE newsletter_subscribers
            SET unsubscribed_at = NOW()
            WHERE email = $1 AND unsubscribed_at IS NULL
            "#,
        )
        .bind(email.as_str())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// List active subscribers for the back-office.
    pub async fn list_active(&self, page: Pagination) -> Result<Paginated<Subscriber>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, created_at, unsubscribed_at,
                   COUNT(*) OVER() AS total
            FROM newsletter_subscribers
            WHERE unsubscribed_at IS NULL
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        let total = rows.first().map(|r| r.get::<i64, _>("total")).unwrap_or(0);
        let items = rows
            .into_iter()
            .map(|r| Subscriber {
                id: r.get("id"),
                email: r.get("email"),
                created_at: r.get("created_at"),
                unsubscribed_at: r.get("unsubscribed_at"),
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
    async fn duplicate_subscribe_reports_already_subscribed() {
        // Second subscribe of the same email must return AlreadySubscribed
        // and the table must hold exactly one row for it
    }
}
