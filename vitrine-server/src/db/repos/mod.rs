//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Borrows the pool, one struct per entity
//! - Handles conflicts via ON CONFLICT (no check-then-insert)
//! - Uses transactions for multi-row writes (orders, reorders)
//! - Uses COUNT(*) OVER() for pagination totals (no second query)

pub mod bundles;
pub mod categories;
pub mod newsletter;
pub mod orders;
pub mod pages;
pub mod products;
pub mod reviews;
pub mod services;
pub mod users;

pub use bundles::{Bundle, BundleProduct, BundleRepo, BundleWithItems};
pub use categories::{Category, CategoryRepo, CategoryWithCount};
pub use newsletter::{NewsletterRepo, SubscribeOutcome, Subscriber};
pub use orders::{Deliverable, Order, OrderItem, OrderLine, OrderRepo, OrderStatus};
pub use pages::{Page, PageRepo};
pub use products::{Product, ProductHit, ProductInput, ProductRepo};
pub use reviews::{Review, ReviewRepo, ReviewSummary};
pub use services::{Service, ServiceRepo};
pub use users::{Session, User, UserRepo};

/// Database error type shared by all repositories
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}
