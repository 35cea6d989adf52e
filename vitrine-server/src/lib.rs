//! vitrine-server: storefront HTTP API
//!
//! Public catalog, checkout and order endpoints plus the administrative
//! back-office (catalog CRUD, review moderation, content pages), backed by
//! Postgres through sqlx and two outbound JSON clients (payment gateway,
//! transactional email).

pub mod clients;
pub mod db;
pub mod http;
pub mod models;

pub use http::server::{run_server, AppState, ServerConfig};
