//! vitrine-core: shared plumbing for the Vitrine storefront
//!
//! Holds the pieces every member crate needs: environment-driven
//! configuration, the config error type, opaque token generation, and
//! money formatting for receipts.

pub mod config;
pub mod error;
pub mod money;
pub mod token;

pub use config::{AppConfig, EmailConfig, PaymentConfig};
pub use error::ConfigError;
