//! Centralized configuration for the Vitrine storefront.
//!
//! Everything is driven by environment variables (load a `.env` first via
//! `dotenvy` if you have one). Required variables fail hard at startup with
//! an actionable error rather than surfacing mid-request.

use std::env;
use std::net::SocketAddr;

use crate::error::ConfigError;

/// Default bind address when `VITRINE_BIND` is unset
const DEFAULT_BIND: &str = "127.0.0.1:3030";

/// Default public base URL (storefront frontend) when unset
const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";

/// Default payment gateway API base
const DEFAULT_PAYMENT_API_URL: &str = "https://api.paygate.dev/v1";

/// Default transactional email API base
const DEFAULT_EMAIL_API_URL: &str = "https://api.postal.dev/v1";

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string
    pub database_url: String,
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// Public base URL used in checkout redirects and email links
    pub public_url: String,
    /// Email elevated to admin at first login
    pub admin_email: String,
    /// Allow any CORS origin (development only)
    pub cors_permissive: bool,
    pub payments: PaymentConfig,
    pub email: EmailConfig,
}

/// Payment gateway credentials
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub api_url: String,
    pub secret_key: String,
}

/// Transactional email credentials
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Required: `DATABASE_URL`, `VITRINE_ADMIN_EMAIL`,
    /// `PAYMENT_SECRET_KEY`, `EMAIL_API_KEY`, `EMAIL_FROM`.
    /// Everything else has a development default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = optional("VITRINE_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("VITRINE_BIND", e.to_string()))?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bind_addr,
            public_url: trim_trailing_slash(
                optional("VITRINE_PUBLIC_URL").unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string()),
            ),
            admin_email: required("VITRINE_ADMIN_EMAIL")?.to_lowercase(),
            cors_permissive: parse_bool("VITRINE_CORS_PERMISSIVE")?,
            payments: PaymentConfig {
                api_url: trim_trailing_slash(
                    optional("PAYMENT_API_URL")
                        .unwrap_or_else(|| DEFAULT_PAYMENT_API_URL.to_string()),
                ),
                secret_key: required("PAYMENT_SECRET_KEY")?,
            },
            email: EmailConfig {
                api_url: trim_trailing_slash(
                    optional("EMAIL_API_URL").unwrap_or_else(|| DEFAULT_EMAIL_API_URL.to_string()),
                ),
                api_key: required("EMAIL_API_KEY")?,
                from_address: required("EMAIL_FROM")?,
            },
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::missing(name)),
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(name: &'static str) -> Result<bool, ConfigError> {
    match optional(name).as_deref() {
        None => Ok(false),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") => Ok(false),
        Some(other) => Err(ConfigError::invalid(
            name,
            format!("expected true/false, got '{other}'"),
        )),
    }
}

fn trim_trailing_slash(mut s: String) -> String {
    while s.ends_with('/') {
        s.pop();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slashes() {
        assert_eq!(
            trim_trailing_slash("https://shop.example/".into()),
            "https://shop.example"
        );
        assert_eq!(
            trim_trailing_slash("https://shop.example".into()),
            "https://shop.example"
        );
        assert_eq!(trim_trailing_slash("a//".into()), "a");
    }

    // Env-var tests mutate process state; keep them in one test so they
    // can't race each other under the parallel test runner.
    #[test]
    fn env_parsing() {
        env::set_var("DATABASE_URL", "postgres://localhost/vitrine");
        env::set_var("VITRINE_ADMIN_EMAIL", "Owner@Shop.Example");
        env::set_var("PAYMENT_SECRET_KEY", "sk_test_123");
        env::set_var("EMAIL_API_KEY", "em_test_123");
        env::set_var("EMAIL_FROM", "orders@shop.example");
        env::remove_var("VITRINE_BIND");
        env::remove_var("VITRINE_CORS_PERMISSIVE");

        let config = AppConfig::from_env().expect("config should load");
        assert_eq!(config.bind_addr.port(), 3030);
        assert_eq!(config.admin_email, "owner@shop.example");
        assert!(!config.cors_permissive);

        env::set_var("VITRINE_CORS_PERMISSIVE", "maybe");
        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { .. }));
        env::remove_var("VITRINE_CORS_PERMISSIVE");

        env::remove_var("DATABASE_URL");
        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVar {
                name: "DATABASE_URL"
            }
        ));
    }
}
