//! Structured error types for vitrine-core.
//!
//! Uses `thiserror` for better API surface and error composition.
//! Binary crates (vitrine-cli) can still use `anyhow` for convenience,
//! but library consumers get structured, composable errors.

use thiserror::Error;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is not set
    #[error("missing required environment variable {name}")]
    MissingVar { name: &'static str },

    /// Environment variable is set but can't be parsed
    #[error("invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

impl ConfigError {
    /// Create a missing-variable error
    pub fn missing(name: &'static str) -> Self {
        Self::MissingVar { name }
    }

    /// Create an invalid-variable error
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidVar {
            name,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ConfigError::missing("DATABASE_URL");
        assert_eq!(
            err.to_string(),
            "missing required environment variable DATABASE_URL"
        );

        let err = ConfigError::invalid("VITRINE_BIND", "not a socket address");
        assert!(err.to_string().contains("VITRINE_BIND"));
        assert!(err.to_string().contains("not a socket address"));
    }
}
