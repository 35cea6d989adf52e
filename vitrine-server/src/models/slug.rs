//! URL slug validation
//!
//! Slug format: lowercase alphanumeric with hyphens. Matches the DB
//! constraint on catalog and page slugs: ^[a-z0-9][a-z0-9-]{0,63}$

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Maximum length for slugs
const MAX_SLUG_LEN: usize = 64;

/// Slug pattern: starts with alphanumeric, allows hyphens
static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]{0,63}$").expect("invalid slug regex"));

/// Validated URL slug (products, categories, bundles, services, pages)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slug(String);

impl Slug {
    /// Create a new slug, validating the format.
    ///
    /// # Rules
    /// - Max 64 characters
    /// - Lowercase alphanumeric and hyphens
    /// - Must start with alphanumeric
    ///
    /// # Example
    /// ```
    /// use vitrine_server::models::Slug;
    ///
    /// assert!(Slug::new("landing-page-kit").is_ok());
    /// assert!(Slug::new("Landing Page").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "slug" });
        }

        if s.len() > MAX_SLUG_LEN {
            return Err(ValidationError::TooLong {
                field: "slug",
                max: MAX_SLUG_LEN,
            });
        }

        if !SLUG_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "slug",
                reason: "must be lowercase alphanumeric with hyphens, starting with alphanumeric",
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Get the slug as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_slugs() {
        assert!(Slug::new("templates").is_ok());
        assert!(Slug::new("landing-page-kit").is_ok());
        assert!(Slug::new("bundle-2024").is_ok());
        assert!(Slug::new("a").is_ok());
    }

    #[test]
    fn rejects_uppercase() {
        let err = Slug::new("Templates").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn rejects_spaces_and_underscores() {
        assert!(Slug::new("landing page").is_err());
        assert!(Slug::new("landing_page").is_err());
    }

    #[test]
    fn rejects_dash_start() {
        let err = Slug::new("-templates").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn rejects_empty() {
        let err = Slug::new("").unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));
    }

    #[test]
    fn max_length() {
        let ok = "a".repeat(64);
        assert!(Slug::new(&ok).is_ok());

        let too_long = "a".repeat(65);
        let err = Slug::new(&too_long).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 64, .. }));
    }
}
