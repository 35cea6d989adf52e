//! Email address validation
//!
//! Deliberately loose: one `@`, non-empty local part, a dot in the domain.
//! Real deliverability is the email provider's problem; this only keeps
//! junk out of the database. Addresses are lowercased on construction so
//! ownership checks compare consistently.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Maximum length for email addresses
const MAX_EMAIL_LEN: usize = 254;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));

/// Validated, lowercased email address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new email address, validating shape and lowercasing.
    ///
    /// # Example
    /// ```
    /// use vitrine_server::models::EmailAddress;
    ///
    /// let email = EmailAddress::new("Pat@Shop.Example").unwrap();
    /// assert_eq!(email.as_str(), "pat@shop.example");
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "email" });
        }

        if trimmed.len() > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
            });
        }

        if !EMAIL_RE.is_match(trimmed) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must look like name@domain.tld",
            });
        }

        Ok(Self(trimmed.to_lowercase()))
    }

    /// Get the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_addresses() {
        assert!(EmailAddress::new("pat@shop.example").is_ok());
        assert!(EmailAddress::new("pat+tag@shop.example").is_ok());
        assert!(EmailAddress::new("  pat@shop.example  ").is_ok());
    }

    #[test]
    fn lowercases() {
        let email = EmailAddress::new("Pat@Shop.Example").unwrap();
        assert_eq!(email.as_str(), "pat@shop.example");
    }

    #[test]
    fn rejects_garbage() {
        assert!(EmailAddress::new("").is_err());
        assert!(EmailAddress::new("not-an-email").is_err());
        assert!(EmailAddress::new("two@@ats.example").is_err());
        assert!(EmailAddress::new("no@dot").is_err());
        assert!(EmailAddress::new("spaces in@local.example").is_err());
    }

    #[test]
    fn max_length() {
        let long = format!("{}@x.example", "a".repeat(250));
        let err = EmailAddress::new(&long).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { .. }));
    }
}
