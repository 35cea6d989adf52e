//! Review domain types
//!
//! A review needs all of: product (from the path), rating, comment, and
//! reviewer name. Moderation status is the only thing gating public
//! visibility.

use super::ValidationError;

/// Maximum length for review comments
const MAX_COMMENT_LEN: usize = 2000;

/// Maximum length for reviewer names
const MAX_NAME_LEN: usize = 100;

/// Star rating, 1 through 5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rating(i16);

impl Rating {
    pub fn new(value: i16) -> Result<Self, ValidationError> {
        if !(1..=5).contains(&value) {
            return Err(ValidationError::OutOfRange {
                field: "rating",
                min: 1,
                max: 5,
            });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> i16 {
        self.0
    }
}

/// Validated review comment
#[derive(Debug, Clone)]
pub struct ReviewComment(String);

impl ReviewComment {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "comment" });
        }
        if trimmed.len() > MAX_COMMENT_LEN {
            return Err(ValidationError::TooLong {
                field: "comment",
                max: MAX_COMMENT_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated reviewer display name
#[derive(Debug, Clone)]
pub struct ReviewerName(String);

impl ReviewerName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        if trimmed.len() > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "name",
                max: MAX_NAME_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Review workflow state controlling public visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ModerationStatus {
    /// Parse from the wire/database representation.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(ValidationError::InvalidVariant {
                field: "status",
                value: other.to_owned(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(5).is_ok());
        assert!(matches!(
            Rating::new(0),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(-1).is_err());
    }

    #[test]
    fn comment_required() {
        assert!(ReviewComment::new("   ").is_err());
        assert!(ReviewComment::new("Great template, saved me a week.").is_ok());

        let too_long = "x".repeat(2001);
        assert!(matches!(
            ReviewComment::new(&too_long),
            Err(ValidationError::TooLong { max: 2000, .. })
        ));
    }

    #[test]
    fn name_required() {
        assert!(ReviewerName::new("").is_err());
        assert!(ReviewerName::new("Sam").is_ok());
    }

    #[test]
    fn moderation_status_round_trip() {
        for s in ["pending", "accepted", "rejected"] {
            assert_eq!(ModerationStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(ModerationStatus::parse("published").is_err());
    }
}
