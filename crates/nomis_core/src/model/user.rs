//! User domain model.
//!
//! Users are authenticated by an external provider; the provider uid is the
//! stable identifier and the record here is a local mirror.

use crate::model::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// Returns true for a simple `local@domain.tld` address.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Provider-issued stable user identifier.
pub type UserId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl User {
    /// Creates a user mirror stamped with the current time.
    pub fn new(id: impl Into<UserId>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Checks local field constraints.
    ///
    /// Name may be blank (providers do not always return one); id may not.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::InvalidId("user"));
        }
        if !self.email.is_empty() && !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, User};

    #[test]
    fn email_regex_accepts_simple_addresses() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("  first.last+tag@mail.example.org "));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email("a b@c.com"));
    }

    #[test]
    fn validate_allows_blank_email_but_not_malformed() {
        assert!(User::new("u1", "", "").validate().is_ok());
        assert!(User::new("u1", "Ann", "ann@example.com").validate().is_ok());
        assert!(User::new("u1", "Ann", "ann@").validate().is_err());
        assert!(User::new(" ", "Ann", "").validate().is_err());
    }
}
