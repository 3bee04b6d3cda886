//! Newsgroup name value type.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid newsgroup name: {0:?}")]
pub struct InvalidNewsgroupName(pub String);

/// A validated, lowercase-normalized newsgroup name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewsgroupName(String);

impl NewsgroupName {
    #[must_use]
    pub fn is_valid(s: &str) -> bool {
        if s.is_empty() || s.starts_with('.') || s.ends_with('.') || s.contains("..") {
            return false;
        }
        s.split('.').all(|label| {
            !label.is_empty()
                && label
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '_' || c == '-')
        })
    }

    /// Fallible constructor; normalizes to lowercase on success.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNewsgroupName` if `s` does not match the dot-separated
    /// label grammar described in the domain model.
    pub fn new(s: impl AsRef<str>) -> Result<Self, InvalidNewsgroupName> {
        let s = s.as_ref();
        if Self::is_valid(s) {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(InvalidNewsgroupName(s.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this group's first label is `local` — the Synchronizer must
    /// skip these groups entirely.
    #[must_use]
    pub fn is_local_only(&self) -> bool {
        self.0
            .split('.')
            .next()
            .is_some_and(|first| first == "local")
    }
}

impl fmt::Display for NewsgroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NewsgroupName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for NewsgroupName {
    type Error = InvalidNewsgroupName;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
