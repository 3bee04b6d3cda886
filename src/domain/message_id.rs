//! `Message-ID` value type: `<...>` with printable, non-whitespace inner content.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid message-id: {0:?}")]
pub struct InvalidMessageId(pub String);

/// A validated NNTP message identifier, e.g. `<foo@example.com>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    /// Total validator: does not allocate or construct.
    #[must_use]
    pub fn is_valid(s: &str) -> bool {
        let bytes = s.as_bytes();
        if bytes.len() < 3 {
            return false;
        }
        if bytes[0] != b'<' || bytes[bytes.len() - 1] != b'>' {
            return false;
        }
        let inner = &s[1..s.len() - 1];
        if inner.is_empty() {
            return false;
        }
        inner
            .chars()
            .all(|c| c.is_ascii_graphic() && c != '<' && c != '>')
    }

    /// Fallible constructor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMessageId` if `s` is not a well-formed `<...>` id.
    pub fn new(s: impl Into<String>) -> Result<Self, InvalidMessageId> {
        let s = s.into();
        if Self::is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(InvalidMessageId(s))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MessageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for MessageId {
    type Error = InvalidMessageId;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for MessageId {
    type Error = InvalidMessageId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_id() {
        assert!(MessageId::is_valid("<a@h>"));
        assert!(MessageId::new("<a@h>").is_ok());
    }

    #[test]
    fn rejects_missing_brackets() {
        assert!(!MessageId::is_valid("a@h"));
        assert!(!MessageId::is_valid("<a@h"));
        assert!(!MessageId::is_valid("a@h>"));
    }

    #[test]
    fn rejects_empty_inner() {
        assert!(!MessageId::is_valid("<>"));
    }

    #[test]
    fn rejects_embedded_angle_brackets() {
        assert!(!MessageId::is_valid("<a<b>@h>"));
        assert!(!MessageId::is_valid("<a>b@h>"));
    }

    #[test]
    fn rejects_embedded_whitespace() {
        assert!(!MessageId::is_valid("<a b@h>"));
    }

    #[test]
    fn equality_is_exact_string_equality() {
        assert_eq!(
            MessageId::new("<a@h>").unwrap(),
            MessageId::new("<a@h>").unwrap()
        );
        assert_ne!(
            MessageId::new("<a@h>").unwrap(),
            MessageId::new("<A@h>").unwrap()
        );
    }
}
