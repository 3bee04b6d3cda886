//! Posting mode value type and its wire-format mapping.

/// Whether a newsgroup currently accepts posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingMode {
    Allowed,
    Moderated,
    Prohibited,
}

impl PostingMode {
    /// Map the single-character LIST ACTIVE status token to a `PostingMode`.
    /// Per the domain model: `y` -> Allowed, `m` -> Moderated, anything else
    /// -> Prohibited.
    #[must_use]
    pub fn from_wire(token: &str) -> Self {
        match token {
            "y" => Self::Allowed,
            "m" => Self::Moderated,
            _ => Self::Prohibited,
        }
    }

    #[must_use]
    pub fn to_wire(self) -> &'static str {
        match self {
            Self::Allowed => "y",
            Self::Moderated => "m",
            Self::Prohibited => "n",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_tokens() {
        assert_eq!(PostingMode::from_wire("y"), PostingMode::Allowed);
        assert_eq!(PostingMode::from_wire("m"), PostingMode::Moderated);
    }

    #[test]
    fn maps_anything_else_to_prohibited() {
        assert_eq!(PostingMode::from_wire("n"), PostingMode::Prohibited);
        assert_eq!(PostingMode::from_wire("x"), PostingMode::Prohibited);
        assert_eq!(PostingMode::from_wire(""), PostingMode::Prohibited);
    }

    #[test]
    fn round_trips_through_wire_form() {
        for mode in [
            PostingMode::Allowed,
            PostingMode::Moderated,
            PostingMode::Prohibited,
        ] {
            assert_eq!(PostingMode::from_wire(mode.to_wire()), mode);
        }
    }
}
