//! Article number value type and the empty-group sentinel rule.

/// Sentinel `high` value for an empty newsgroup.
pub const NO_ARTICLES_HIGHEST_NUMBER: u32 = 0;

/// Sentinel `low` value for an empty newsgroup.
pub const NO_ARTICLES_LOWEST_NUMBER: u32 = 1;

/// A validated article number range for a newsgroup, coerced to the
/// empty-group sentinels on ingress per the domain model invariant:
/// `high >= low` OR both are the empty-group sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticleRange {
    pub low: u32,
    pub high: u32,
}

impl ArticleRange {
    /// Build a range from raw, possibly-malformed peer-reported bounds,
    /// coercing negative-equivalent or inverted bounds to the empty-group
    /// sentinels as the domain model requires.
    #[must_use]
    pub fn coerce(low: i64, high: i64) -> Self {
        if high < low || high <= 0 {
            return Self {
                low: NO_ARTICLES_LOWEST_NUMBER,
                high: NO_ARTICLES_HIGHEST_NUMBER,
            };
        }
        Self {
            low: u32::try_from(low.max(0)).unwrap_or(0),
            high: u32::try_from(high).unwrap_or(u32::MAX),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            low: NO_ARTICLES_LOWEST_NUMBER,
            high: NO_ARTICLES_HIGHEST_NUMBER,
        }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.low == NO_ARTICLES_LOWEST_NUMBER && self.high == NO_ARTICLES_HIGHEST_NUMBER
    }

    #[must_use]
    pub fn count(self) -> u32 {
        if self.is_empty() {
            0
        } else {
            self.high - self.low + 1
        }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.is_empty() || self.high >= self.low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_inverted_bounds_to_sentinels() {
        let r = ArticleRange::coerce(5, 2);
        assert!(r.is_empty());
        assert_eq!(r.low, NO_ARTICLES_LOWEST_NUMBER);
        assert_eq!(r.high, NO_ARTICLES_HIGHEST_NUMBER);
    }

    #[test]
    fn coerces_zero_high_to_sentinels() {
        let r = ArticleRange::coerce(0, 0);
        assert!(r.is_empty());
    }

    #[test]
    fn keeps_valid_non_empty_range() {
        let r = ArticleRange::coerce(1, 10);
        assert!(!r.is_empty());
        assert_eq!(r.count(), 10);
    }

    #[test]
    fn invariant_high_gte_low_or_sentinels() {
        assert!(ArticleRange::empty().is_valid());
        assert!(ArticleRange { low: 3, high: 7 }.is_valid());
        assert!(!ArticleRange { low: 7, high: 3 }.is_valid());
    }
}
