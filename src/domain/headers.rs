//! `ArticleHeaders`: case-insensitive header map with per-field validators.

use std::collections::BTreeMap;

use chrono::TimeZone;
use smallvec::SmallVec;
use thiserror::Error;

use super::message_id::MessageId;

/// Most headers carry a single value; inline storage for one avoids a heap
/// allocation for the common case.
type HeaderValues = SmallVec<[String; 1]>;

/// The standard headers required on every locally-stored article.
pub const STANDARD_HEADERS: &[&str] = &[
    "Message-ID",
    "Subject",
    "From",
    "Date",
    "Newsgroups",
    "Path",
    "References",
    "Lines",
    "Bytes",
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid article header {name}: {reason}")]
pub struct InvalidArticleHeader {
    pub name: String,
    pub reason: String,
}

/// Header-name -> ordered set of values, canonically-cased for storage but
/// looked up case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleHeaders {
    // Canonical name -> values, insertion order preserved per name.
    entries: BTreeMap<String, HeaderValues>,
    // lowercase name -> canonical name, for case-insensitive lookup.
    canonical: BTreeMap<String, String>,
}

impl ArticleHeaders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header value under `name`, preserving the first-seen casing
    /// of `name` as canonical.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let lower = name.to_ascii_lowercase();
        let canonical_name = self
            .canonical
            .entry(lower)
            .or_insert_with(|| name.to_string())
            .clone();
        self.entries
            .entry(canonical_name)
            .or_default()
            .push(value.into());
    }

    /// Fold an RFC 5536 continuation line onto the most-recently-inserted
    /// value for `name`, rather than pushing a new value onto its list.
    /// A no-op if `name` has no existing value.
    pub fn append_to_last(&mut self, name: &str, text: &str) {
        let lower = name.to_ascii_lowercase();
        if let Some(canonical_name) = self.canonical.get(&lower) {
            if let Some(values) = self.entries.get_mut(canonical_name) {
                if let Some(last) = values.last_mut() {
                    last.push(' ');
                    last.push_str(text);
                }
            }
        }
    }

    /// Case-insensitive lookup of the first value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Case-insensitive lookup of all values for `name`.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        let lower = name.to_ascii_lowercase();
        self.canonical
            .get(&lower)
            .and_then(|canonical| self.entries.get(canonical))
            .map_or(&[], SmallVec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        !self.get_all(name).is_empty()
    }

    /// Iterate canonical-name/value pairs in canonical-name sort order
    /// (stable, deterministic emission order for the wire).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    /// Validate every standard header present, and report the first failure.
    /// Unknown headers are retained unchanged and never fail validation.
    ///
    /// # Errors
    ///
    /// Returns the first `InvalidArticleHeader` encountered.
    pub fn validate_all(&self) -> Result<(), InvalidArticleHeader> {
        for name in STANDARD_HEADERS {
            for value in self.get_all(name) {
                validate_field(name, value)?;
            }
        }
        Ok(())
    }
}

/// Per-field validator dispatch for the standard headers named in the
/// domain model. Unknown headers have no validator and always pass.
fn validate_field(name: &str, value: &str) -> Result<(), InvalidArticleHeader> {
    let ok = match name {
        "Message-ID" | "References" => value
            .split_whitespace()
            .all(|token| MessageId::is_valid(token)),
        "Lines" | "Bytes" => !value.trim().is_empty() && value.trim().parse::<u64>().is_ok(),
        "Path" => is_valid_path(value),
        "Date" => is_valid_date(value),
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(InvalidArticleHeader {
            name: name.to_string(),
            reason: format!("malformed {name} value: {value:?}"),
        })
    }
}

/// `Path:` is `!`-separated components; each component is dot-separated
/// labels of `[A-Za-z0-9_-]`, no empty components, no leading/trailing or
/// consecutive dots within a component. Whitespace around the whole value
/// is trimmed before validation.
#[must_use]
pub fn is_valid_path(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return false;
    }
    trimmed.split('!').all(|component| {
        !component.is_empty()
            && !component.starts_with('.')
            && !component.ends_with('.')
            && !component.contains("..")
            && component
                .split('.')
                .all(|label| !label.is_empty() && label.chars().all(is_path_label_char))
    })
}

fn is_path_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// RFC 5322 / RFC 3977 date: optional day-of-week (with or without comma),
/// 2- or 4-digit year, seconds optional, zone optional (numeric offset,
/// named zone, or `Z`).
#[must_use]
pub fn is_valid_date(value: &str) -> bool {
    parse_article_date(value).is_some()
}

/// Parse an RFC 5322-ish `Date:` header into a UTC timestamp. Returns
/// `None` for anything not matching the accepted grammar.
#[must_use]
pub fn parse_article_date(value: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let mut s = value.trim();

    // Optional leading day-of-week, with or without trailing comma.
    if let Some(comma) = s.find(',') {
        let candidate = &s[..comma];
        if candidate.chars().all(|c| c.is_ascii_alphabetic()) && candidate.len() >= 3 {
            s = s[comma + 1..].trim_start();
        }
    } else if let Some((first, rest)) = s.split_once(' ') {
        if first.chars().all(|c| c.is_ascii_alphabetic()) && first.len() == 3 && rest.contains(' ')
        {
            // Heuristic bare "Mon 1 Jan ..." with no comma is not RFC
            // standard; leave `s` untouched so normal parsing is attempted.
            let _ = rest;
        }
    }

    for fmt in [
        "%d %b %Y %H:%M:%S %z",
        "%d %b %Y %H:%M %z",
        "%d %b %y %H:%M:%S %z",
        "%d %b %y %H:%M %z",
        "%d %b %Y %H:%M:%S %Z",
        "%d %b %Y %H:%M %Z",
        "%d %b %y %H:%M:%S %Z",
        "%d %b %y %H:%M %Z",
    ] {
        if let Ok(dt) = chrono::DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&chrono::Utc));
        }
    }

    // Zone-less forms: assume UTC.
    for fmt in ["%d %b %Y %H:%M:%S", "%d %b %Y %H:%M", "%d %b %y %H:%M:%S", "%d %b %y %H:%M"] {
        if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(chrono::Utc.from_utc_datetime(&ndt));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_storage_is_canonical() {
        let mut h = ArticleHeaders::new();
        h.insert("subject", "hello");
        assert_eq!(h.get("Subject"), Some("hello"));
        assert_eq!(h.get("SUBJECT"), Some("hello"));
    }

    #[test]
    fn valid_headers_validate_all_returns_ok() {
        let mut h = ArticleHeaders::new();
        h.insert("Message-ID", "<a@h>");
        h.insert("Subject", "hi");
        h.insert("From", "a@h");
        h.insert("Date", "01 Jan 2024 00:00:00 +0000");
        h.insert("Newsgroups", "comp.lang.rust");
        h.insert("Path", "host.example!not-for-mail");
        h.insert("References", "<b@h> <c@h>");
        h.insert("Lines", "3");
        h.insert("Bytes", "42");
        assert!(h.validate_all().is_ok());
    }

    #[test]
    fn invalid_lines_header_is_rejected() {
        let mut h = ArticleHeaders::new();
        h.insert("Lines", "not-a-number");
        assert!(h.validate_all().is_err());
    }

    #[test]
    fn invalid_message_id_header_is_rejected() {
        let mut h = ArticleHeaders::new();
        h.insert("Message-ID", "not-an-id");
        assert!(h.validate_all().is_err());
    }

    #[test]
    fn unknown_headers_are_retained_and_never_fail() {
        let mut h = ArticleHeaders::new();
        h.insert("X-Custom", "whatever $$$ invalid-looking");
        assert!(h.validate_all().is_ok());
        assert_eq!(h.get("X-Custom"), Some("whatever $$$ invalid-looking"));
    }

    #[test]
    fn path_rejects_consecutive_or_leading_dots() {
        assert!(is_valid_path("a.b!c"));
        assert!(!is_valid_path("a..b!c"));
        assert!(!is_valid_path(".a!c"));
        assert!(!is_valid_path("a!"));
    }

    #[test]
    fn date_accepts_named_zone_and_numeric_offset() {
        assert!(is_valid_date("Mon, 01 Jan 2024 00:00:00 +0000"));
        assert!(is_valid_date("01 Jan 24 00:00 UT"));
    }

    #[test]
    fn date_rejects_garbage() {
        assert!(!is_valid_date("not a date"));
    }
}
