//! Glob-style origin filter.
//!
//! `.` is always literal and `*` matches any run of characters (including
//! none). The match is anchored at both ends, so `*.wikipedia.org` accepts
//! `en.wikipedia.org` but not the bare `wikipedia.org`.

use regex::Regex;

use crate::error::FilterError;

/// A compiled origin (event domain) matcher.
#[derive(Debug, Clone)]
pub struct OriginFilter {
    pattern: String,
    regex: Regex,
}

impl OriginFilter {
    /// Compile `pattern` into an anchored matcher.
    ///
    /// Characters other than `.` and `*` are passed to the regex engine
    /// unchanged, so an unbalanced `(` or `[` is rejected here.
    pub fn compile(pattern: impl Into<String>) -> Result<Self, FilterError> {
        let pattern = pattern.into();
        let source = format!("^{}$", pattern.replace('.', r"\.").replace('*', ".*"));
        let regex = Regex::new(&source).map_err(|source| FilterError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        Ok(Self { pattern, regex })
    }

    /// Returns `true` if `domain` matches the whole pattern.
    pub fn matches(&self, domain: &str) -> bool {
        self.regex.is_match(domain)
    }

    /// The pattern as given to [`OriginFilter::compile`].
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl std::fmt::Display for OriginFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_subdomain() {
        let f = OriginFilter::compile("*.wikipedia.org").unwrap();
        assert!(f.matches("en.wikipedia.org"));
        assert!(f.matches("simple.wikipedia.org"));
        assert!(!f.matches("en.wikibooks.org"));
        assert!(!f.matches("wikipedia.org"));
    }

    #[test]
    fn literal_pattern_is_exact() {
        let f = OriginFilter::compile("en.wikipedia.org").unwrap();
        assert!(f.matches("en.wikipedia.org"));
        assert!(!f.matches("enXwikipedia.org"));
        assert!(!f.matches("en.wikipedia.org.evil"));
        assert!(!f.matches("xen.wikipedia.org"));
    }

    #[test]
    fn star_matches_empty_run() {
        let f = OriginFilter::compile("*wiki*").unwrap();
        assert!(f.matches("wiki"));
        assert!(f.matches("commons.wikimedia.org"));
        assert!(!f.matches("www.mediawik"));
    }

    #[test]
    fn lone_star_matches_everything() {
        let f = OriginFilter::compile("*").unwrap();
        assert!(f.matches(""));
        assert!(f.matches("de.wiktionary.org"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = OriginFilter::compile("en.(wikipedia.org").unwrap_err();
        let FilterError::InvalidPattern { pattern, .. } = &err;
        assert_eq!(pattern, "en.(wikipedia.org");
        assert!(err.to_string().starts_with("invalid origin filter 'en.(wikipedia.org'"));
    }
}
