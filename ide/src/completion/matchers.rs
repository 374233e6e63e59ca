//! Name patterns and prefix checks shared by stages and user rules.
//!
//! A pattern is either an exact name or a glob with at most one `*`, which matches any
//! (possibly empty) run of characters. Matching is case-sensitive.

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern `{0}` contains more than one `*`")]
    TooManyWildcards(String),
    #[error("pattern `{pattern}` does not compile: {message}")]
    Invalid { pattern: String, message: String },
}

#[derive(Debug, Clone)]
pub(crate) enum NameMatcher {
    Exact(String),
    Wildcard(Regex),
}

impl NameMatcher {
    pub(crate) fn compile(pattern: &str) -> Result<Self, PatternError> {
        let Some((head, tail)) = pattern.split_once('*') else {
            return Ok(NameMatcher::Exact(pattern.to_string()));
        };
        if tail.contains('*') {
            return Err(PatternError::TooManyWildcards(pattern.to_string()));
        }
        let source = format!("(?s)^{}.*{}$", regex::escape(head), regex::escape(tail));
        Regex::new(&source)
            .map(NameMatcher::Wildcard)
            .map_err(|err| PatternError::Invalid {
                pattern: pattern.to_string(),
                message: err.to_string(),
            })
    }

    pub(crate) fn is_match(&self, name: &str) -> bool {
        match self {
            NameMatcher::Exact(exact) => exact == name,
            NameMatcher::Wildcard(regex) => regex.is_match(name),
        }
    }

    pub(crate) fn is_wildcard(&self) -> bool {
        matches!(self, NameMatcher::Wildcard(_))
    }
}

/// ASCII-case-insensitive `starts_with`.
pub(crate) fn starts_with_ignore_ascii_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text
            .as_bytes()
            .iter()
            .zip(prefix.as_bytes())
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

/// Whether the first characters of `a` and `b` agree in case.
///
/// Characters without case (digits, `_`, `$`) agree with everything.
pub(crate) fn first_char_case_agrees(a: &str, b: &str) -> bool {
    match (a.chars().next(), b.chars().next()) {
        (Some(a), Some(b)) => {
            let cased = |c: char| c.is_lowercase() || c.is_uppercase();
            !cased(a) || !cased(b) || a.is_uppercase() == b.is_uppercase()
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_patterns_match_whole_names_only() {
        let matcher = NameMatcher::compile("getItem").unwrap();
        assert!(!matcher.is_wildcard());
        assert!(matcher.is_match("getItem"));
        assert!(!matcher.is_match("getItems"));
    }

    #[test]
    fn single_star_matches_any_run() {
        let matcher = NameMatcher::compile("get*").unwrap();
        assert!(matcher.is_match("get"));
        assert!(matcher.is_match("getItem"));
        assert!(!matcher.is_match("forget"));

        let infix = NameMatcher::compile("on*Change").unwrap();
        assert!(infix.is_match("onValueChange"));
        assert!(!infix.is_match("onValueChanged"));

        let multiline = NameMatcher::compile("/// *").unwrap();
        assert!(multiline.is_match("/// Docs\n/// more"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let matcher = NameMatcher::compile("$.*").unwrap();
        assert!(matcher.is_match("$.anything"));
        assert!(!matcher.is_match("x.anything"));
    }

    #[test]
    fn two_stars_are_rejected() {
        assert_eq!(
            NameMatcher::compile("*a*").unwrap_err(),
            PatternError::TooManyWildcards("*a*".to_string())
        );
    }

    #[test]
    fn prefix_checks() {
        assert!(starts_with_ignore_ascii_case("getItem", "GET"));
        assert!(!starts_with_ignore_ascii_case("ge", "get"));
        assert!(first_char_case_agrees("Foo", "F"));
        assert!(!first_char_case_agrees("foo", "F"));
        assert!(first_char_case_agrees("_foo", "F"));
    }
}
