use crate::error::Result;
use regex::{Regex, RegexBuilder};

/// Filter words compiled into one alternation.
///
/// Each word may itself be a regular expression and is used verbatim. Empty
/// words are dropped, so an empty word list produces a matcher that never matches.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    pattern: Option<Regex>,
}

impl KeywordMatcher {
    /// Case-insensitive matcher, used for page sweeps.
    pub fn compile(words: &[String]) -> Result<Self> {
        Self::build(words, true)
    }

    /// Case-sensitive matcher, used for autocomplete suggestions.
    pub fn compile_case_sensitive(words: &[String]) -> Result<Self> {
        Self::build(words, false)
    }

    fn build(words: &[String], case_insensitive: bool) -> Result<Self> {
        let alternatives: Vec<String> = words
            .iter()
            .filter(|w| !w.is_empty())
            .map(|w| format!("(?:{})", w))
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(case_insensitive)
            .build()?;

        Ok(Self { pattern: Some(pattern) })
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_alternation_is_case_insensitive() {
        let matcher = KeywordMatcher::compile(&words(&["casino", "lottery"])).unwrap();
        assert!(matcher.is_match("Best CASINO bonuses"));
        assert!(matcher.is_match("weekly Lottery results"));
        assert!(!matcher.is_match("weather forecast"));
    }

    #[test]
    fn test_case_sensitive_variant() {
        let matcher = KeywordMatcher::compile_case_sensitive(&words(&["casino"])).unwrap();
        assert!(matcher.is_match("online casino"));
        assert!(!matcher.is_match("Online CASINO"));
    }

    #[test]
    fn test_empty_list_matches_nothing() {
        let matcher = KeywordMatcher::compile(&[]).unwrap();
        assert!(matcher.is_empty());
        assert!(!matcher.is_match(""));
        assert!(!matcher.is_match("anything"));

        let blanks = KeywordMatcher::compile(&words(&["", ""])).unwrap();
        assert!(blanks.is_empty());
    }

    #[test]
    fn test_whitespace_in_words_is_significant() {
        let matcher = KeywordMatcher::compile(&words(&[" ad "])).unwrap();
        assert!(!matcher.is_empty());
        assert!(matcher.is_match("buy an ad now"));
        assert!(!matcher.is_match("adventure travel"));
        assert!(!matcher.is_match("ad"));
    }

    #[test]
    fn test_words_are_regular_expressions() {
        let matcher = KeywordMatcher::compile(&words(&[r"spam\d+", "foo|bar"])).unwrap();
        assert!(matcher.is_match("this is spam42"));
        assert!(!matcher.is_match("this is spam"));
        assert!(matcher.is_match("bar none"));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(KeywordMatcher::compile(&words(&["(unclosed"])).is_err());
    }
}
