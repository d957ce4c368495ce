//! Whole-word search over text content

use super::{SearchOutcome, SearchProcessor};
use crate::content::Content;
use regex::RegexBuilder;

/// Case-insensitive whole-word search reporting occurrence counts
#[derive(Debug, Default)]
pub struct TextSearchProcessor;

impl SearchProcessor for TextSearchProcessor {
    fn name(&self) -> &str {
        "text_search"
    }

    fn is_supported(&self, content: &Content) -> bool {
        matches!(content, Content::Text(_))
    }

    fn search(&self, needle: &str, content: &Content) -> Option<SearchOutcome> {
        let Content::Text(text) = content else {
            return None;
        };

        let pattern = format!(r"\b{}\b", regex::escape(needle));
        let matcher = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .ok()?;

        let count = matcher.find_iter(text).count();
        if count == 0 {
            return None;
        }

        Some(SearchOutcome::Text {
            needle: needle.to_string(),
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_word_match() {
        let processor = TextSearchProcessor;
        let content = Content::from("the quick brown fox");

        let outcome = processor.search("quick", &content);
        assert_eq!(
            outcome,
            Some(SearchOutcome::Text { needle: "quick".into(), count: 1 })
        );
    }

    #[test]
    fn test_partial_word_does_not_match() {
        let processor = TextSearchProcessor;
        let content = Content::from("the quick brown fox");

        assert_eq!(processor.search("quic", &content), None);
    }

    #[test]
    fn test_match_is_case_insensitive_and_counted() {
        let processor = TextSearchProcessor;
        let content = Content::from("Fox fox FOX foxes");

        let outcome = processor.search("fox", &content);
        assert_eq!(
            outcome,
            Some(SearchOutcome::Text { needle: "fox".into(), count: 3 }),
            "Only whole-word occurrences should be counted"
        );
    }

    #[test]
    fn test_regex_metacharacters_are_escaped() {
        let processor = TextSearchProcessor;
        let content = Content::from("price is 4.99 today");

        assert!(processor.search("4.99", &content).is_some());
        assert_eq!(
            processor.search("4x99", &content),
            None,
            "The dot in the needle must not act as a wildcard"
        );
    }

    #[test]
    fn test_non_text_content_is_ignored() {
        let processor = TextSearchProcessor;
        let content = Content::Structured(serde_json::json!({"quick": 1}));

        assert!(!processor.is_supported(&content));
        assert_eq!(processor.search("quick", &content), None);
    }
}
