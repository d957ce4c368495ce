//! Result types pairing entries with processor payloads

use crate::content::{MemberSet, ObjectSnapshot};
use serde_json::Value;

/// Payload produced by a processor when a needle matches
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Whole-word text hit with its occurrence count
    Text { needle: String, count: usize },
    /// Value found under a matching key in structured content
    Value(Value),
    /// The matched object itself, when the needle named one of its fields
    Object(ObjectSnapshot),
    /// Member names equal to the needle, grouped by classification
    Members(MemberSet),
}

/// One processor's hit against one entry
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub processor: String,
    pub outcome: SearchOutcome,
}

/// Every hit recorded against a single entry during a registry search
///
/// Hits are kept per processor rather than collapsed to the last one, so a
/// caller sees each processor that matched and can pick among the payloads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    hits: Vec<SearchHit>,
}

impl SearchResult {
    pub(crate) fn push(&mut self, processor: &str, outcome: SearchOutcome) {
        self.hits.push(SearchHit {
            processor: processor.to_string(),
            outcome,
        });
    }

    pub fn hits(&self) -> &[SearchHit] {
        &self.hits
    }

    /// The payload a specific processor produced, if it matched
    pub fn outcome(&self, processor: &str) -> Option<&SearchOutcome> {
        self.hits
            .iter()
            .find(|hit| hit.processor == processor)
            .map(|hit| &hit.outcome)
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_are_kept_per_processor() {
        let mut result = SearchResult::default();
        result.push("text_search", SearchOutcome::Text { needle: "x".into(), count: 1 });
        result.push("structured_search", SearchOutcome::Value(serde_json::json!("v")));

        assert_eq!(result.len(), 2);
        assert!(result.outcome("text_search").is_some());
        assert!(result.outcome("structured_search").is_some());
        assert!(result.outcome("object_search").is_none());
    }
}
