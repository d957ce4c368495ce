//! Key search over structured content

use super::{SearchOutcome, SearchProcessor};
use crate::content::Content;
use serde_json::Value;

/// Pre-order search for an exactly matching key in nested mappings
///
/// Traversal visits each key before descending into its value, so the first
/// match in parent-before-children order wins. Sequence indices are never
/// compared against the needle; sequences are only descended into.
#[derive(Debug, Default)]
pub struct StructuredSearchProcessor;

impl SearchProcessor for StructuredSearchProcessor {
    fn name(&self) -> &str {
        "structured_search"
    }

    fn is_supported(&self, content: &Content) -> bool {
        matches!(
            content,
            Content::Structured(Value::Object(_)) | Content::Structured(Value::Array(_))
        )
    }

    fn search(&self, needle: &str, content: &Content) -> Option<SearchOutcome> {
        if !self.is_supported(content) {
            return None;
        }

        let Content::Structured(value) = content else {
            return None;
        };

        find_key(needle, value).map(|found| SearchOutcome::Value(found.clone()))
    }
}

fn find_key<'a>(needle: &str, value: &'a Value) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == needle {
                    return Some(child);
                }
                if let Some(found) = find_key(needle, child) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(items) => items.iter().find_map(|item| find_key(needle, item)),
        _ => None,
    }
}
