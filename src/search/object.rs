//! Member-name search over object snapshots

use super::{SearchOutcome, SearchProcessor};
use crate::content::Content;

/// Looks a needle up among an object's fields and member names
///
/// A needle naming a directly accessible field returns the whole snapshot;
/// otherwise the member listing is filtered for names equal to the needle
/// and returned as a grouped breakdown.
#[derive(Debug, Default)]
pub struct ObjectSearchProcessor;

impl SearchProcessor for ObjectSearchProcessor {
    fn name(&self) -> &str {
        "object_search"
    }

    fn is_supported(&self, content: &Content) -> bool {
        matches!(content, Content::Object(_))
    }

    fn search(&self, needle: &str, content: &Content) -> Option<SearchOutcome> {
        let Content::Object(snapshot) = content else {
            return None;
        };

        if snapshot.has_field(needle) {
            return Some(SearchOutcome::Object(snapshot.clone()));
        }

        let matching = snapshot.members().matching(needle);
        if matching.is_empty() {
            return None;
        }

        Some(SearchOutcome::Members(matching))
    }
}
