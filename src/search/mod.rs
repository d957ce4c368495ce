//! Content search processors
//!
//! Each processor is a stateless strategy over one content variant:
//! `is_supported` gates which shapes it understands, and `search` looks a
//! needle up inside them. Unsupported content is ignored, never an error.

mod object;
mod result;
mod structured;
mod text;

pub use object::ObjectSearchProcessor;
pub use result::{SearchHit, SearchOutcome, SearchResult};
pub use structured::StructuredSearchProcessor;
pub use text::TextSearchProcessor;

use crate::content::Content;

/// A pluggable, needle-based search strategy over cached content
pub trait SearchProcessor {
    /// Stable name the registry keys this processor by
    fn name(&self) -> &str;

    /// Whether this processor understands the given content variant
    fn is_supported(&self, content: &Content) -> bool;

    /// Searches `content` for `needle`
    ///
    /// Returns `None` for unsupported content or when nothing matches.
    fn search(&self, needle: &str, content: &Content) -> Option<SearchOutcome>;
}
