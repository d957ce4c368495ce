//! File-backed cache with content search
//!
//! Named cache entries are serialized to disk with a time-based expiration
//! and optional gzip compression, then located again later by running needle
//! searches across a registered set of search processors. Expiration is
//! lazy: stale records are detected and swept when they are read back, never
//! by a background task.

pub mod content;
pub mod entry;
pub mod error;
pub mod registry;
pub mod search;

pub use content::{Content, MemberSet, ObjectSnapshot, Reflective};
pub use entry::{project_cache_dir, CacheEntry, DirectoryMode, StorageMode};
pub use error::CacheError;
pub use registry::CacheRegistry;
pub use search::{
    ObjectSearchProcessor, SearchHit, SearchOutcome, SearchProcessor, SearchResult,
    StructuredSearchProcessor, TextSearchProcessor,
};
