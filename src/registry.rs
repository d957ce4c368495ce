//! Registry owning cache entries and search processors
//!
//! The registry is an explicitly constructed value the caller owns and
//! threads through; there is no process-wide instance. It orchestrates
//! search, persistence, and deletion across the whole entry set.

use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::search::{SearchProcessor, SearchResult};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Owns named cache entries and search processors
///
/// Both collections are keyed by name; registration is idempotent, with the
/// first registered instance retained on duplicates.
#[derive(Default)]
pub struct CacheRegistry {
    entries: BTreeMap<String, CacheEntry>,
    processors: BTreeMap<String, Box<dyn SearchProcessor>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-loaded with the given processors
    pub fn with_processors(processors: Vec<Box<dyn SearchProcessor>>) -> Self {
        let mut registry = Self::new();
        for processor in processors {
            registry.add_processor(processor);
        }
        registry
    }

    /// Registers a processor under its own name; duplicates are ignored
    pub fn add_processor(&mut self, processor: Box<dyn SearchProcessor>) {
        self.processors
            .entry(processor.name().to_string())
            .or_insert(processor);
    }

    pub fn processor_names(&self) -> Vec<&str> {
        self.processors.keys().map(String::as_str).collect()
    }

    /// Whether an entry with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registers an entry under its name
    ///
    /// Adding a name that is already registered is a no-op: the first
    /// instance is retained and the new one dropped.
    pub fn add_entry(&mut self, entry: CacheEntry) {
        self.entries.entry(entry.name().to_string()).or_insert(entry);
    }

    /// Registers every entry in the iterator, with the same idempotence
    pub fn add_entries(&mut self, entries: impl IntoIterator<Item = CacheEntry>) {
        for entry in entries {
            self.add_entry(entry);
        }
    }

    /// Unregisters and returns the entry, leaving its file on disk
    pub fn remove_entry(&mut self, name: &str) -> Option<CacheEntry> {
        self.entries.remove(name)
    }

    pub fn entry(&self, name: &str) -> Option<&CacheEntry> {
        self.entries.get(name)
    }

    pub fn entry_mut(&mut self, name: &str) -> Option<&mut CacheEntry> {
        self.entries.get_mut(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.values()
    }

    pub fn entry_names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs every registered processor over every entry's content
    ///
    /// Content is fetched once per entry, reloading from disk when nothing
    /// is in memory. Every processor hit is recorded under the entry's name,
    /// so an entry matched by several processors carries all their payloads.
    /// A content-fetch failure aborts the search.
    pub fn find(&mut self, needle: &str) -> Result<BTreeMap<String, SearchResult>, CacheError> {
        let mut matches: BTreeMap<String, SearchResult> = BTreeMap::new();

        for entry in self.entries.values_mut() {
            let Some(content) = entry.content()? else {
                continue;
            };

            for processor in self.processors.values() {
                if !processor.is_supported(&content) {
                    continue;
                }
                if let Some(outcome) = processor.search(needle, &content) {
                    matches
                        .entry(entry.name().to_string())
                        .or_default()
                        .push(processor.name(), outcome);
                }
            }
        }

        debug!(needle, matched = matches.len(), "content search finished");
        Ok(matches)
    }

    /// Deletes every entry's on-disk file
    ///
    /// The first failure aborts the sweep; entries after it keep their
    /// files. Callers wanting best-effort deletion catch and continue per
    /// entry.
    pub fn delete_files(&self) -> Result<(), CacheError> {
        for entry in self.entries.values() {
            entry.delete_file()?;
        }
        Ok(())
    }

    /// Unregisters all entries without touching their files
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Persists every modified entry
    ///
    /// Unmodified entries are skipped by `write_file` itself, so a flush
    /// with nothing dirty performs zero disk writes. The first failure
    /// aborts the loop.
    pub fn flush(&mut self) -> Result<(), CacheError> {
        for entry in self.entries.values_mut() {
            entry.write_file()?;
        }
        Ok(())
    }

    /// Persists a single entry by name; `Ok(false)` for an unknown name or
    /// an entry with nothing to write
    pub fn flush_entry(&mut self, name: &str) -> Result<bool, CacheError> {
        match self.entries.get_mut(name) {
            Some(entry) => entry.write_file(),
            None => Ok(false),
        }
    }
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("entries", &self.entry_names())
            .field("processors", &self.processor_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;
    use crate::entry::{DirectoryMode, StorageMode};
    use crate::search::{
        ObjectSearchProcessor, SearchOutcome, StructuredSearchProcessor, TextSearchProcessor,
    };
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_registry() -> (CacheRegistry, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let registry = CacheRegistry::with_processors(vec![
            Box::new(TextSearchProcessor),
            Box::new(StructuredSearchProcessor),
            Box::new(ObjectSearchProcessor),
        ]);
        (registry, temp_dir)
    }

    fn entry_in(dir: &std::path::Path, name: &str) -> CacheEntry {
        let mut entry = CacheEntry::new(name).expect("Entry name should be accepted");
        entry
            .set_cache_directory(dir, DirectoryMode::UseExisting)
            .expect("Temp directory should exist");
        entry
    }

    #[test]
    fn test_add_entry_is_idempotent_and_keeps_first() {
        let (mut registry, temp_dir) = create_test_registry();

        let first = entry_in(temp_dir.path(), "shared");
        let mut second = entry_in(temp_dir.path(), "shared");
        second.set_expiration_delay(1);

        registry.add_entry(first);
        registry.add_entry(second);

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.entry("shared").expect("Entry should exist").expiration_delay_secs(),
            43_200,
            "The first-added instance must be retained"
        );
    }

    #[test]
    fn test_duplicate_processor_registration_keeps_first() {
        let mut registry = CacheRegistry::new();
        registry.add_processor(Box::new(TextSearchProcessor));
        registry.add_processor(Box::new(TextSearchProcessor));

        assert_eq!(registry.processor_names(), vec!["text_search"]);
    }

    #[test]
    fn test_remove_entry_returns_it() {
        let (mut registry, temp_dir) = create_test_registry();
        registry.add_entry(entry_in(temp_dir.path(), "gone"));

        let removed = registry.remove_entry("gone");
        assert!(removed.is_some());
        assert!(!registry.contains("gone"));
        assert!(registry.remove_entry("gone").is_none());
    }

    #[test]
    fn test_find_returns_only_matching_entries() {
        let (mut registry, temp_dir) = create_test_registry();

        let mut matching = entry_in(temp_dir.path(), "homepage");
        matching
            .set_content(Content::from("cached copy of google results"), StorageMode::Raw)
            .expect("Set should succeed");

        let mut other = entry_in(temp_dir.path(), "weather");
        other
            .set_content(Content::from("sunny with light rain"), StorageMode::Raw)
            .expect("Set should succeed");

        registry.add_entries([matching, other]);

        let matches = registry.find("google").expect("Search should succeed");

        assert_eq!(matches.len(), 1, "Only the matching entry should be reported");
        let result = matches.get("homepage").expect("Hit should be keyed by entry name");
        assert!(!result.is_empty());
        assert_eq!(
            result.outcome("text_search"),
            Some(&SearchOutcome::Text { needle: "google".into(), count: 1 })
        );
    }

    #[test]
    fn test_find_runs_every_processor_per_entry() {
        let (mut registry, temp_dir) = create_test_registry();

        let mut structured = entry_in(temp_dir.path(), "config");
        structured
            .set_content(
                Content::Structured(json!({"nested": {"token": "abc"}})),
                StorageMode::Raw,
            )
            .expect("Set should succeed");
        registry.add_entry(structured);

        let matches = registry.find("token").expect("Search should succeed");
        let result = matches.get("config").expect("Structured entry should match");

        assert_eq!(
            result.outcome("structured_search"),
            Some(&SearchOutcome::Value(json!("abc")))
        );
        assert!(
            result.outcome("text_search").is_none(),
            "Unsupported processors must not report hits"
        );
    }

    #[test]
    fn test_find_skips_entries_without_content() {
        let (mut registry, temp_dir) = create_test_registry();
        registry.add_entry(entry_in(temp_dir.path(), "hollow"));

        let matches = registry.find("anything").expect("Search should succeed");
        assert!(matches.is_empty());
    }

    #[test]
    fn test_flush_with_nothing_modified_writes_no_files() {
        let (mut registry, temp_dir) = create_test_registry();
        registry.add_entry(entry_in(temp_dir.path(), "quiet"));

        registry.flush().expect("Flush should succeed");

        let written = std::fs::read_dir(temp_dir.path())
            .expect("Should list temp directory")
            .count();
        assert_eq!(written, 0, "A flush with nothing dirty must write nothing");
    }

    #[test]
    fn test_flush_persists_modified_entries() {
        let (mut registry, temp_dir) = create_test_registry();

        let mut entry = entry_in(temp_dir.path(), "dirty");
        entry
            .set_content(Content::from("payload"), StorageMode::Raw)
            .expect("Set should succeed");
        registry.add_entry(entry);

        registry.flush().expect("Flush should succeed");

        assert!(temp_dir.path().join("dirty.cache").exists());
        assert!(
            !registry.entry("dirty").expect("Entry should exist").is_modified(),
            "Flush must clear the dirty flag"
        );
    }

    #[test]
    fn test_flush_entry_targets_one_name() {
        let (mut registry, temp_dir) = create_test_registry();

        let mut wanted = entry_in(temp_dir.path(), "wanted");
        wanted
            .set_content(Content::from("a"), StorageMode::Raw)
            .expect("Set should succeed");
        let mut ignored = entry_in(temp_dir.path(), "ignored");
        ignored
            .set_content(Content::from("b"), StorageMode::Raw)
            .expect("Set should succeed");
        registry.add_entries([wanted, ignored]);

        assert!(registry.flush_entry("wanted").expect("Flush should succeed"));
        assert!(!registry.flush_entry("missing").expect("Unknown names are not an error"));

        assert!(temp_dir.path().join("wanted.cache").exists());
        assert!(!temp_dir.path().join("ignored.cache").exists());
    }

    #[test]
    fn test_delete_files_removes_records_but_keeps_entries() {
        let (mut registry, temp_dir) = create_test_registry();

        let mut entry = entry_in(temp_dir.path(), "doomed");
        entry
            .set_content(Content::from("payload"), StorageMode::Raw)
            .expect("Set should succeed");
        registry.add_entry(entry);
        registry.flush().expect("Flush should succeed");

        registry.delete_files().expect("Delete should succeed");

        assert!(!temp_dir.path().join("doomed.cache").exists());
        assert!(registry.contains("doomed"), "Entries stay registered");
    }

    #[test]
    fn test_clear_unregisters_without_deleting_files() {
        let (mut registry, temp_dir) = create_test_registry();

        let mut entry = entry_in(temp_dir.path(), "kept");
        entry
            .set_content(Content::from("payload"), StorageMode::Raw)
            .expect("Set should succeed");
        registry.add_entry(entry);
        registry.flush().expect("Flush should succeed");

        registry.clear();

        assert!(registry.is_empty());
        assert!(
            temp_dir.path().join("kept.cache").exists(),
            "Clear must leave files on disk"
        );
    }
}
