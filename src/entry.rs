//! File-backed cache entries with time-based expiration
//!
//! A `CacheEntry` is a named unit of cached content persisted as one JSON
//! record per entry. Records carry an absolute expiration timestamp and a
//! compression flag alongside the payload; expiration is lazy, checked only
//! when a record is read back, never by a background sweep.

use crate::content::Content;
use crate::error::CacheError;
use chrono::{Duration, NaiveDateTime, Utc};
use directories::ProjectDirs;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default expiration delay in seconds (12 hours)
const DEFAULT_EXPIRATION_DELAY_SECS: i64 = 43_200;

/// Format of the absolute expiration timestamp stored on disk
const EXPIRATION_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Policy for assigning a cache directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryMode {
    /// The directory must already exist
    UseExisting,
    /// Create the directory if it is missing
    ForceCreate,
}

/// Policy for storing assigned content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Store the value as-is
    Raw,
    /// Serialize the value and gzip the bytes before storing
    Compressed,
}

/// Content as it sits in the entry between assignment and persistence
#[derive(Debug, Clone, PartialEq)]
enum StoredContent {
    Raw(Content),
    Compressed(Vec<u8>),
}

/// On-disk record wrapping the payload with its decoding metadata
///
/// When `compressed` is true, `content` holds the gzip byte sequence of the
/// JSON-serialized payload; otherwise it holds the tagged payload itself.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheRecord {
    expiration_date: String,
    content: Value,
    compressed: bool,
}

/// A named, expirable unit of cached content backed by one file on disk
///
/// Lifecycle: content is assigned zero or more times, persisted via
/// `write_file`, reloaded from disk by `refresh` when nothing is in memory,
/// and deleted explicitly or implicitly once `refresh` finds the record
/// expired.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    name: String,
    cache_directory: PathBuf,
    cache_file: String,
    expiration_delay: i64,
    content: Option<StoredContent>,
    compressed: bool,
    modified: bool,
}

impl CacheEntry {
    /// Creates an entry named `name`, caching to `<name>.cache` in the
    /// current directory until told otherwise
    ///
    /// Fails with a validation error when the name is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, CacheError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CacheError::Validation(
                "entry name must be provided".to_string(),
            ));
        }

        let cache_file = format!("{}.cache", name);

        Ok(Self {
            name,
            cache_directory: PathBuf::from("."),
            cache_file,
            expiration_delay: DEFAULT_EXPIRATION_DELAY_SECS,
            content: None,
            compressed: false,
            modified: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cache_directory(&self) -> &Path {
        &self.cache_directory
    }

    pub fn cache_file(&self) -> &str {
        &self.cache_file
    }

    /// Overrides the derived `<name>.cache` file name
    pub fn set_cache_file(&mut self, cache_file: impl Into<String>) {
        self.cache_file = cache_file.into();
    }

    /// Full path of the on-disk record
    pub fn cache_path(&self) -> PathBuf {
        self.cache_directory.join(&self.cache_file)
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn expiration_delay_secs(&self) -> i64 {
        self.expiration_delay
    }

    /// Sets the expiration delay in minutes; non-positive values are ignored
    pub fn set_expiration_delay(&mut self, minutes: i64) {
        if minutes > 0 {
            self.expiration_delay = minutes * 60;
        }
    }

    /// Records the directory the serialized form lives in
    ///
    /// `ForceCreate` creates the directory (recursively) when absent;
    /// `UseExisting` requires it to already exist. Both fail with a file
    /// operation error when their precondition cannot be met.
    pub fn set_cache_directory(
        &mut self,
        directory: impl Into<PathBuf>,
        mode: DirectoryMode,
    ) -> Result<(), CacheError> {
        let directory = directory.into();

        match mode {
            DirectoryMode::ForceCreate => {
                if !directory.is_dir() {
                    fs::create_dir_all(&directory).map_err(|e| {
                        CacheError::FileOperation(format!(
                            "unable to create cache directory \"{}\": {}",
                            directory.display(),
                            e
                        ))
                    })?;
                }
            }
            DirectoryMode::UseExisting => {
                if !directory.is_dir() {
                    return Err(CacheError::FileOperation(format!(
                        "cache directory \"{}\" not found",
                        directory.display()
                    )));
                }
            }
        }

        self.cache_directory = directory;
        Ok(())
    }

    /// Assigns content, marking the entry dirty
    ///
    /// Vacant values (empty text, falsy structured values) are silently
    /// ignored: they neither mark the entry modified nor overwrite prior
    /// content. `Compressed` mode serializes the value and gzips the bytes
    /// at assignment time.
    pub fn set_content(&mut self, content: Content, mode: StorageMode) -> Result<(), CacheError> {
        if content.is_vacant() {
            return Ok(());
        }

        match mode {
            StorageMode::Raw => {
                self.compressed = false;
                self.content = Some(StoredContent::Raw(content));
            }
            StorageMode::Compressed => {
                let serialized = serde_json::to_vec(&content).map_err(|e| {
                    CacheError::Serialization(format!("unable to serialize content: {}", e))
                })?;
                self.compressed = true;
                self.content = Some(StoredContent::Compressed(compress(&serialized)?));
            }
        }

        self.modified = true;
        Ok(())
    }

    /// Returns the current content, reloading from disk when nothing is in
    /// memory
    ///
    /// Compressed content is decompressed and deserialized on the way out;
    /// failures there surface as serialization errors.
    pub fn content(&mut self) -> Result<Option<Content>, CacheError> {
        if self.content.is_none() {
            self.refresh()?;
        }

        match &self.content {
            None => Ok(None),
            Some(StoredContent::Raw(content)) => Ok(Some(content.clone())),
            Some(StoredContent::Compressed(bytes)) => {
                let serialized = decompress(bytes)?;
                let content = serde_json::from_slice(&serialized).map_err(|e| {
                    CacheError::Serialization(format!(
                        "unable to decode decompressed content: {}",
                        e
                    ))
                })?;
                Ok(Some(content))
            }
        }
    }

    /// Whether the entry currently holds (or can reload) content
    pub fn has_content(&mut self) -> Result<bool, CacheError> {
        Ok(self.content()?.is_some())
    }

    /// Variant tag of the current content, if any
    pub fn content_kind(&mut self) -> Result<Option<&'static str>, CacheError> {
        Ok(self.content()?.map(|content| content.kind()))
    }

    /// Byte length of the current content when it is text
    pub fn content_size(&mut self) -> Result<Option<usize>, CacheError> {
        Ok(self.content()?.and_then(|content| content.size()))
    }

    /// Reloads the entry from its on-disk record
    ///
    /// A missing file yields `Ok(false)` without error. A record that cannot
    /// be decoded, or whose expiration timestamp is in the past, is deleted
    /// and also yields `Ok(false)`; this is the eviction mechanism, lazy and
    /// checked only on read. A live record loads the payload and compression
    /// flag and clears the dirty flag.
    pub fn refresh(&mut self) -> Result<bool, CacheError> {
        let path = self.cache_path();

        let raw = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(CacheError::FileOperation(format!(
                    "unable to read file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        match decode_live_record(&raw) {
            Some((stored, compressed)) => {
                debug!(entry = %self.name, path = %path.display(), "loaded cache record");
                self.content = Some(stored);
                self.compressed = compressed;
                self.modified = false;
                Ok(true)
            }
            None => {
                debug!(entry = %self.name, path = %path.display(), "discarding stale cache record");
                self.delete_file()?;
                Ok(false)
            }
        }
    }

    /// Absolute expiration timestamp computed from the current instant
    pub fn expiration_date(&self) -> String {
        (Utc::now() + Duration::seconds(self.expiration_delay))
            .format(EXPIRATION_FORMAT)
            .to_string()
    }

    /// Persists the entry, replacing any existing record
    ///
    /// Returns `Ok(false)` without touching disk when the entry is not
    /// modified or holds no content. The existing file is deleted before the
    /// new record is written, so concurrent readers of the same directory
    /// can observe a window with no file; callers needing multi-process
    /// safety must serialize access externally.
    pub fn write_file(&mut self) -> Result<bool, CacheError> {
        if !self.modified {
            return Ok(false);
        }

        let payload = match &self.content {
            Some(StoredContent::Raw(content)) => {
                serde_json::to_value(content).map_err(|e| {
                    CacheError::Serialization(format!("unable to serialize content: {}", e))
                })?
            }
            Some(StoredContent::Compressed(bytes)) => Value::from(bytes.clone()),
            None => return Ok(false),
        };

        self.delete_file()?;

        let record = CacheRecord {
            expiration_date: self.expiration_date(),
            content: payload,
            compressed: self.compressed,
        };

        self.modified = false;

        let json = serde_json::to_string_pretty(&record).map_err(|e| {
            CacheError::Serialization(format!("unable to serialize cache record: {}", e))
        })?;

        let path = self.cache_path();
        fs::write(&path, json).map_err(|e| {
            CacheError::FileOperation(format!("unable to create file {}: {}", path.display(), e))
        })?;

        debug!(entry = %self.name, path = %path.display(), "wrote cache record");
        Ok(true)
    }

    /// Removes the on-disk record if present
    pub fn delete_file(&self) -> Result<(), CacheError> {
        let path = self.cache_path();

        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                CacheError::FileOperation(format!(
                    "unable to remove file {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }

        Ok(())
    }
}

impl fmt::Display for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Platform cache directory for `app` (`~/.cache/<app>/` on Linux)
///
/// Returns `None` when no home directory can be determined.
pub fn project_cache_dir(app: &str) -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", app)?;
    Some(project_dirs.cache_dir().to_path_buf())
}

fn compress(bytes: &[u8]) -> Result<Vec<u8>, CacheError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .and_then(|_| encoder.finish())
        .map_err(|e| CacheError::Serialization(format!("unable to compress content: {}", e)))
}

fn decompress(bytes: &[u8]) -> Result<Vec<u8>, CacheError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut serialized = Vec::new();
    decoder
        .read_to_end(&mut serialized)
        .map_err(|e| CacheError::Serialization(format!("unable to decompress content: {}", e)))?;
    Ok(serialized)
}

/// Decodes a record and checks it against the clock; `None` means the record
/// is malformed or expired and should be swept
fn decode_live_record(raw: &[u8]) -> Option<(StoredContent, bool)> {
    let record: CacheRecord = serde_json::from_slice(raw).ok()?;
    let expires = NaiveDateTime::parse_from_str(&record.expiration_date, EXPIRATION_FORMAT).ok()?;

    if Utc::now().naive_utc() > expires {
        return None;
    }

    let stored = if record.compressed {
        StoredContent::Compressed(serde_json::from_value(record.content).ok()?)
    } else {
        StoredContent::Raw(serde_json::from_value(record.content).ok()?)
    };

    Some((stored, record.compressed))
}
