//! File records and per-node file stores
//!
//! A `FileRecord` is either complete (content length equals declared size)
//! or still being filled by a transfer. A `FileStore` keeps the records of
//! one node together with a byte-usage counter and optional limits.
//!
//! # Critical Invariants
//!
//! 1. **Byte accounting**: `bytes_used` equals the sum of declared sizes of
//!    every record held, complete or in progress
//! 2. **Reject before mutate**: a record that would break a limit is refused
//!    and the store is left untouched
//! 3. **Completeness**: `transferring == false` implies
//!    `content.len() == size`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Character stripped from content when a teleport interrupts a transfer
pub const REDACTION_MARKER: u8 = b't';

/// Errors raised by file store mutations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("File {name} already exists")]
    AlreadyExists { name: String },

    #[error("Max files reached: limit {limit}")]
    TooManyFiles { limit: usize },

    #[error("Max storage reached: {used} used + {requested} requested exceeds {limit} bytes")]
    OutOfSpace {
        used: usize,
        requested: usize,
        limit: usize,
    },
}

/// A named file held by a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    name: String,
    /// Declared total size in bytes
    size: usize,
    /// Bytes materialised so far
    content: Vec<u8>,
    /// True while a transfer is still filling this record
    transferring: bool,
}

impl FileRecord {
    /// A complete file whose size is its content length
    ///
    /// # Example
    /// ```
    /// use orbital_relay_sim::models::FileRecord;
    ///
    /// let file = FileRecord::complete("notes", "hello");
    /// assert_eq!(file.size(), 5);
    /// assert!(file.is_complete());
    /// ```
    pub fn complete(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size: content.len(),
            content,
            transferring: false,
        }
    }

    /// An empty record about to be filled by a transfer of `size` bytes
    pub fn placeholder(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            content: Vec::with_capacity(size),
            transferring: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Content as text (lossy for non-UTF-8 bytes)
    pub fn content_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    /// Bytes still missing before the record is complete
    pub fn remaining(&self) -> usize {
        self.size.saturating_sub(self.content.len())
    }

    pub fn is_transferring(&self) -> bool {
        self.transferring
    }

    pub fn is_complete(&self) -> bool {
        !self.transferring
    }

    /// Append bytes, never beyond the declared size; completes the record
    /// when it becomes full. Returns the number of bytes taken.
    fn append(&mut self, chunk: &[u8]) -> usize {
        let take = chunk.len().min(self.remaining());
        self.content.extend_from_slice(&chunk[..take]);
        if self.content.len() == self.size {
            self.transferring = false;
        }
        take
    }

    /// Keep `content[..keep]`, append `tail` with every marker stripped,
    /// then resize and complete. Returns the new size.
    fn redact_into(&mut self, keep: usize, tail: &[u8]) -> usize {
        self.content.truncate(keep);
        self.content
            .extend(tail.iter().copied().filter(|b| *b != REDACTION_MARKER));
        self.size = self.content.len();
        self.transferring = false;
        self.size
    }
}

/// Optional capacity limits; `None` means unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLimits {
    pub max_files: Option<usize>,
    pub max_bytes: Option<usize>,
}

impl StoreLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(max_files: Option<usize>, max_bytes: Option<usize>) -> Self {
        Self {
            max_files,
            max_bytes,
        }
    }
}

/// Files owned by one node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStore {
    files: BTreeMap<String, FileRecord>,
    bytes_used: usize,
    limits: StoreLimits,
}

impl FileStore {
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            files: BTreeMap::new(),
            bytes_used: 0,
            limits,
        }
    }

    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    pub fn bytes_used(&self) -> usize {
        self.bytes_used
    }

    pub fn num_files(&self) -> usize {
        self.files.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FileRecord> {
        self.files.get(name)
    }

    pub fn files(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }

    /// Check whether one more file of `size` bytes fits under the limits
    pub fn check_capacity(&self, size: usize) -> Result<(), StoreError> {
        if let Some(limit) = self.limits.max_files {
            if self.files.len() + 1 > limit {
                return Err(StoreError::TooManyFiles { limit });
            }
        }
        if let Some(limit) = self.limits.max_bytes {
            if self.bytes_used + size > limit {
                return Err(StoreError::OutOfSpace {
                    used: self.bytes_used,
                    requested: size,
                    limit,
                });
            }
        }
        Ok(())
    }

    /// Insert a record after name and capacity checks
    ///
    /// # Example
    /// ```
    /// use orbital_relay_sim::models::{FileRecord, FileStore, StoreError, StoreLimits};
    ///
    /// let mut store = FileStore::new(StoreLimits::new(Some(1), None));
    /// store.insert(FileRecord::complete("a", "xyz")).unwrap();
    /// assert_eq!(store.bytes_used(), 3);
    ///
    /// let err = store.insert(FileRecord::complete("b", "q")).unwrap_err();
    /// assert_eq!(err, StoreError::TooManyFiles { limit: 1 });
    /// ```
    pub fn insert(&mut self, record: FileRecord) -> Result<(), StoreError> {
        if self.files.contains_key(record.name()) {
            return Err(StoreError::AlreadyExists {
                name: record.name().to_string(),
            });
        }
        self.check_capacity(record.size())?;
        self.bytes_used += record.size();
        self.files.insert(record.name().to_string(), record);
        Ok(())
    }

    /// Remove a record and release its declared bytes
    pub fn remove(&mut self, name: &str) -> Option<FileRecord> {
        let record = self.files.remove(name)?;
        self.bytes_used -= record.size();
        Some(record)
    }

    /// Append transferred bytes to an in-progress record
    ///
    /// Returns the number of bytes taken, or `None` if the record is absent.
    pub fn append(&mut self, name: &str, chunk: &[u8]) -> Option<usize> {
        self.files.get_mut(name).map(|record| record.append(chunk))
    }

    /// Strip every marker from a record's content and complete it
    pub fn redact(&mut self, name: &str) -> Option<usize> {
        let record = self.files.get(name)?;
        let content = record.content().to_vec();
        self.redact_with_tail(name, 0, &content)
    }

    /// Keep the first `keep` bytes of a record, append `tail` with markers
    /// stripped, complete it, and re-account the declared size
    pub fn redact_with_tail(&mut self, name: &str, keep: usize, tail: &[u8]) -> Option<usize> {
        let record = self.files.get_mut(name)?;
        let old_size = record.size();
        let new_size = record.redact_into(keep, tail);
        self.bytes_used = self.bytes_used - old_size + new_size;
        Some(new_size)
    }
}
