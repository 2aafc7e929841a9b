//! Entry identifiers and the per-list allocator that issues them.
//!
//! Ids are opaque strings. The allocator combines a caller-supplied prefix
//! with a monotonic counter, so two calls inside the same frame can never
//! produce the same value. Externally supplied ids (seed data) go through
//! [`IdAllocator::claim`], which rejects anything already issued or claimed.

use super::error::ListError;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Unique identifier for a list entry.
///
/// Unique for the lifetime of the list that issued it; never reused, even
/// after the entry is evicted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Smart constructor: rejects empty and whitespace-only ids.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidEntryId> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(InvalidEntryId::Empty);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(InvalidEntryId::Whitespace(raw));
        }
        Ok(Self(raw))
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a raw id was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidEntryId {
    /// Nothing to identify by.
    #[error("Entry ID cannot be empty")]
    Empty,
    /// Whitespace is not allowed inside an id.
    #[error("Entry ID cannot contain whitespace: {0:?}")]
    Whitespace(String),
}

/// Counter the first allocation starts after.
pub const FIRST_COUNTER: u64 = 100;

/// Issues ids that are unique by construction.
///
/// One allocator is owned by each list instance; there is no process-wide
/// counter. Every id handed out, and every external id accepted through
/// [`claim`](Self::claim), is remembered so that neither path can produce
/// a collision with the other.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    counter: u64,
    taken: HashSet<EntryId>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    /// Allocator with no ids taken.
    pub fn new() -> Self {
        Self {
            counter: FIRST_COUNTER,
            taken: HashSet::new(),
        }
    }

    /// Allocate a fresh id of the form `<prefix>-<n>`.
    ///
    /// Skips counter values whose rendering was already claimed externally.
    /// An empty or whitespace prefix falls back to `entry`.
    pub fn allocate(&mut self, prefix: &str) -> EntryId {
        let prefix = if prefix.trim().is_empty() || prefix.chars().any(char::is_whitespace) {
            "entry"
        } else {
            prefix
        };

        loop {
            self.counter += 1;
            let candidate = EntryId(format!("{}-{}", prefix, self.counter));
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Accept an externally chosen id.
    ///
    /// # Errors
    /// `ListError::DuplicateId` if the id was already issued or claimed;
    /// `ListError::MalformedSpec` if the raw value is not a valid id.
    pub fn claim(&mut self, raw: &str) -> Result<EntryId, ListError> {
        let id = EntryId::new(raw).map_err(|e| ListError::MalformedSpec(e.to_string()))?;
        if self.taken.contains(&id) {
            return Err(ListError::DuplicateId(id));
        }
        self.taken.insert(id.clone());
        Ok(id)
    }

    /// Whether the id was ever issued or claimed by this allocator.
    pub fn is_taken(&self, id: &EntryId) -> bool {
        self.taken.contains(id)
    }

    /// Number of ids issued or claimed so far.
    pub fn issued(&self) -> usize {
        self.taken.len()
    }
}
