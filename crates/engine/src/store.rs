//! Storage traits for the two ledgers.
//!
//! Both collections are append-mostly and grouped by `(category, key)`.
//! The traits make no storage assumptions: the in-memory implementations
//! serve tests and small deployments, and a database-backed implementation
//! only has to honor the same append/version semantics.
//!
//! Write policy enforced at this boundary:
//! - `StockEntry.quantity` is write-once. No trait method can touch it;
//!   updates go through the narrow `set_status`/`retire` operations only.
//! - `RemovalLogEntry` rows are append-only. There is no update or delete.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use hideledger_core::{Category, DomainError, EntryId, RemovalId, StockKey};
use hideledger_stock::{EntryStatus, RemovalLogEntry, StockEntry};

/// Grouping key for both collections: one balance per `(category, key)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgerKey {
    pub category: Category,
    pub key: StockKey,
}

impl LedgerKey {
    pub fn new(category: Category, key: StockKey) -> Self {
        Self { category, key }
    }
}

impl core::fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.category, self.key)
    }
}

/// Optimistic concurrency expectation for a removal stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (replays, migrations).
    Any,
    /// Require the stream to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}

/// Store operation error.
#[derive(Debug, Error)]
pub enum LedgerStoreError {
    /// Optimistic concurrency check failed (stream version moved).
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    /// Invalid record or stream state.
    #[error("invalid append: {0}")]
    InvalidAppend(String),

    /// Record not found.
    #[error("record not found")]
    NotFound,

    /// Internal lock poisoned.
    #[error("store lock poisoned")]
    Poisoned,

    /// Deterministic domain failure raised inside a store update
    /// (e.g. illegal status transition).
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Result of a status transition applied through the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub entry: StockEntry,
    pub previous: EntryStatus,
    /// `false` when the transition was an idempotent re-application.
    pub changed: bool,
}

/// Store of original stock submissions.
///
/// Entries are immutable once created except for the status field and the
/// retirement tombstone, both applied through validated methods here.
pub trait StockEntryStore: Send + Sync {
    fn insert(&self, entry: StockEntry) -> Result<(), LedgerStoreError>;

    fn get(&self, id: EntryId) -> Result<Option<StockEntry>, LedgerStoreError>;

    /// All entries for a category, any status.
    fn list(&self, category: Category) -> Result<Vec<StockEntry>, LedgerStoreError>;

    /// All entries for one `(category, key)`, any status.
    fn list_for_key(&self, key: &LedgerKey) -> Result<Vec<StockEntry>, LedgerStoreError>;

    /// Apply a status transition. The quantity is never touched; illegal
    /// transitions surface as `LedgerStoreError::Domain`.
    fn set_status(&self, id: EntryId, next: EntryStatus) -> Result<StatusUpdate, LedgerStoreError>;

    /// Tombstone an entry (no physical delete exists). Returns the updated
    /// entry and whether this call performed the retirement.
    fn retire(
        &self,
        id: EntryId,
        at: DateTime<Utc>,
    ) -> Result<(StockEntry, bool), LedgerStoreError>;
}

/// Append-only journal of removal events.
pub trait RemovalLogStore: Send + Sync {
    /// Append one entry, conditionally on the key's current version.
    ///
    /// Implementations must make the version check and the append atomic:
    /// two concurrent appends against the same `(category, key)` and the
    /// same expected version admit exactly one winner.
    fn append(
        &self,
        entry: RemovalLogEntry,
        expected: ExpectedVersion,
    ) -> Result<RemovalLogEntry, LedgerStoreError>;

    fn get(&self, id: RemovalId) -> Result<Option<RemovalLogEntry>, LedgerStoreError>;

    fn list(&self, category: Category) -> Result<Vec<RemovalLogEntry>, LedgerStoreError>;

    fn list_for_key(&self, key: &LedgerKey) -> Result<Vec<RemovalLogEntry>, LedgerStoreError>;

    /// Current version of a key's stream (number of appended entries).
    fn key_version(&self, key: &LedgerKey) -> Result<u64, LedgerStoreError>;
}

impl<S> StockEntryStore for Arc<S>
where
    S: StockEntryStore + ?Sized,
{
    fn insert(&self, entry: StockEntry) -> Result<(), LedgerStoreError> {
        (**self).insert(entry)
    }

    fn get(&self, id: EntryId) -> Result<Option<StockEntry>, LedgerStoreError> {
        (**self).get(id)
    }

    fn list(&self, category: Category) -> Result<Vec<StockEntry>, LedgerStoreError> {
        (**self).list(category)
    }

    fn list_for_key(&self, key: &LedgerKey) -> Result<Vec<StockEntry>, LedgerStoreError> {
        (**self).list_for_key(key)
    }

    fn set_status(&self, id: EntryId, next: EntryStatus) -> Result<StatusUpdate, LedgerStoreError> {
        (**self).set_status(id, next)
    }

    fn retire(
        &self,
        id: EntryId,
        at: DateTime<Utc>,
    ) -> Result<(StockEntry, bool), LedgerStoreError> {
        (**self).retire(id, at)
    }
}

impl<S> RemovalLogStore for Arc<S>
where
    S: RemovalLogStore + ?Sized,
{
    fn append(
        &self,
        entry: RemovalLogEntry,
        expected: ExpectedVersion,
    ) -> Result<RemovalLogEntry, LedgerStoreError> {
        (**self).append(entry, expected)
    }

    fn get(&self, id: RemovalId) -> Result<Option<RemovalLogEntry>, LedgerStoreError> {
        (**self).get(id)
    }

    fn list(&self, category: Category) -> Result<Vec<RemovalLogEntry>, LedgerStoreError> {
        (**self).list(category)
    }

    fn list_for_key(&self, key: &LedgerKey) -> Result<Vec<RemovalLogEntry>, LedgerStoreError> {
        (**self).list_for_key(key)
    }

    fn key_version(&self, key: &LedgerKey) -> Result<u64, LedgerStoreError> {
        (**self).key_version(key)
    }
}
