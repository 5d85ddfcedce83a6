//! In-memory store implementations.
//!
//! Intended for tests and single-process deployments. Not optimized for
//! performance; aggregation scans the full category.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use hideledger_core::{Category, EntryId, RemovalId};
use hideledger_stock::{EntryStatus, RemovalLogEntry, StockEntry};

use crate::store::{
    ExpectedVersion, LedgerKey, LedgerStoreError, RemovalLogStore, StatusUpdate, StockEntryStore,
};

/// In-memory stock entry store.
#[derive(Debug, Default)]
pub struct InMemoryStockEntryStore {
    entries: RwLock<HashMap<EntryId, StockEntry>>,
}

impl InMemoryStockEntryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StockEntryStore for InMemoryStockEntryStore {
    fn insert(&self, entry: StockEntry) -> Result<(), LedgerStoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| LedgerStoreError::Poisoned)?;
        if entries.contains_key(&entry.id()) {
            return Err(LedgerStoreError::InvalidAppend(format!(
                "entry {} already exists",
                entry.id()
            )));
        }
        entries.insert(entry.id(), entry);
        Ok(())
    }

    fn get(&self, id: EntryId) -> Result<Option<StockEntry>, LedgerStoreError> {
        let entries = self.entries.read().map_err(|_| LedgerStoreError::Poisoned)?;
        Ok(entries.get(&id).cloned())
    }

    fn list(&self, category: Category) -> Result<Vec<StockEntry>, LedgerStoreError> {
        let entries = self.entries.read().map_err(|_| LedgerStoreError::Poisoned)?;
        Ok(entries
            .values()
            .filter(|e| e.category() == category)
            .cloned()
            .collect())
    }

    fn list_for_key(&self, key: &LedgerKey) -> Result<Vec<StockEntry>, LedgerStoreError> {
        let entries = self.entries.read().map_err(|_| LedgerStoreError::Poisoned)?;
        Ok(entries
            .values()
            .filter(|e| e.category() == key.category && e.key() == &key.key)
            .cloned()
            .collect())
    }

    fn set_status(&self, id: EntryId, next: EntryStatus) -> Result<StatusUpdate, LedgerStoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| LedgerStoreError::Poisoned)?;
        let entry = entries.get_mut(&id).ok_or(LedgerStoreError::NotFound)?;
        let previous = entry.status();
        let changed = entry.set_status(next)?;
        Ok(StatusUpdate {
            entry: entry.clone(),
            previous,
            changed,
        })
    }

    fn retire(
        &self,
        id: EntryId,
        at: DateTime<Utc>,
    ) -> Result<(StockEntry, bool), LedgerStoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| LedgerStoreError::Poisoned)?;
        let entry = entries.get_mut(&id).ok_or(LedgerStoreError::NotFound)?;
        let retired_now = entry.retire(at);
        Ok((entry.clone(), retired_now))
    }
}

/// In-memory append-only removal journal, one stream per `(category, key)`.
#[derive(Debug, Default)]
pub struct InMemoryRemovalLogStore {
    streams: RwLock<HashMap<LedgerKey, Vec<RemovalLogEntry>>>,
}

impl InMemoryRemovalLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RemovalLogStore for InMemoryRemovalLogStore {
    fn append(
        &self,
        entry: RemovalLogEntry,
        expected: ExpectedVersion,
    ) -> Result<RemovalLogEntry, LedgerStoreError> {
        let key = LedgerKey::new(entry.category(), entry.key().clone());

        // Version check and push happen under one write lock, so racing
        // appends against the same expected version admit a single winner.
        let mut streams = self
            .streams
            .write()
            .map_err(|_| LedgerStoreError::Poisoned)?;
        let stream = streams.entry(key).or_default();
        let current = stream.len() as u64;

        if !expected.matches(current) {
            return Err(LedgerStoreError::Concurrency(format!(
                "expected {expected:?}, found {current}"
            )));
        }

        stream.push(entry.clone());
        Ok(entry)
    }

    fn get(&self, id: RemovalId) -> Result<Option<RemovalLogEntry>, LedgerStoreError> {
        let streams = self.streams.read().map_err(|_| LedgerStoreError::Poisoned)?;
        Ok(streams
            .values()
            .flat_map(|stream| stream.iter())
            .find(|e| e.id() == id)
            .cloned())
    }

    fn list(&self, category: Category) -> Result<Vec<RemovalLogEntry>, LedgerStoreError> {
        let streams = self.streams.read().map_err(|_| LedgerStoreError::Poisoned)?;
        Ok(streams
            .iter()
            .filter(|(key, _)| key.category == category)
            .flat_map(|(_, stream)| stream.iter().cloned())
            .collect())
    }

    fn list_for_key(&self, key: &LedgerKey) -> Result<Vec<RemovalLogEntry>, LedgerStoreError> {
        let streams = self.streams.read().map_err(|_| LedgerStoreError::Poisoned)?;
        Ok(streams.get(key).cloned().unwrap_or_default())
    }

    fn key_version(&self, key: &LedgerKey) -> Result<u64, LedgerStoreError> {
        let streams = self.streams.read().map_err(|_| LedgerStoreError::Poisoned)?;
        Ok(streams.get(key).map(|s| s.len() as u64).unwrap_or(0))
    }
}
