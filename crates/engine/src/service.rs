//! The ledger facade consumed in-process by the surrounding back office.
//!
//! `StockLedger` wires the stores, the coordinator, the audit sink and the
//! materialized balances into the operations the submission workflow,
//! production pipeline, dashboards and admin actions call.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use hideledger_audit::{AuditRecord, AuditSink, InMemoryAuditLog};
use hideledger_core::{Category, EntryId, RemovalId, StockKey};
use hideledger_intake::{
    integrity_warnings, FinishedProductRecord, IntegrityWarning, LeatherIntake, MaterialIntake,
};
use hideledger_stock::{
    EntryStatus, NetStockView, RemovalLogEntry, RemovalRequest, StockEntry, SubmitterMeta,
};

use crate::balance::{MaterializedBalances, ReconciliationReport};
use crate::coordinator::RemovalCoordinator;
use crate::error::LedgerError;
use crate::in_memory::{InMemoryRemovalLogStore, InMemoryStockEntryStore};
use crate::store::{LedgerKey, RemovalLogStore, StockEntryStore};

/// Facade over the reconciliation engine.
///
/// Generic over the storage and audit backends; `StockLedger::in_memory()`
/// wires the bundled implementations.
#[derive(Debug)]
pub struct StockLedger<ES, RS, A> {
    entries: ES,
    removals: RS,
    audit: A,
    balances: MaterializedBalances,
    coordinator: RemovalCoordinator<ES, RS, A>,
}

impl StockLedger<Arc<InMemoryStockEntryStore>, Arc<InMemoryRemovalLogStore>, Arc<InMemoryAuditLog>> {
    /// Engine backed entirely by in-memory stores.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryStockEntryStore::new()),
            Arc::new(InMemoryRemovalLogStore::new()),
            Arc::new(InMemoryAuditLog::new()),
        )
    }
}

impl<ES, RS, A> StockLedger<ES, RS, A>
where
    ES: StockEntryStore + Clone,
    RS: RemovalLogStore + Clone,
    A: AuditSink + Clone,
{
    pub fn new(entries: ES, removals: RS, audit: A) -> Self {
        let coordinator =
            RemovalCoordinator::new(entries.clone(), removals.clone(), audit.clone());
        Self {
            entries,
            removals,
            audit,
            balances: MaterializedBalances::new(),
            coordinator,
        }
    }

    // --- submission workflow -------------------------------------------

    /// Record an original worker submission (status starts pending).
    pub fn create_stock_entry(
        &self,
        category: Category,
        key: StockKey,
        quantity: u64,
        meta: SubmitterMeta,
        submitted_at: DateTime<Utc>,
    ) -> Result<StockEntry, LedgerError> {
        let entry = StockEntry::submit(category, key, quantity, meta, submitted_at)?;
        self.commit_new_entry(entry)
    }

    /// Intake adapter entry point for raw-leather reports.
    pub fn submit_leather(&self, intake: LeatherIntake) -> Result<StockEntry, LedgerError> {
        let entry = intake.into_stock_entry()?;
        self.commit_new_entry(entry)
    }

    /// Intake adapter entry point for raw-material reports.
    pub fn submit_material(&self, intake: MaterialIntake) -> Result<StockEntry, LedgerError> {
        let entry = intake.into_stock_entry()?;
        self.commit_new_entry(entry)
    }

    /// Production-pipeline entry point: a finished job's fulfilled quantity
    /// becomes a synthetic approved entry, frozen at this call.
    pub fn record_finished_product(
        &self,
        record: FinishedProductRecord,
    ) -> Result<StockEntry, LedgerError> {
        let entry = record.into_stock_entry()?;
        self.commit_new_entry(entry)
    }

    /// Apply a status transition (idempotent; quantity untouched).
    pub fn set_status(
        &self,
        entry_id: EntryId,
        next: EntryStatus,
        actor: &str,
    ) -> Result<StockEntry, LedgerError> {
        let update = self.entries.set_status(entry_id, next)?;
        if update.changed {
            self.audit.record(AuditRecord::StatusChanged {
                entry_id,
                category: update.entry.category(),
                key: update.entry.key().clone(),
                from: update.previous,
                to: next,
                actor: actor.to_string(),
                at: Utc::now(),
            })?;
            self.refresh_for(&update.entry)?;
        }
        Ok(update.entry)
    }

    /// Tombstone an entry. The escape-hatch hard delete from the old admin
    /// UI is deliberately not supported; history stays readable.
    pub fn retire_entry(&self, entry_id: EntryId, actor: &str) -> Result<StockEntry, LedgerError> {
        let (entry, retired_now) = self.entries.retire(entry_id, Utc::now())?;
        if retired_now {
            self.audit.record(AuditRecord::EntryRetired {
                entry_id,
                category: entry.category(),
                key: entry.key().clone(),
                actor: actor.to_string(),
                at: Utc::now(),
            })?;
            self.refresh_for(&entry)?;
        }
        Ok(entry)
    }

    pub fn get_entry(&self, entry_id: EntryId) -> Result<Option<StockEntry>, LedgerError> {
        Ok(self.entries.get(entry_id)?)
    }

    // --- reporting / dashboards ----------------------------------------

    /// Per-key balances for a whole category, served from the materialized
    /// cache.
    pub fn get_net_stock(&self, category: Category) -> BTreeMap<StockKey, NetStockView> {
        self.balances.snapshot(category)
    }

    /// Balance for one key. Keys with no history yield the zero view.
    pub fn net_stock_for_key(&self, category: Category, key: &StockKey) -> NetStockView {
        self.balances.get(&LedgerKey::new(category, key.clone()))
    }

    /// Orphaned-key warnings for operator review.
    pub fn integrity_report(&self, category: Category) -> Vec<IntegrityWarning> {
        integrity_warnings(category, &self.get_net_stock(category))
    }

    /// Full-scan audit check of the materialized balances against the
    /// journals.
    pub fn reconcile(&self, category: Category) -> Result<ReconciliationReport, LedgerError> {
        Ok(self
            .balances
            .reconcile(category, &self.entries, &self.removals)?)
    }

    // --- admin actions -------------------------------------------------

    /// Validate and commit a removal against the current balance.
    pub fn request_removal(
        &self,
        category: Category,
        key: StockKey,
        remove_quantity: u64,
        purpose: &str,
        confirmed_by: &str,
    ) -> Result<RemovalLogEntry, LedgerError> {
        let request = RemovalRequest {
            category,
            key,
            remove_quantity,
            purpose: purpose.to_string(),
            confirmed_by: confirmed_by.to_string(),
            removal_date: Utc::now(),
        };
        let committed = self.coordinator.request_removal(request)?;
        self.balances.refresh(
            &LedgerKey::new(committed.category(), committed.key().clone()),
            &self.entries,
            &self.removals,
        )?;
        Ok(committed)
    }

    /// Compensate an erroneous removal with a reversal entry.
    pub fn reverse_removal(
        &self,
        removal_id: RemovalId,
        purpose: &str,
        confirmed_by: &str,
    ) -> Result<RemovalLogEntry, LedgerError> {
        let original = self
            .removals
            .get(removal_id)?
            .ok_or(LedgerError::NotFound)?;
        let committed = self
            .coordinator
            .reverse_removal(&original, purpose, confirmed_by)?;
        self.balances.refresh(
            &LedgerKey::new(committed.category(), committed.key().clone()),
            &self.entries,
            &self.removals,
        )?;
        Ok(committed)
    }

    // --- audit export --------------------------------------------------

    /// Immutable audit history in arrival order (compliance export).
    pub fn audit_export(&self) -> Vec<AuditRecord> {
        self.audit.export()
    }

    // --- internals -----------------------------------------------------

    fn commit_new_entry(&self, entry: StockEntry) -> Result<StockEntry, LedgerError> {
        self.entries.insert(entry.clone())?;
        self.audit.record(AuditRecord::EntryCreated {
            entry_id: entry.id(),
            category: entry.category(),
            key: entry.key().clone(),
            quantity: entry.quantity(),
            status: entry.status(),
            at: entry.submitted_at(),
        })?;
        self.refresh_for(&entry)?;
        debug!(
            entry_id = %entry.id(),
            category = %entry.category(),
            key = %entry.key(),
            quantity = entry.quantity(),
            status = %entry.status(),
            "stock entry recorded"
        );
        Ok(entry)
    }

    fn refresh_for(&self, entry: &StockEntry) -> Result<(), LedgerError> {
        self.balances.refresh(
            &LedgerKey::new(entry.category(), entry.key().clone()),
            &self.entries,
            &self.removals,
        )?;
        Ok(())
    }
}
