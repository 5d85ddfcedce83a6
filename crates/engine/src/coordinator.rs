//! Removal transaction coordination.
//!
//! The coordinator owns the read-validate-append sequence for removals.
//! Every attempt recomputes the balance from the *current* journals (never
//! a caller-supplied snapshot), and the append is conditional on the key's
//! stream version observed during that recompute. Racing removals on one
//! key therefore linearize: one wins the version, the others retry against
//! the post-commit balance and either fit in what remains or fail with
//! `InsufficientStock`. Failure of any step leaves the stores untouched.

use chrono::Utc;
use tracing::{debug, info, warn};

use hideledger_audit::{AuditRecord, AuditSink};
use hideledger_stock::{net_stock_for_key, RemovalKind, RemovalLogEntry, RemovalRequest};

use crate::error::LedgerError;
use crate::store::{ExpectedVersion, LedgerKey, LedgerStoreError, RemovalLogStore, StockEntryStore};

/// Retry bound for optimistic version conflicts. Conflicts are retried
/// transparently with a fresh balance re-read and only surfaced once the
/// bound is exhausted.
const MAX_ATTEMPTS: u32 = 4;

/// Validates and commits removal events against the current balance.
#[derive(Debug)]
pub struct RemovalCoordinator<ES, RS, A> {
    entries: ES,
    removals: RS,
    audit: A,
}

impl<ES, RS, A> RemovalCoordinator<ES, RS, A>
where
    ES: StockEntryStore,
    RS: RemovalLogStore,
    A: AuditSink,
{
    pub fn new(entries: ES, removals: RS, audit: A) -> Self {
        Self {
            entries,
            removals,
            audit,
        }
    }

    /// Commit a removal or reject it without any state change.
    pub fn request_removal(
        &self,
        request: RemovalRequest,
    ) -> Result<RemovalLogEntry, LedgerError> {
        if let Err(err) = request.validate() {
            self.audit_rejection(&request, &err.to_string())?;
            return Err(err.into());
        }

        let ledger_key = LedgerKey::new(request.category, request.key.clone());
        let mut last_conflict = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            // Fresh read inside the attempt: balance and stream version
            // must come from the same observation.
            let version = self.removals.key_version(&ledger_key)?;
            let entry_rows = self.entries.list_for_key(&ledger_key)?;
            let removal_rows = self.removals.list_for_key(&ledger_key)?;
            let view = net_stock_for_key(
                request.category,
                &request.key,
                &entry_rows,
                &removal_rows,
            );

            if view.total_original == 0 {
                // Accepted by the calculator, but operators need to know.
                warn!(
                    category = %request.category,
                    key = %request.key,
                    "removal requested against a key with no approved original submission"
                );
            }

            if request.remove_quantity > view.net_available {
                self.audit_rejection(
                    &request,
                    &format!(
                        "insufficient stock: requested {}, available {}",
                        request.remove_quantity, view.net_available
                    ),
                )?;
                return Err(LedgerError::InsufficientStock {
                    requested: request.remove_quantity,
                    available: view.net_available,
                });
            }

            let entry = RemovalLogEntry::completed(&request, view.net_available, Utc::now())?;
            match self
                .removals
                .append(entry, ExpectedVersion::Exact(version))
            {
                Ok(committed) => {
                    self.audit.record(AuditRecord::RemovalCommitted {
                        removal_id: committed.id(),
                        category: committed.category(),
                        key: committed.key().clone(),
                        remove_quantity: committed.remove_quantity(),
                        net_available_before: view.net_available,
                        confirmed_by: committed.confirmed_by().to_string(),
                        at: committed.created_at(),
                    })?;
                    info!(
                        removal_id = %committed.id(),
                        category = %committed.category(),
                        key = %committed.key(),
                        quantity = committed.remove_quantity(),
                        "removal committed"
                    );
                    return Ok(committed);
                }
                Err(LedgerStoreError::Concurrency(msg)) => {
                    debug!(
                        category = %request.category,
                        key = %request.key,
                        attempt,
                        "removal append lost a version race, retrying"
                    );
                    last_conflict = msg;
                }
                Err(other) => return Err(other.into()),
            }
        }

        self.audit_rejection(&request, "concurrent modification, retries exhausted")?;
        Err(LedgerError::Conflict(last_conflict))
    }

    /// Append the compensating entry for an earlier withdrawal.
    ///
    /// The original entry is never edited; a withdrawal can be reversed at
    /// most once.
    pub fn reverse_removal(
        &self,
        original: &RemovalLogEntry,
        purpose: &str,
        confirmed_by: &str,
    ) -> Result<RemovalLogEntry, LedgerError> {
        let ledger_key = LedgerKey::new(original.category(), original.key().clone());
        let mut last_conflict = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            let version = self.removals.key_version(&ledger_key)?;
            let removal_rows = self.removals.list_for_key(&ledger_key)?;

            let already_reversed = removal_rows.iter().any(|row| {
                matches!(row.kind(), RemovalKind::Reversal { of } if of == original.id())
            });
            if already_reversed {
                return Err(LedgerError::Invariant(format!(
                    "removal {} is already reversed",
                    original.id()
                )));
            }

            let reversal =
                RemovalLogEntry::reversal_of(original, purpose, confirmed_by, Utc::now())?;
            match self
                .removals
                .append(reversal, ExpectedVersion::Exact(version))
            {
                Ok(committed) => {
                    self.audit.record(AuditRecord::RemovalReversed {
                        removal_id: committed.id(),
                        reverses: original.id(),
                        category: committed.category(),
                        key: committed.key().clone(),
                        remove_quantity: committed.remove_quantity(),
                        confirmed_by: committed.confirmed_by().to_string(),
                        at: committed.created_at(),
                    })?;
                    info!(
                        removal_id = %committed.id(),
                        reverses = %original.id(),
                        key = %committed.key(),
                        "removal reversed"
                    );
                    return Ok(committed);
                }
                Err(LedgerStoreError::Concurrency(msg)) => {
                    debug!(
                        key = %original.key(),
                        attempt,
                        "reversal append lost a version race, retrying"
                    );
                    last_conflict = msg;
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(LedgerError::Conflict(last_conflict))
    }

    fn audit_rejection(&self, request: &RemovalRequest, reason: &str) -> Result<(), LedgerError> {
        self.audit.record(AuditRecord::RemovalRejected {
            category: request.category,
            key: request.key.clone(),
            remove_quantity: request.remove_quantity,
            reason: reason.to_string(),
            confirmed_by: request.confirmed_by.trim().to_string(),
            at: Utc::now(),
        })?;
        Ok(())
    }
}
