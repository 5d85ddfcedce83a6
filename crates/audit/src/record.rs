use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hideledger_core::{Category, EntryId, RemovalId, StockKey};
use hideledger_stock::EntryStatus;

/// Immutable audit record (timestamp, actor, before/after where applicable).
///
/// Records are written once and never edited; the sink keeps them in
/// arrival order for compliance export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditRecord {
    EntryCreated {
        entry_id: EntryId,
        category: Category,
        key: StockKey,
        quantity: u64,
        status: EntryStatus,
        at: DateTime<Utc>,
    },
    StatusChanged {
        entry_id: EntryId,
        category: Category,
        key: StockKey,
        from: EntryStatus,
        to: EntryStatus,
        actor: String,
        at: DateTime<Utc>,
    },
    EntryRetired {
        entry_id: EntryId,
        category: Category,
        key: StockKey,
        actor: String,
        at: DateTime<Utc>,
    },
    RemovalCommitted {
        removal_id: RemovalId,
        category: Category,
        key: StockKey,
        remove_quantity: u64,
        net_available_before: u64,
        confirmed_by: String,
        at: DateTime<Utc>,
    },
    RemovalRejected {
        category: Category,
        key: StockKey,
        remove_quantity: u64,
        reason: String,
        confirmed_by: String,
        at: DateTime<Utc>,
    },
    RemovalReversed {
        removal_id: RemovalId,
        reverses: RemovalId,
        category: Category,
        key: StockKey,
        remove_quantity: u64,
        confirmed_by: String,
        at: DateTime<Utc>,
    },
}

impl AuditRecord {
    pub fn record_type(&self) -> &'static str {
        match self {
            AuditRecord::EntryCreated { .. } => "ledger.entry.created",
            AuditRecord::StatusChanged { .. } => "ledger.entry.status_changed",
            AuditRecord::EntryRetired { .. } => "ledger.entry.retired",
            AuditRecord::RemovalCommitted { .. } => "ledger.removal.committed",
            AuditRecord::RemovalRejected { .. } => "ledger.removal.rejected",
            AuditRecord::RemovalReversed { .. } => "ledger.removal.reversed",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AuditRecord::EntryCreated { at, .. }
            | AuditRecord::StatusChanged { at, .. }
            | AuditRecord::EntryRetired { at, .. }
            | AuditRecord::RemovalCommitted { at, .. }
            | AuditRecord::RemovalRejected { at, .. }
            | AuditRecord::RemovalReversed { at, .. } => *at,
        }
    }
}
