//! Audit record sink abstraction (mechanics only).
//!
//! The sink is intentionally lightweight: append a record, export the
//! history. Implementations may buffer, persist, or forward; the in-memory
//! implementation here backs tests and single-process deployments.

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::record::AuditRecord;

#[derive(Debug, Error)]
pub enum AuditSinkError {
    /// Append failed due to internal lock poisoning.
    #[error("audit sink lock poisoned")]
    Poisoned,
}

/// Append-only destination for audit records.
///
/// Implementations must preserve arrival order; the export is the
/// compliance report's source of truth.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: AuditRecord) -> Result<(), AuditSinkError>;

    /// Full history in arrival order.
    fn export(&self) -> Vec<AuditRecord>;
}

impl<S> AuditSink for Arc<S>
where
    S: AuditSink + ?Sized,
{
    fn record(&self, record: AuditRecord) -> Result<(), AuditSinkError> {
        (**self).record(record)
    }

    fn export(&self) -> Vec<AuditRecord> {
        (**self).export()
    }
}

/// In-memory audit log.
///
/// - No IO / no async
/// - Arrival-ordered, append-only
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditSink for InMemoryAuditLog {
    fn record(&self, record: AuditRecord) -> Result<(), AuditSinkError> {
        let mut records = self.records.lock().map_err(|_| AuditSinkError::Poisoned)?;
        records.push(record);
        Ok(())
    }

    fn export(&self) -> Vec<AuditRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(_) => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hideledger_core::{Category, EntryId, StockKey};
    use hideledger_stock::EntryStatus;

    fn status_change(actor: &str) -> AuditRecord {
        AuditRecord::StatusChanged {
            entry_id: EntryId::new(),
            category: Category::Leather,
            key: StockKey::normalized("cow hide").unwrap(),
            from: EntryStatus::Pending,
            to: EntryStatus::Approved,
            actor: actor.to_string(),
            at: Utc::now(),
        }
    }

    #[test]
    fn export_preserves_arrival_order() {
        let log = InMemoryAuditLog::new();
        log.record(status_change("first")).unwrap();
        log.record(status_change("second")).unwrap();

        let exported = log.export();
        assert_eq!(exported.len(), 2);
        match (&exported[0], &exported[1]) {
            (
                AuditRecord::StatusChanged { actor: a, .. },
                AuditRecord::StatusChanged { actor: b, .. },
            ) => {
                assert_eq!(a, "first");
                assert_eq!(b, "second");
            }
            _ => panic!("unexpected record shapes"),
        }
    }
}
