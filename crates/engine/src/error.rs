//! Engine-level error mapping.

use thiserror::Error;

use hideledger_audit::AuditSinkError;
use hideledger_core::DomainError;

use crate::store::LedgerStoreError;

/// Error surfaced by ledger operations (removals, status changes, intake).
///
/// Deterministic domain failures keep their own variants so callers can
/// distinguish a validation problem from a genuine overdraft or an
/// exhausted retry.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Rejected before any store access (missing purpose/confirmer,
    /// non-positive quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A ledger invariant was violated (illegal status transition,
    /// reversing a reversal).
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// The removal would overdraw the freshly recomputed balance.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u64, available: u64 },

    /// Concurrent writers kept winning; retries are exhausted. Callers may
    /// resubmit, which re-reads the balance from scratch.
    #[error("concurrent modification: {0}")]
    Conflict(String),

    /// Referenced record does not exist.
    #[error("not found")]
    NotFound,

    /// Store failure.
    #[error(transparent)]
    Store(LedgerStoreError),

    /// Audit trail append failure. Audit records are a required side
    /// effect, so this is an error, not a log line.
    #[error(transparent)]
    Audit(#[from] AuditSinkError),
}

impl From<DomainError> for LedgerError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => LedgerError::Validation(msg),
            DomainError::InvariantViolation(msg) => LedgerError::Invariant(msg),
            DomainError::InvalidId(msg) => LedgerError::Validation(msg),
            DomainError::NotFound => LedgerError::NotFound,
            DomainError::InsufficientStock {
                requested,
                available,
            } => LedgerError::InsufficientStock {
                requested,
                available,
            },
            DomainError::Conflict(msg) => LedgerError::Conflict(msg),
        }
    }
}

impl From<LedgerStoreError> for LedgerError {
    fn from(value: LedgerStoreError) -> Self {
        match value {
            LedgerStoreError::Concurrency(msg) => LedgerError::Conflict(msg),
            LedgerStoreError::NotFound => LedgerError::NotFound,
            LedgerStoreError::Domain(domain) => domain.into(),
            other => LedgerError::Store(other),
        }
    }
}
