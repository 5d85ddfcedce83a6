//! Compliance audit trail.
//!
//! Every successful status change and every committed or rejected removal
//! attempt is observable as an immutable audit record. This is a required
//! side effect of the engine's operations, not optional logging: the
//! back-office compliance reports are built from these records.

pub mod record;
pub mod sink;

pub use record::AuditRecord;
pub use sink::{AuditSink, AuditSinkError, InMemoryAuditLog};
