use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hideledger_core::{Category, CompanyId, DomainError, DomainResult, EntryId, StockKey, WorkerId};

/// Approval workflow state of a stock entry.
///
/// Transitions form a closed state machine: an admin can approve or reject
/// a pending entry, and can send an approved/rejected entry back to pending.
/// Re-applying the current status is a no-op. Nothing else is legal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Approved,
    Rejected,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Approved => "approved",
            EntryStatus::Rejected => "rejected",
        }
    }

    /// Whether `self -> next` is a legal transition (idempotent self-loops included).
    pub fn can_transition_to(self, next: EntryStatus) -> bool {
        use EntryStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Approved, Pending)
                | (Rejected, Pending)
                | (Pending, Pending)
                | (Approved, Approved)
                | (Rejected, Rejected)
        )
    }
}

impl core::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the original quantity came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// A worker-submitted intake report (leather or raw material).
    WorkerSubmission,
    /// A production job's fulfilled quantity, captured when the job finished.
    ProductionFulfillment,
}

/// Submitter metadata carried on every entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitterMeta {
    pub submitter: WorkerId,
    pub company: CompanyId,
}

/// One original stock submission.
///
/// `quantity` is write-once: the field is private and no mutator exists.
/// The only mutable state is the approval status and the tombstone; both
/// go through validated methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    id: EntryId,
    category: Category,
    key: StockKey,
    quantity: u64,
    status: EntryStatus,
    submitter: WorkerId,
    company: CompanyId,
    submitted_at: DateTime<Utc>,
    source: EntrySource,
    retired_at: Option<DateTime<Utc>>,
}

impl StockEntry {
    /// Create a pending entry from a worker submission.
    pub fn submit(
        category: Category,
        key: StockKey,
        quantity: u64,
        meta: SubmitterMeta,
        submitted_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(Self {
            id: EntryId::new(),
            category,
            key,
            quantity,
            status: EntryStatus::Pending,
            submitter: meta.submitter,
            company: meta.company,
            submitted_at,
            source: EntrySource::WorkerSubmission,
            retired_at: None,
        })
    }

    /// Create a synthetic, already-approved entry from a production
    /// fulfillment. The quantity is frozen here; later edits to the
    /// originating production job never reach this record.
    pub fn from_production(
        key: StockKey,
        fulfilled_quantity: u64,
        meta: SubmitterMeta,
        finished_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if fulfilled_quantity == 0 {
            return Err(DomainError::validation(
                "fulfilled quantity must be positive",
            ));
        }
        Ok(Self {
            id: EntryId::new(),
            category: Category::FinishedProduct,
            key,
            quantity: fulfilled_quantity,
            status: EntryStatus::Approved,
            submitter: meta.submitter,
            company: meta.company,
            submitted_at: finished_at,
            source: EntrySource::ProductionFulfillment,
            retired_at: None,
        })
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn key(&self) -> &StockKey {
        &self.key
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    pub fn submitter(&self) -> WorkerId {
        self.submitter
    }

    pub fn company(&self) -> CompanyId {
        self.company
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn source(&self) -> EntrySource {
        self.source
    }

    pub fn retired_at(&self) -> Option<DateTime<Utc>> {
        self.retired_at
    }

    /// Whether this entry contributes to available stock.
    pub fn contributes(&self) -> bool {
        self.status == EntryStatus::Approved && self.retired_at.is_none()
    }

    /// Apply a status transition.
    ///
    /// Returns `true` if the status changed, `false` for an idempotent
    /// re-application of the current status. Illegal transitions and
    /// transitions on retired entries are rejected; the quantity is never
    /// touched.
    pub fn set_status(&mut self, next: EntryStatus) -> DomainResult<bool> {
        if self.retired_at.is_some() {
            return Err(DomainError::invariant(
                "cannot change status of a retired entry",
            ));
        }
        if !self.status.can_transition_to(next) {
            return Err(DomainError::invariant(format!(
                "illegal status transition {} -> {}",
                self.status, next
            )));
        }
        if self.status == next {
            return Ok(false);
        }
        self.status = next;
        Ok(true)
    }

    /// Tombstone the entry instead of deleting it.
    ///
    /// Retired entries stop contributing to balances but remain readable
    /// history. Returns `false` if the entry was already retired.
    pub fn retire(&mut self, at: DateTime<Utc>) -> bool {
        if self.retired_at.is_some() {
            return false;
        }
        self.retired_at = Some(at);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> SubmitterMeta {
        SubmitterMeta {
            submitter: WorkerId::new(),
            company: CompanyId::new(),
        }
    }

    fn entry(quantity: u64) -> StockEntry {
        StockEntry::submit(
            Category::Leather,
            StockKey::normalized("Cow Hide").unwrap(),
            quantity,
            meta(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn submission_starts_pending() {
        let e = entry(100);
        assert_eq!(e.status(), EntryStatus::Pending);
        assert!(!e.contributes());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = StockEntry::submit(
            Category::Material,
            StockKey::normalized("thread").unwrap(),
            0,
            meta(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn approve_then_reject_is_illegal() {
        let mut e = entry(100);
        assert!(e.set_status(EntryStatus::Approved).unwrap());
        let err = e.set_status(EntryStatus::Rejected).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(e.status(), EntryStatus::Approved);
    }

    #[test]
    fn approved_can_be_sent_back_to_pending() {
        let mut e = entry(100);
        e.set_status(EntryStatus::Approved).unwrap();
        assert!(e.set_status(EntryStatus::Pending).unwrap());
        assert!(e.set_status(EntryStatus::Rejected).unwrap());
    }

    #[test]
    fn reapplying_status_is_a_noop() {
        let mut e = entry(100);
        e.set_status(EntryStatus::Approved).unwrap();
        let before = e.clone();
        assert!(!e.set_status(EntryStatus::Approved).unwrap());
        assert_eq!(e, before);
    }

    #[test]
    fn transitions_never_touch_quantity() {
        let mut e = entry(42);
        e.set_status(EntryStatus::Approved).unwrap();
        e.set_status(EntryStatus::Pending).unwrap();
        e.set_status(EntryStatus::Rejected).unwrap();
        assert_eq!(e.quantity(), 42);
    }

    #[test]
    fn production_entry_is_approved_and_frozen() {
        let product_meta = meta();
        let e = StockEntry::from_production(
            StockKey::for_product(hideledger_core::ProductId::new()),
            25,
            product_meta,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(e.status(), EntryStatus::Approved);
        assert_eq!(e.category(), Category::FinishedProduct);
        assert_eq!(e.source(), EntrySource::ProductionFulfillment);
        assert_eq!(e.quantity(), 25);
    }

    #[test]
    fn retired_entry_stops_contributing_and_freezes_status() {
        let mut e = entry(10);
        e.set_status(EntryStatus::Approved).unwrap();
        assert!(e.contributes());

        assert!(e.retire(Utc::now()));
        assert!(!e.contributes());
        assert!(!e.retire(Utc::now()));
        assert!(e.set_status(EntryStatus::Pending).is_err());
    }
}
