use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hideledger_core::{Category, DomainError, DomainResult, RemovalId, StockKey};

/// Outcome recorded on a removal-log entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalStatus {
    Completed,
    Failed,
}

/// Direction of a removal-log entry.
///
/// A `Reversal` is the compensating entry for an erroneous withdrawal: it
/// restores the original quantity without editing history.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalKind {
    Withdrawal,
    Reversal { of: RemovalId },
}

/// An incoming removal request, validated before any store access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalRequest {
    pub category: Category,
    pub key: StockKey,
    pub remove_quantity: u64,
    pub purpose: String,
    pub confirmed_by: String,
    pub removal_date: DateTime<Utc>,
}

impl RemovalRequest {
    pub fn validate(&self) -> DomainResult<()> {
        if self.remove_quantity == 0 {
            return Err(DomainError::validation("remove quantity must be positive"));
        }
        if self.purpose.trim().is_empty() {
            return Err(DomainError::validation("purpose cannot be empty"));
        }
        if self.confirmed_by.trim().is_empty() {
            return Err(DomainError::validation("confirmer cannot be empty"));
        }
        Ok(())
    }
}

/// One committed stock-removal event.
///
/// Append-only audit history: a completed entry is never edited or deleted.
/// Corrections go through a new compensating `Reversal` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalLogEntry {
    id: RemovalId,
    category: Category,
    key: StockKey,
    remove_quantity: u64,
    /// Balance snapshot shown to the requester's confirmation dialog.
    /// Advisory only; the coordinator re-reads before committing.
    available_at_request: u64,
    purpose: String,
    confirmed_by: String,
    removal_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    status: RemovalStatus,
    kind: RemovalKind,
}

impl RemovalLogEntry {
    /// Build a completed withdrawal from a validated request.
    pub fn completed(
        request: &RemovalRequest,
        available_at_request: u64,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        request.validate()?;
        Ok(Self {
            id: RemovalId::new(),
            category: request.category,
            key: request.key.clone(),
            remove_quantity: request.remove_quantity,
            available_at_request,
            purpose: request.purpose.trim().to_string(),
            confirmed_by: request.confirmed_by.trim().to_string(),
            removal_date: request.removal_date,
            created_at,
            status: RemovalStatus::Completed,
            kind: RemovalKind::Withdrawal,
        })
    }

    /// Build the compensating entry for an earlier withdrawal.
    pub fn reversal_of(
        original: &RemovalLogEntry,
        purpose: &str,
        confirmed_by: &str,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if purpose.trim().is_empty() {
            return Err(DomainError::validation("purpose cannot be empty"));
        }
        if confirmed_by.trim().is_empty() {
            return Err(DomainError::validation("confirmer cannot be empty"));
        }
        if original.status != RemovalStatus::Completed {
            return Err(DomainError::invariant(
                "only completed removals can be reversed",
            ));
        }
        if !matches!(original.kind, RemovalKind::Withdrawal) {
            return Err(DomainError::invariant("cannot reverse a reversal"));
        }
        Ok(Self {
            id: RemovalId::new(),
            category: original.category,
            key: original.key.clone(),
            remove_quantity: original.remove_quantity,
            available_at_request: original.available_at_request,
            purpose: purpose.trim().to_string(),
            confirmed_by: confirmed_by.trim().to_string(),
            removal_date: created_at,
            created_at,
            status: RemovalStatus::Completed,
            kind: RemovalKind::Reversal { of: original.id },
        })
    }

    pub fn id(&self) -> RemovalId {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn key(&self) -> &StockKey {
        &self.key
    }

    pub fn remove_quantity(&self) -> u64 {
        self.remove_quantity
    }

    pub fn available_at_request(&self) -> u64 {
        self.available_at_request
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn confirmed_by(&self) -> &str {
        &self.confirmed_by
    }

    pub fn removal_date(&self) -> DateTime<Utc> {
        self.removal_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> RemovalStatus {
        self.status
    }

    pub fn kind(&self) -> RemovalKind {
        self.kind
    }

    /// Contribution of this entry to a key's removed total.
    ///
    /// Withdrawals drain stock; reversals restore it. Entries that are not
    /// completed contribute nothing.
    pub fn signed_removed(&self) -> i128 {
        if self.status != RemovalStatus::Completed {
            return 0;
        }
        match self.kind {
            RemovalKind::Withdrawal => self.remove_quantity as i128,
            RemovalKind::Reversal { .. } => -(self.remove_quantity as i128),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(quantity: u64, purpose: &str, confirmed_by: &str) -> RemovalRequest {
        RemovalRequest {
            category: Category::Leather,
            key: StockKey::normalized("cow hide").unwrap(),
            remove_quantity: quantity,
            purpose: purpose.to_string(),
            confirmed_by: confirmed_by.to_string(),
            removal_date: Utc::now(),
        }
    }

    #[test]
    fn valid_request_produces_completed_withdrawal() {
        let entry = RemovalLogEntry::completed(&request(30, "sale", "Admin"), 100, Utc::now())
            .unwrap();
        assert_eq!(entry.status(), RemovalStatus::Completed);
        assert_eq!(entry.kind(), RemovalKind::Withdrawal);
        assert_eq!(entry.signed_removed(), 30);
        assert_eq!(entry.available_at_request(), 100);
    }

    #[test]
    fn zero_quantity_and_blank_fields_are_rejected() {
        assert!(request(0, "sale", "Admin").validate().is_err());
        assert!(request(5, "  ", "Admin").validate().is_err());
        assert!(request(5, "sale", "").validate().is_err());
    }

    #[test]
    fn reversal_restores_the_original_quantity() {
        let original =
            RemovalLogEntry::completed(&request(30, "sale", "Admin"), 100, Utc::now()).unwrap();
        let reversal =
            RemovalLogEntry::reversal_of(&original, "mis-keyed sale", "Admin", Utc::now()).unwrap();

        assert_eq!(reversal.signed_removed(), -30);
        assert_eq!(reversal.kind(), RemovalKind::Reversal { of: original.id() });
        assert_eq!(reversal.key(), original.key());
    }

    #[test]
    fn a_reversal_cannot_be_reversed() {
        let original =
            RemovalLogEntry::completed(&request(30, "sale", "Admin"), 100, Utc::now()).unwrap();
        let reversal =
            RemovalLogEntry::reversal_of(&original, "fix", "Admin", Utc::now()).unwrap();
        assert!(RemovalLogEntry::reversal_of(&reversal, "fix again", "Admin", Utc::now()).is_err());
    }
}
