use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hideledger_core::{Category, CompanyId, DomainResult, StockKey, WorkerId};
use hideledger_stock::{StockEntry, SubmitterMeta};

/// A worker's raw-leather intake report.
///
/// Direct 1:1 mapping onto the generic model: the submitted leather type
/// name becomes the stock key (case-normalized), the submitted amount the
/// write-once quantity. Entries start pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeatherIntake {
    pub leather_type: String,
    pub quantity: u64,
    pub submitter: WorkerId,
    pub company: CompanyId,
    pub submitted_at: DateTime<Utc>,
}

impl LeatherIntake {
    pub fn into_stock_entry(self) -> DomainResult<StockEntry> {
        let key = StockKey::normalized(&self.leather_type)?;
        StockEntry::submit(
            Category::Leather,
            key,
            self.quantity,
            SubmitterMeta {
                submitter: self.submitter,
                company: self.company,
            },
            self.submitted_at,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hideledger_stock::EntryStatus;

    #[test]
    fn maps_to_a_pending_leather_entry_with_normalized_key() {
        let intake = LeatherIntake {
            leather_type: "  Cow   Hide ".to_string(),
            quantity: 100,
            submitter: WorkerId::new(),
            company: CompanyId::new(),
            submitted_at: Utc::now(),
        };

        let entry = intake.into_stock_entry().unwrap();
        assert_eq!(entry.category(), Category::Leather);
        assert_eq!(entry.key().as_str(), "cow hide");
        assert_eq!(entry.quantity(), 100);
        assert_eq!(entry.status(), EntryStatus::Pending);
    }

    #[test]
    fn blank_type_name_is_rejected() {
        let intake = LeatherIntake {
            leather_type: " ".to_string(),
            quantity: 10,
            submitter: WorkerId::new(),
            company: CompanyId::new(),
            submitted_at: Utc::now(),
        };
        assert!(intake.into_stock_entry().is_err());
    }
}
