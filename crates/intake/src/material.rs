use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hideledger_core::{Category, CompanyId, DomainResult, StockKey, WorkerId};
use hideledger_stock::{StockEntry, SubmitterMeta};

/// A worker's raw-material intake report (thread, buckles, lining, ...).
///
/// Same 1:1 mapping as leather, against the material inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialIntake {
    pub material_name: String,
    pub quantity: u64,
    pub submitter: WorkerId,
    pub company: CompanyId,
    pub submitted_at: DateTime<Utc>,
}

impl MaterialIntake {
    pub fn into_stock_entry(self) -> DomainResult<StockEntry> {
        let key = StockKey::normalized(&self.material_name)?;
        StockEntry::submit(
            Category::Material,
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

    #[test]
    fn maps_to_a_pending_material_entry() {
        let intake = MaterialIntake {
            material_name: "Waxed Thread".to_string(),
            quantity: 500,
            submitter: WorkerId::new(),
            company: CompanyId::new(),
            submitted_at: Utc::now(),
        };

        let entry = intake.into_stock_entry().unwrap();
        assert_eq!(entry.category(), Category::Material);
        assert_eq!(entry.key().as_str(), "waxed thread");
        assert_eq!(entry.quantity(), 500);
    }
}
