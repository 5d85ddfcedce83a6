use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hideledger_core::{CompanyId, DomainResult, ProductId, StockKey, WorkerId};
use hideledger_stock::{StockEntry, SubmitterMeta};

/// The fulfillment snapshot taken when a production job is marked finished.
///
/// Finished-product stock is not submitted by a worker: the quantity equals
/// the job's fulfilled total at the moment it finished. The adapter turns
/// that snapshot into a synthetic, always-approved stock entry whose
/// quantity is frozen at creation, so later edits to the originating job
/// never retroactively change historical net-stock figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedProductRecord {
    pub product_id: ProductId,
    pub fulfilled_quantity: u64,
    pub finished_at: DateTime<Utc>,
    /// Admin who marked the job finished.
    pub recorded_by: WorkerId,
    pub company: CompanyId,
}

impl FinishedProductRecord {
    pub fn into_stock_entry(self) -> DomainResult<StockEntry> {
        StockEntry::from_production(
            StockKey::for_product(self.product_id),
            self.fulfilled_quantity,
            SubmitterMeta {
                submitter: self.recorded_by,
                company: self.company,
            },
            self.finished_at,
        )
    }
}
