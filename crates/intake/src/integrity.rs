//! Data-integrity warnings surfaced by the adapter layer.
//!
//! The calculator deliberately accepts removals against unknown keys (it
//! still has to answer dashboards), so the degenerate all-removed views it
//! produces must be flagged here for operator review rather than silently
//! hidden.

use std::collections::BTreeMap;

use serde::Serialize;

use hideledger_core::{Category, StockKey};
use hideledger_stock::NetStockView;

/// A per-key condition an operator should review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrityWarning {
    pub category: Category,
    pub key: StockKey,
    pub total_removed: u64,
    pub detail: String,
}

/// Scan a category's balance views for orphaned keys (removals recorded
/// against a key with no approved original submission).
pub fn integrity_warnings(
    category: Category,
    views: &BTreeMap<StockKey, NetStockView>,
) -> Vec<IntegrityWarning> {
    views
        .values()
        .filter(|view| view.orphaned)
        .map(|view| IntegrityWarning {
            category,
            key: view.key.clone(),
            total_removed: view.total_removed,
            detail: format!(
                "{} unit(s) removed from '{}' with no approved original submission",
                view.total_removed, view.key
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use hideledger_core::{CompanyId, WorkerId};
    use hideledger_stock::{
        net_stock, EntryStatus, RemovalLogEntry, RemovalRequest, StockEntry, SubmitterMeta,
    };

    fn key(name: &str) -> StockKey {
        StockKey::normalized(name).unwrap()
    }

    fn removal(name: &str, quantity: u64) -> RemovalLogEntry {
        let request = RemovalRequest {
            category: Category::Material,
            key: key(name),
            remove_quantity: quantity,
            purpose: "damage write-off".to_string(),
            confirmed_by: "Admin".to_string(),
            removal_date: Utc::now(),
        };
        RemovalLogEntry::completed(&request, 0, Utc::now()).unwrap()
    }

    #[test]
    fn orphaned_keys_are_reported_and_healthy_keys_are_not() {
        let mut approved = StockEntry::submit(
            Category::Material,
            key("buckles"),
            50,
            SubmitterMeta {
                submitter: WorkerId::new(),
                company: CompanyId::new(),
            },
            Utc::now(),
        )
        .unwrap();
        approved.set_status(EntryStatus::Approved).unwrap();

        let entries = vec![approved];
        let removals = vec![removal("buckles", 10), removal("lining", 7)];
        let views = net_stock(Category::Material, &entries, &removals);

        let warnings = integrity_warnings(Category::Material, &views);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].key, key("lining"));
        assert_eq!(warnings[0].total_removed, 7);
    }
}
