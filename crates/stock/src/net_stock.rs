//! The net-stock calculator.
//!
//! A pure fold over the two ledgers: approved stock entries contribute to a
//! key's original total, completed removals drain it (reversals restore it).
//! Calling it twice with the same inputs yields identical output; there are
//! no error conditions — rows from other categories or with no effect simply
//! contribute zero, because the dashboards must always get *some* answer.

use std::collections::BTreeMap;

use serde::Serialize;

use hideledger_core::{Category, StockKey};

use crate::entry::StockEntry;
use crate::removal::RemovalLogEntry;

/// Derived per-key balance. Recomputed, never stored as source of truth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetStockView {
    pub key: StockKey,
    pub total_original: u64,
    pub total_removed: u64,
    pub net_available: u64,
    /// Percentage of the original stock consumed, rounded to two decimals.
    /// Defined as 100 when there are removals against no original (see
    /// `orphaned`), and 0 when both totals are zero.
    pub percentage_consumed: f64,
    /// Removals exist for this key but no approved original does. A
    /// degenerate state worth an operator's attention.
    pub orphaned: bool,
}

impl NetStockView {
    fn compute(key: StockKey, total_original: u128, total_removed: i128) -> Self {
        // Clamp into u64 range; reversals can push the removed sum below zero.
        let total_original = total_original.min(u64::MAX as u128) as u64;
        let total_removed = total_removed.clamp(0, u64::MAX as i128) as u64;

        let net_available = total_original.saturating_sub(total_removed);
        let percentage_consumed = if total_original == 0 {
            if total_removed > 0 { 100.0 } else { 0.0 }
        } else {
            round2(total_removed as f64 / total_original as f64 * 100.0)
        };

        Self {
            key,
            total_original,
            total_removed,
            net_available,
            percentage_consumed,
            orphaned: total_original == 0 && total_removed > 0,
        }
    }

    /// Zero-balance view for a key with no ledger rows at all.
    pub fn empty(key: StockKey) -> Self {
        Self::compute(key, 0, 0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fold both ledgers into a per-key balance map for one category.
///
/// The key set is the union of keys seen on either side: a key may have
/// removals but no approved entries (orphaned), or approvals and no
/// removals yet.
pub fn net_stock(
    category: Category,
    entries: &[StockEntry],
    removals: &[RemovalLogEntry],
) -> BTreeMap<StockKey, NetStockView> {
    let mut originals: BTreeMap<StockKey, u128> = BTreeMap::new();
    let mut removed: BTreeMap<StockKey, i128> = BTreeMap::new();

    for entry in entries {
        if entry.category() != category {
            continue;
        }
        // Non-approved and retired entries are present in the fold but
        // contribute zero, so a key with only pending stock still shows up.
        let contribution = if entry.contributes() {
            entry.quantity() as u128
        } else {
            0
        };
        *originals.entry(entry.key().clone()).or_default() += contribution;
    }

    for removal in removals {
        if removal.category() != category {
            continue;
        }
        *removed.entry(removal.key().clone()).or_default() += removal.signed_removed();
    }

    let mut views = BTreeMap::new();
    for key in originals.keys().chain(removed.keys()) {
        if views.contains_key(key) {
            continue;
        }
        let total_original = originals.get(key).copied().unwrap_or(0);
        let total_removed = removed.get(key).copied().unwrap_or(0);
        views.insert(
            key.clone(),
            NetStockView::compute(key.clone(), total_original, total_removed),
        );
    }

    views
}

/// Balance for a single `(category, key)` pair.
///
/// A key with no rows on either side yields the zero view rather than an
/// error.
pub fn net_stock_for_key(
    category: Category,
    key: &StockKey,
    entries: &[StockEntry],
    removals: &[RemovalLogEntry],
) -> NetStockView {
    net_stock(category, entries, removals)
        .remove(key)
        .unwrap_or_else(|| NetStockView::empty(key.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    use crate::entry::{EntryStatus, SubmitterMeta};
    use crate::removal::RemovalRequest;
    use hideledger_core::{CompanyId, WorkerId};

    fn meta() -> SubmitterMeta {
        SubmitterMeta {
            submitter: WorkerId::new(),
            company: CompanyId::new(),
        }
    }

    fn key(name: &str) -> StockKey {
        StockKey::normalized(name).unwrap()
    }

    fn approved_entry(category: Category, name: &str, quantity: u64) -> StockEntry {
        let mut e = StockEntry::submit(category, key(name), quantity, meta(), Utc::now()).unwrap();
        e.set_status(EntryStatus::Approved).unwrap();
        e
    }

    fn pending_entry(category: Category, name: &str, quantity: u64) -> StockEntry {
        StockEntry::submit(category, key(name), quantity, meta(), Utc::now()).unwrap()
    }

    fn removal(category: Category, name: &str, quantity: u64, available: u64) -> RemovalLogEntry {
        let request = RemovalRequest {
            category,
            key: key(name),
            remove_quantity: quantity,
            purpose: "sale".to_string(),
            confirmed_by: "Admin".to_string(),
            removal_date: Utc::now(),
        };
        RemovalLogEntry::completed(&request, available, Utc::now()).unwrap()
    }

    #[test]
    fn only_approved_entries_count() {
        let entries = vec![
            approved_entry(Category::Leather, "cow hide", 100),
            pending_entry(Category::Leather, "cow hide", 50),
        ];
        let view = net_stock_for_key(Category::Leather, &key("cow hide"), &entries, &[]);
        assert_eq!(view.total_original, 100);
        assert_eq!(view.net_available, 100);
        assert_eq!(view.percentage_consumed, 0.0);
    }

    #[test]
    fn removals_drain_the_balance() {
        let entries = vec![approved_entry(Category::Leather, "cow hide", 100)];
        let removals = vec![removal(Category::Leather, "cow hide", 30, 100)];
        let view = net_stock_for_key(Category::Leather, &key("cow hide"), &entries, &removals);
        assert_eq!(view.net_available, 70);
        assert_eq!(view.percentage_consumed, 30.0);
        assert!(!view.orphaned);
    }

    #[test]
    fn categories_never_mix() {
        let entries = vec![
            approved_entry(Category::Leather, "cow hide", 100),
            approved_entry(Category::Material, "cow hide", 40),
        ];
        let leather = net_stock(Category::Leather, &entries, &[]);
        let material = net_stock(Category::Material, &entries, &[]);
        assert_eq!(leather[&key("cow hide")].total_original, 100);
        assert_eq!(material[&key("cow hide")].total_original, 40);
    }

    #[test]
    fn orphaned_removals_are_flagged_at_full_consumption() {
        let removals = vec![removal(Category::Material, "lining", 12, 0)];
        let view = net_stock_for_key(Category::Material, &key("lining"), &[], &removals);
        assert!(view.orphaned);
        assert_eq!(view.total_original, 0);
        assert_eq!(view.net_available, 0);
        assert_eq!(view.percentage_consumed, 100.0);
    }

    #[test]
    fn unknown_key_yields_the_zero_view() {
        let view = net_stock_for_key(Category::Leather, &key("goat hide"), &[], &[]);
        assert_eq!(view.total_original, 0);
        assert_eq!(view.total_removed, 0);
        assert_eq!(view.net_available, 0);
        assert_eq!(view.percentage_consumed, 0.0);
        assert!(!view.orphaned);
    }

    #[test]
    fn reversal_restores_removed_quantity() {
        let entries = vec![approved_entry(Category::Leather, "cow hide", 100)];
        let original = removal(Category::Leather, "cow hide", 30, 100);
        let reversal =
            RemovalLogEntry::reversal_of(&original, "mis-keyed", "Admin", Utc::now()).unwrap();
        let removals = vec![original, reversal];

        let view = net_stock_for_key(Category::Leather, &key("cow hide"), &entries, &removals);
        assert_eq!(view.total_removed, 0);
        assert_eq!(view.net_available, 100);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Conservation: net_available always equals
        /// max(0, sum(approved) - sum(removed)) for the key.
        #[test]
        fn conservation_holds(
            approved in prop::collection::vec(1u64..10_000, 0..8),
            pending in prop::collection::vec(1u64..10_000, 0..8),
            removed in prop::collection::vec(1u64..10_000, 0..8),
        ) {
            let mut entries: Vec<StockEntry> = approved
                .iter()
                .map(|q| approved_entry(Category::Leather, "cow hide", *q))
                .collect();
            entries.extend(
                pending
                    .iter()
                    .map(|q| pending_entry(Category::Leather, "cow hide", *q)),
            );
            let removals: Vec<RemovalLogEntry> = removed
                .iter()
                .map(|q| removal(Category::Leather, "cow hide", *q, 0))
                .collect();

            let view = net_stock_for_key(Category::Leather, &key("cow hide"), &entries, &removals);

            let total_approved: u128 = approved.iter().map(|q| *q as u128).sum();
            let total_removed: u128 = removed.iter().map(|q| *q as u128).sum();
            let expected = total_approved.saturating_sub(total_removed) as u64;

            prop_assert_eq!(view.net_available, expected);
            prop_assert_eq!(view.total_original as u128, total_approved);
        }

        /// Non-negativity and determinism for arbitrary ledgers.
        #[test]
        fn never_negative_and_deterministic(
            approved in prop::collection::vec(1u64..1_000, 0..6),
            removed in prop::collection::vec(1u64..5_000, 0..6),
        ) {
            let entries: Vec<StockEntry> = approved
                .iter()
                .map(|q| approved_entry(Category::Material, "thread", *q))
                .collect();
            let removals: Vec<RemovalLogEntry> = removed
                .iter()
                .map(|q| removal(Category::Material, "thread", *q, 0))
                .collect();

            let first = net_stock(Category::Material, &entries, &removals);
            let second = net_stock(Category::Material, &entries, &removals);
            prop_assert_eq!(&first, &second);

            for view in first.values() {
                // u64 already forbids negatives; assert the clamp arithmetic too.
                prop_assert!(view.net_available <= view.total_original);
            }
        }
    }
}
