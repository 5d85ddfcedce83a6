//! Materialized per-key balances.
//!
//! Scanning two growing journals on every dashboard read is fine at small
//! scale but degrades as history accumulates, so reads are served from this
//! cache, which every write path refreshes for the key it touched. The
//! full-scan calculator is retained as the reconciliation audit check:
//! `reconcile` recomputes a whole category from the journals and reports
//! any divergence instead of papering over it.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde::Serialize;

use hideledger_core::{Category, StockKey};
use hideledger_stock::{net_stock, net_stock_for_key, NetStockView};

use crate::store::{LedgerKey, LedgerStoreError, RemovalLogStore, StockEntryStore};

/// A cached balance that disagrees with the journals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceMismatch {
    pub key: StockKey,
    /// What the cache held; `None` when the key was missing entirely.
    pub cached: Option<NetStockView>,
    pub recomputed: NetStockView,
}

/// Outcome of a reconciliation pass over one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub category: Category,
    pub keys_checked: usize,
    pub mismatches: Vec<BalanceMismatch>,
}

impl ReconciliationReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Balance cache keyed by `(category, key)`.
///
/// Disposable: the journals remain the source of truth and the cache can
/// be rebuilt from them at any time.
#[derive(Debug, Default)]
pub struct MaterializedBalances {
    views: RwLock<HashMap<LedgerKey, NetStockView>>,
}

impl MaterializedBalances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute one key from the stores and cache the result.
    pub fn refresh<ES, RS>(
        &self,
        key: &LedgerKey,
        entries: &ES,
        removals: &RS,
    ) -> Result<NetStockView, LedgerStoreError>
    where
        ES: StockEntryStore + ?Sized,
        RS: RemovalLogStore + ?Sized,
    {
        let entry_rows = entries.list_for_key(key)?;
        let removal_rows = removals.list_for_key(key)?;
        let view = net_stock_for_key(key.category, &key.key, &entry_rows, &removal_rows);

        let mut views = self.views.write().map_err(|_| LedgerStoreError::Poisoned)?;
        views.insert(key.clone(), view.clone());
        Ok(view)
    }

    /// Cached balance for one key, zero view when the key was never written.
    pub fn get(&self, key: &LedgerKey) -> NetStockView {
        match self.views.read() {
            Ok(views) => views
                .get(key)
                .cloned()
                .unwrap_or_else(|| NetStockView::empty(key.key.clone())),
            Err(_) => NetStockView::empty(key.key.clone()),
        }
    }

    /// All cached balances for a category.
    pub fn snapshot(&self, category: Category) -> BTreeMap<StockKey, NetStockView> {
        match self.views.read() {
            Ok(views) => views
                .iter()
                .filter(|(key, _)| key.category == category)
                .map(|(key, view)| (key.key.clone(), view.clone()))
                .collect(),
            Err(_) => BTreeMap::new(),
        }
    }

    /// Full-scan audit check: recompute the category from the journals and
    /// compare against the cache. Divergence is reported, never healed
    /// silently.
    pub fn reconcile<ES, RS>(
        &self,
        category: Category,
        entries: &ES,
        removals: &RS,
    ) -> Result<ReconciliationReport, LedgerStoreError>
    where
        ES: StockEntryStore + ?Sized,
        RS: RemovalLogStore + ?Sized,
    {
        let entry_rows = entries.list(category)?;
        let removal_rows = removals.list(category)?;
        let recomputed = net_stock(category, &entry_rows, &removal_rows);

        let views = self.views.read().map_err(|_| LedgerStoreError::Poisoned)?;
        let mut mismatches = Vec::new();

        for (key, view) in &recomputed {
            let cached = views.get(&LedgerKey::new(category, key.clone()));
            if cached != Some(view) {
                mismatches.push(BalanceMismatch {
                    key: key.clone(),
                    cached: cached.cloned(),
                    recomputed: view.clone(),
                });
            }
        }

        // Keys cached but absent from the journals (should not happen; a
        // refresh always follows a write).
        for (ledger_key, cached) in views.iter() {
            if ledger_key.category == category && !recomputed.contains_key(&ledger_key.key) {
                mismatches.push(BalanceMismatch {
                    key: ledger_key.key.clone(),
                    cached: Some(cached.clone()),
                    recomputed: NetStockView::empty(ledger_key.key.clone()),
                });
            }
        }

        Ok(ReconciliationReport {
            category,
            keys_checked: recomputed.len(),
            mismatches,
        })
    }
}
