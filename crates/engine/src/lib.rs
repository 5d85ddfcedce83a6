//! Reconciliation engine: stores, coordinator, materialized balances.
//!
//! This crate composes the pure domain logic from `hideledger-stock` with
//! swappable storage behind traits. The in-memory implementations back
//! tests and single-process deployments; a SQL backend can implement the
//! same traits without touching domain code.

pub mod balance;
pub mod coordinator;
pub mod error;
pub mod in_memory;
pub mod service;
pub mod store;


pub use balance::{BalanceMismatch, MaterializedBalances, ReconciliationReport};
pub use coordinator::RemovalCoordinator;
pub use error::LedgerError;
pub use in_memory::{InMemoryRemovalLogStore, InMemoryStockEntryStore};
pub use service::StockLedger;
pub use store::{
    ExpectedVersion, LedgerKey, LedgerStoreError, RemovalLogStore, StatusUpdate, StockEntryStore,
};
