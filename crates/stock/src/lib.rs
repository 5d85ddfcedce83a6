//! Stock ledger domain module.
//!
//! This crate contains the business rules of the net-stock reconciliation
//! engine, implemented purely as deterministic domain logic (no IO, no
//! storage): immutable stock entries with a closed status state machine,
//! append-only removal-log entries, and the pure net-stock calculator.

pub mod entry;
pub mod net_stock;
pub mod removal;

pub use entry::{EntrySource, EntryStatus, StockEntry, SubmitterMeta};
pub use net_stock::{net_stock, net_stock_for_key, NetStockView};
pub use removal::{RemovalKind, RemovalLogEntry, RemovalRequest, RemovalStatus};
