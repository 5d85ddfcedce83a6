//! `hideledger-core` — ledger foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every other
//! crate in the workspace: strongly-typed identifiers, the category/key
//! addressing scheme, and the domain error model. No infrastructure
//! concerns live here.

pub mod category;
pub mod error;
pub mod id;

pub use category::{Category, StockKey};
pub use error::{DomainError, DomainResult};
pub use id::{CompanyId, EntryId, ProductId, RemovalId, WorkerId};
