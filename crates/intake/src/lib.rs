//! Category adapters.
//!
//! Each inventory domain has its own native intake shape (a leather report,
//! a raw-material report, a finished production job). This crate maps those
//! shapes onto the generic `(category, key, quantity, status)` model the
//! calculator consumes, and surfaces data-integrity warnings the generic
//! layer would otherwise swallow.

pub mod finished;
pub mod integrity;
pub mod leather;
pub mod material;

pub use finished::FinishedProductRecord;
pub use integrity::{integrity_warnings, IntegrityWarning};
pub use leather::LeatherIntake;
pub use material::MaterialIntake;
