//! Inventory categories and the per-category stock addressing scheme.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::ProductId;

/// One of the three independent inventory domains.
///
/// Stock in one category never mixes with another: balances, removals and
/// audit history are all scoped by `(Category, StockKey)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Leather,
    Material,
    FinishedProduct,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Leather => "leather",
            Category::Material => "material",
            Category::FinishedProduct => "finished_product",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier that stock is tracked against within a category.
///
/// For leather and material this is the case-normalized submitted name
/// ("Cow Hide" and "cow  hide" address the same balance). For finished
/// products it is the product record id rendered as a UUID string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockKey(String);

impl StockKey {
    /// Build a key from a worker-submitted type/material name.
    ///
    /// Normalization: trim, lowercase, collapse internal whitespace runs.
    pub fn normalized(name: &str) -> DomainResult<Self> {
        let normalized = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        if normalized.is_empty() {
            return Err(DomainError::validation("stock key cannot be empty"));
        }

        Ok(Self(normalized))
    }

    /// Build a key for a finished-product record.
    pub fn for_product(product_id: ProductId) -> Self {
        Self(product_id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_collapses_case_and_whitespace() {
        let a = StockKey::normalized("Cow Hide").unwrap();
        let b = StockKey::normalized("  cow   HIDE ").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "cow hide");
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(StockKey::normalized("   ").is_err());
    }

    #[test]
    fn product_keys_round_trip_through_display() {
        let id = ProductId::new();
        let key = StockKey::for_product(id);
        assert_eq!(key.as_str(), id.to_string());
    }
}
