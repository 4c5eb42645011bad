//! Core types for index construction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used throughout the library
pub type Timestamp = DateTime<Utc>;

/// Price type (using f64 for precision)
pub type Price = f64;

/// Identifier for a traded item
///
/// Sale feeds identify items either by token number or by name, so both
/// shapes are accepted and round-trip through serde untagged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(u64),
    Name(String),
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        ItemId::Number(id)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        ItemId::Name(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        ItemId::Name(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(id) => write!(f, "{}", id),
            ItemId::Name(id) => write!(f, "{}", id),
        }
    }
}

/// A single sale of an item
///
/// Transactions are immutable and owned by the caller for the duration of a
/// pipeline run. Field names serialize in camelCase to match upstream
/// sales-data feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Item that was sold
    pub item_id: ItemId,
    /// Sale price (strictly positive)
    pub price: Price,
    /// Moment of the sale
    pub timestamp: Timestamp,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(item_id: impl Into<ItemId>, price: Price, timestamp: Timestamp) -> Self {
        Self {
            item_id: item_id.into(),
            price,
            timestamp,
        }
    }

    /// Check that the price is usable for index math
    pub fn has_valid_price(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Market index value at the moment of one transaction
///
/// The index builder emits one point per surviving input transaction, in the
/// same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexValuePoint {
    pub item_id: ItemId,
    pub price: Price,
    pub index_value: f64,
    pub transaction: Transaction,
}

/// An item's last sale tagged with its index ratio
///
/// `index_ratio = price / index_value`; undefined when `index_value` is zero,
/// which the builder's invariants rule out for positive-price input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRatioPoint {
    pub item_id: ItemId,
    pub price: Price,
    pub index_value: f64,
    pub index_ratio: f64,
    pub transaction: Transaction,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_item_id_conversions() {
        assert_eq!(ItemId::from(7), ItemId::Number(7));
        assert_eq!(ItemId::from("witch-42"), ItemId::Name("witch-42".to_string()));
        assert_eq!(ItemId::Number(7).to_string(), "7");
        assert_eq!(ItemId::from("witch-42").to_string(), "witch-42");
    }

    #[test]
    fn test_transaction_price_check() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        assert!(Transaction::new(1, 150.0, ts).has_valid_price());
        assert!(!Transaction::new(1, 0.0, ts).has_valid_price());
        assert!(!Transaction::new(1, -3.0, ts).has_valid_price());
        assert!(!Transaction::new(1, f64::NAN, ts).has_valid_price());
    }
}
