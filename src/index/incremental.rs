//! Single-pass TAMI calculation
//!
//! Performance-equivalent alternative to building the full index value
//! history and reducing it afterwards. The basket total is kept as a running
//! accumulator (one subtract and one add per resale instead of a fresh sum
//! over the basket), and per-item index ratios are folded into a running sum
//! in the same pass, giving O(n) over the history with O(1) amortized work
//! per transaction.
//!
//! Input must already be sorted chronologically and pre-filtered; this pass
//! performs no ordering, outlier, or validity checks of its own. The result
//! matches the batch pipeline within floating-point tolerance.

use crate::types::{ItemId, Price, Transaction};
use hashbrown::HashMap;

/// Latest contribution of one item to the running aggregates
#[derive(Debug, Clone, Copy)]
struct ItemState {
    price: Price,
    index_ratio: f64,
}

/// Streaming single-pass TAMI accumulator
#[derive(Debug, Clone)]
pub struct IncrementalTami {
    items: HashMap<ItemId, ItemState>,
    /// Sum of each item's most recent sale price
    total: f64,
    /// Sum of each item's most recent index ratio
    ratio_sum: f64,
    divisor: f64,
    last_index_value: f64,
    processed: usize,
}

impl IncrementalTami {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            total: 0.0,
            ratio_sum: 0.0,
            divisor: 1.0,
            last_index_value: 0.0,
            processed: 0,
        }
    }

    /// Fold one sale into the running index and ratio sums
    pub fn update(&mut self, transaction: &Transaction) {
        let previous = self.items.get(&transaction.item_id).copied();

        let item_count = self.items.len() + usize::from(previous.is_none());

        let index_value = if self.processed == 0 {
            self.total = transaction.price;
            transaction.price
        } else if let Some(state) = previous {
            // Resale: swap the item's old price out of the running total
            self.total += transaction.price - state.price;
            self.total / (item_count as f64 * self.divisor)
        } else {
            self.total += transaction.price;
            let raw_index = self.total / (item_count as f64 * self.divisor);
            self.divisor *= raw_index / self.last_index_value;
            self.total / (item_count as f64 * self.divisor)
        };

        self.last_index_value = index_value;

        let index_ratio = transaction.price / index_value;
        self.ratio_sum += index_ratio - previous.map_or(0.0, |state| state.index_ratio);

        self.items.insert(
            transaction.item_id.clone(),
            ItemState {
                price: transaction.price,
                index_ratio,
            },
        );

        self.processed += 1;
    }

    /// TAMI over everything folded in so far; `None` before the first sale
    pub fn value(&self) -> Option<f64> {
        (self.processed > 0).then(|| self.last_index_value * self.ratio_sum)
    }

    /// Compute the TAMI for a sorted, pre-filtered transaction sequence
    pub fn compute(transactions: &[Transaction]) -> Option<f64> {
        let mut tami = Self::new();
        for transaction in transactions {
            tami.update(transaction);
        }
        tami.value()
    }
}

impl Default for IncrementalTami {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::builder::IndexBuilder;
    use crate::index::ratios::time_adjusted_market_index;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn txn(item_id: u64, price: f64, offset_hours: i64) -> Transaction {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Transaction::new(item_id, price, base + Duration::hours(offset_hours))
    }

    #[test]
    fn test_golden_scenario() {
        let transactions = vec![txn(1, 455.0, 0), txn(2, 126.0, 1), txn(2, 177.5, 2)];

        let tami = IncrementalTami::compute(&transactions).unwrap();

        assert_relative_eq!(tami, 672.8313253012049, max_relative = 1e-9);
    }

    #[test]
    fn test_matches_batch_composition() {
        let transactions = vec![
            txn(1, 455.0, 0),
            txn(2, 126.0, 1),
            txn(1, 480.0, 2),
            txn(3, 990.0, 3),
            txn(2, 177.5, 4),
            txn(4, 12.5, 5),
            txn(3, 1100.0, 6),
            txn(1, 430.0, 7),
        ];

        let batch = time_adjusted_market_index(&IndexBuilder::build(&transactions)).unwrap();
        let incremental = IncrementalTami::compute(&transactions).unwrap();

        assert_relative_eq!(incremental, batch, max_relative = 1e-9);
    }

    #[test]
    fn test_empty_input_has_no_value() {
        assert_eq!(IncrementalTami::compute(&[]), None);
        assert_eq!(IncrementalTami::new().value(), None);
    }

    #[test]
    fn test_single_item_tami_is_latest_price() {
        // One item: index equals its price, ratio is 1
        let transactions = vec![txn(1, 100.0, 0), txn(1, 250.0, 1), txn(1, 80.0, 2)];

        let tami = IncrementalTami::compute(&transactions).unwrap();

        assert_relative_eq!(tami, 80.0, max_relative = 1e-12);
    }

    #[test]
    fn test_streaming_updates() {
        let mut tami = IncrementalTami::new();
        assert_eq!(tami.value(), None);

        tami.update(&txn(1, 455.0, 0));
        assert_relative_eq!(tami.value().unwrap(), 455.0);

        tami.update(&txn(2, 126.0, 1));
        tami.update(&txn(2, 177.5, 2));
        assert_relative_eq!(tami.value().unwrap(), 672.8313253012049, max_relative = 1e-9);
    }
}
