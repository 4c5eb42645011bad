//! Chain-linked divisor index builder
//!
//! Publishes a market index value after every sale. The index is the mean of
//! each item's most recent price, scaled by a running divisor. When an item
//! sells for the first time the basket's composition changes, and the divisor
//! is re-derived so the published value is identical immediately before and
//! after the inclusion: all index movement comes from price changes, never
//! from membership changes.

use crate::types::{IndexValuePoint, ItemId, Price, Transaction};
use hashbrown::HashMap;

/// Streaming builder for the index value history
///
/// Feed transactions in chronological order through [`update`], or build a
/// whole history at once with [`build`]. State is transient: one builder per
/// index-construction pass, discarded afterwards.
///
/// [`update`]: IndexBuilder::update
/// [`build`]: IndexBuilder::build
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    /// Latest sale price per item seen so far
    last_sales: HashMap<ItemId, Price>,
    divisor: f64,
    previous_index_value: f64,
    processed: usize,
}

impl IndexBuilder {
    /// Create a builder with an empty basket and divisor 1
    pub fn new() -> Self {
        Self {
            last_sales: HashMap::new(),
            divisor: 1.0,
            previous_index_value: 0.0,
            processed: 0,
        }
    }

    /// Process one sale and return the index value at that moment
    pub fn update(&mut self, transaction: &Transaction) -> IndexValuePoint {
        let is_first_sale = !self.last_sales.contains_key(&transaction.item_id);

        self.last_sales
            .insert(transaction.item_id.clone(), transaction.price);

        let item_count = self.last_sales.len() as f64;
        let total: f64 = self.last_sales.values().sum();
        let raw_index = total / (item_count * self.divisor);

        let index_value = if self.processed == 0 {
            raw_index
        } else if is_first_sale {
            // Composition change: fold the jump into the divisor so the
            // published value carries straight through the inclusion
            self.divisor *= raw_index / self.previous_index_value;
            total / (item_count * self.divisor)
        } else {
            raw_index
        };

        self.previous_index_value = index_value;
        self.processed += 1;

        IndexValuePoint {
            item_id: transaction.item_id.clone(),
            price: transaction.price,
            index_value,
            transaction: transaction.clone(),
        }
    }

    /// Number of distinct items in the basket
    pub fn item_count(&self) -> usize {
        self.last_sales.len()
    }

    /// Index value after the most recent sale, if any
    pub fn current(&self) -> Option<f64> {
        (self.processed > 0).then_some(self.previous_index_value)
    }

    /// Build the full index value history for an ordered, filtered sequence
    ///
    /// Output has the same length and order as the input; an empty input
    /// yields an empty history.
    pub fn build(transactions: &[Transaction]) -> Vec<IndexValuePoint> {
        let mut builder = Self::new();
        transactions
            .iter()
            .map(|transaction| builder.update(transaction))
            .collect()
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn txn(item_id: u64, price: f64, offset_hours: i64) -> Transaction {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Transaction::new(item_id, price, base + Duration::hours(offset_hours))
    }

    #[test]
    fn test_golden_history() {
        let transactions = vec![txn(1, 455.0, 0), txn(2, 126.0, 1), txn(2, 177.5, 2)];

        let history = IndexBuilder::build(&transactions);

        assert_eq!(history.len(), 3);
        assert_relative_eq!(history[0].index_value, 455.0);
        assert_relative_eq!(history[1].index_value, 455.00000000000006);
        assert_relative_eq!(history[2].index_value, 495.33132530120486);
    }

    #[test]
    fn test_single_item_tracks_latest_price() {
        // With one item the basket mean is the item itself and the divisor
        // never moves
        let transactions = vec![
            txn(1, 100.0, 0),
            txn(1, 150.0, 1),
            txn(1, 80.0, 2),
            txn(1, 123.45, 3),
        ];

        let history = IndexBuilder::build(&transactions);

        for point in &history {
            assert_relative_eq!(point.index_value, point.price);
        }
    }

    #[test]
    fn test_continuity_across_inclusions() {
        let transactions = vec![
            txn(1, 455.0, 0),
            txn(2, 126.0, 1),
            txn(1, 500.0, 2),
            txn(3, 1000.0, 3),
            txn(4, 12.0, 4),
            txn(2, 140.0, 5),
        ];

        let mut builder = IndexBuilder::new();
        let mut previous: Option<f64> = None;

        for transaction in &transactions {
            let first_sale = !builder.last_sales.contains_key(&transaction.item_id);
            let point = builder.update(transaction);

            if let (true, Some(prev)) = (first_sale, previous) {
                // A new item's first sale must not move the index
                assert_relative_eq!(point.index_value, prev, max_relative = 1e-12);
            }

            previous = Some(point.index_value);
        }
    }

    #[test]
    fn test_repeat_sales_move_the_index() {
        let transactions = vec![txn(1, 100.0, 0), txn(2, 100.0, 1), txn(1, 200.0, 2)];

        let history = IndexBuilder::build(&transactions);

        // Item 1 doubling lifts the two-item index by half
        assert_relative_eq!(history[2].index_value, 150.0, max_relative = 1e-12);
    }

    #[test]
    fn test_empty_input() {
        assert!(IndexBuilder::build(&[]).is_empty());
        assert_eq!(IndexBuilder::new().current(), None);
    }

    #[test]
    fn test_streaming_matches_batch() {
        let transactions = vec![
            txn(1, 455.0, 0),
            txn(2, 126.0, 1),
            txn(2, 177.5, 2),
            txn(3, 300.0, 3),
        ];

        let batch = IndexBuilder::build(&transactions);

        let mut builder = IndexBuilder::new();
        let streamed: Vec<_> = transactions.iter().map(|t| builder.update(t)).collect();

        assert_eq!(batch, streamed);
        assert_eq!(builder.item_count(), 3);
        assert_eq!(builder.current(), Some(batch[3].index_value));
    }
}
