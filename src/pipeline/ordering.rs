//! Chronological ordering of transaction history

use crate::types::Transaction;
use rayon::slice::ParallelSliceMut;

/// Histories at least this long are sorted on the rayon thread pool
const PARALLEL_SORT_MIN_LEN: usize = 8192;

/// Sort transactions in chronological order
///
/// Returns a new vector; the input is left untouched. The sort is stable, so
/// transactions with equal timestamps keep their relative input order. Large
/// histories use rayon's stable parallel merge sort, which preserves the same
/// tie order as the sequential path.
pub fn sort_transactions(transactions: &[Transaction]) -> Vec<Transaction> {
    let mut sorted = transactions.to_vec();

    if sorted.len() >= PARALLEL_SORT_MIN_LEN {
        sorted.par_sort_by_key(|transaction| transaction.timestamp);
    } else {
        sorted.sort_by_key(|transaction| transaction.timestamp);
    }

    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn txn(item_id: u64, price: f64, offset_days: i64) -> Transaction {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Transaction::new(item_id, price, base + Duration::days(offset_days))
    }

    #[test]
    fn test_sorts_chronologically() {
        let transactions = vec![txn(1, 10.0, 5), txn(2, 20.0, 1), txn(3, 30.0, 3)];

        let sorted = sort_transactions(&transactions);

        let days: Vec<i64> = sorted
            .windows(2)
            .map(|w| (w[1].timestamp - w[0].timestamp).num_days())
            .collect();
        assert!(days.iter().all(|&d| d >= 0));
        assert_eq!(sorted[0].item_id, 2.into());
        assert_eq!(sorted[2].item_id, 1.into());
    }

    #[test]
    fn test_input_not_mutated() {
        let transactions = vec![txn(1, 10.0, 5), txn(2, 20.0, 1)];
        let before = transactions.clone();

        let _ = sort_transactions(&transactions);

        assert_eq!(transactions, before);
    }

    #[test]
    fn test_stable_on_tied_timestamps() {
        let transactions = vec![txn(1, 10.0, 2), txn(2, 20.0, 2), txn(3, 30.0, 2)];

        let sorted = sort_transactions(&transactions);

        // Equal timestamps keep input order
        assert_eq!(sorted[0].item_id, 1.into());
        assert_eq!(sorted[1].item_id, 2.into());
        assert_eq!(sorted[2].item_id, 3.into());
    }

    #[test]
    fn test_idempotent() {
        let transactions = vec![txn(1, 10.0, 5), txn(2, 20.0, 1), txn(3, 30.0, 1)];

        let once = sort_transactions(&transactions);
        let twice = sort_transactions(&once);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        assert!(sort_transactions(&[]).is_empty());
    }
}
