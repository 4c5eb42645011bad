//! Validity filter - trading-frequency eligibility
//!
//! Items that trade too rarely carry no reliable price signal. An item is
//! valid once it shows at least `min_sales` sales inside the trailing
//! validity window, at least one of which also falls inside the shorter
//! recency window. Valid items keep their entire sale history, including
//! sales older than the window; items that never qualify are removed
//! entirely.

use crate::calendar::months_before;
use crate::error::{Result, TamiError};
use crate::types::{ItemId, Timestamp, Transaction};
use hashbrown::HashMap;

/// Trailing window in which an item must have sold to be eligible
pub const DEFAULT_WINDOW_MONTHS: u32 = 12;
/// Shorter window in which at least one counted sale must fall
pub const DEFAULT_RECENCY_MONTHS: u32 = 6;
/// Minimum sales inside the validity window
pub const DEFAULT_MIN_SALES: u32 = 2;

/// Per-item counters for one filter pass
#[derive(Debug, Default)]
struct SaleRecord {
    window_sales: u32,
    has_recent_sale: bool,
    is_valid: bool,
}

/// Filters out items whose trading history is too sparse
#[derive(Debug, Clone)]
pub struct ValidityFilter {
    window_months: u32,
    recency_months: u32,
    min_sales: u32,
}

impl ValidityFilter {
    /// Create a filter with custom windows
    ///
    /// `recency_months` must not exceed `window_months`, and both windows and
    /// the sale minimum must be nonzero.
    pub fn new(window_months: u32, recency_months: u32, min_sales: u32) -> Result<Self> {
        if window_months == 0 || recency_months == 0 {
            return Err(TamiError::InvalidConfig(
                "validity windows must be at least one month".to_string(),
            ));
        }
        if recency_months > window_months {
            return Err(TamiError::InvalidConfig(format!(
                "recency window ({} months) cannot exceed validity window ({} months)",
                recency_months, window_months
            )));
        }
        if min_sales == 0 {
            return Err(TamiError::InvalidConfig(
                "min_sales must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            window_months,
            recency_months,
            min_sales,
        })
    }

    /// Keep only transactions of items valid at the reference instant `now`
    ///
    /// Single left-to-right pass; the input should already be in
    /// chronological order, as sale counts are accumulated in sequence.
    pub fn filter(&self, transactions: &[Transaction], now: Timestamp) -> Vec<Transaction> {
        let window_start = months_before(now, self.window_months);
        let recency_start = months_before(now, self.recency_months);

        let mut records: HashMap<ItemId, SaleRecord> = HashMap::new();

        for transaction in transactions {
            let record = records.entry(transaction.item_id.clone()).or_default();

            if record.is_valid {
                continue;
            }

            // Sales outside the validity window never count
            if transaction.timestamp <= window_start {
                continue;
            }

            record.window_sales += 1;

            if transaction.timestamp <= recency_start {
                continue;
            }

            record.has_recent_sale = true;

            if record.window_sales >= self.min_sales {
                record.is_valid = true;
            }
        }

        transactions
            .iter()
            .filter(|transaction| {
                records
                    .get(&transaction.item_id)
                    .map(|record| record.is_valid)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }
}

impl Default for ValidityFilter {
    fn default() -> Self {
        Self {
            window_months: DEFAULT_WINDOW_MONTHS,
            recency_months: DEFAULT_RECENCY_MONTHS,
            min_sales: DEFAULT_MIN_SALES,
        }
    }
}

/// Filter with the standard windows: 2 sales in the last year, one of them
/// in the last 6 months
pub fn filter_valid_transactions(
    transactions: &[Transaction],
    now: Timestamp,
) -> Vec<Transaction> {
    ValidityFilter::default().filter(transactions, now)
}
