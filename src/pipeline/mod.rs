//! Transaction pipeline stages
//!
//! Each stage is a pure transformation over an ordered transaction sequence:
//! chronological ordering, the two outlier filters, and the trading-frequency
//! validity filter. Stages are independently callable and compose left to
//! right; the engine wires them together in the canonical order.

pub mod ordering;
pub mod outliers;
pub mod validity;

pub use ordering::sort_transactions;
pub use outliers::{
    filter_extreme_outliers, filter_probable_outliers, ExtremeOutlierFilter,
    ProbableOutlierFilter, TruncatedMovingAverage,
};
pub use validity::{filter_valid_transactions, ValidityFilter};
