//! # TAMI
//!
//! A Rust implementation of the Time-Adjusted Market Index: a single
//! comparable index value for a collection whose items trade irregularly and
//! at widely varying prices.
//!
//! Transactions flow through a pipeline of pure stages - chronological
//! ordering, two outlier filters, a trading-frequency validity filter - into
//! a chain-linked divisor index. The divisor absorbs basket composition
//! changes so the index never jumps just because a new item started trading;
//! per-item index ratios then weight the final index value into the TAMI
//! scalar. Every stage is exposed on its own, and an O(n) incremental
//! builder covers the hot path.
//!
//! ## Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use tami::calendar::FixedClock;
//! use tami::engine::{TamiCalculator, TamiConfig};
//! use tami::types::Transaction;
//!
//! let now = Utc::now();
//! let transactions = vec![
//!     Transaction::new(1, 455.0, now - Duration::days(300)),
//!     Transaction::new(2, 126.0, now - Duration::days(200)),
//!     Transaction::new(1, 470.0, now - Duration::days(60)),
//!     Transaction::new(2, 177.5, now - Duration::days(30)),
//! ];
//!
//! // Small history: leave the 50-sale probable-outlier window off
//! let config = TamiConfig {
//!     apply_probable_filter: false,
//!     ..TamiConfig::default()
//! };
//! let calculator = TamiCalculator::with_clock(config, Box::new(FixedClock::new(now))).unwrap();
//!
//! let value = calculator.compute(&transactions).unwrap();
//! assert!(value.is_some());
//! ```

pub mod calendar;
pub mod engine;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod types;

pub mod prelude {
    //! Commonly used types and functions
    pub use crate::calendar::{Clock, FixedClock, SystemClock};
    pub use crate::engine::{tami, TamiCalculator, TamiConfig, TamiReport};
    pub use crate::error::{Result, TamiError};
    pub use crate::index::{
        final_index_value, index_ratios, time_adjusted_market_index, IncrementalTami, IndexBuilder,
    };
    pub use crate::pipeline::{
        filter_extreme_outliers, filter_probable_outliers, filter_valid_transactions,
        sort_transactions,
    };
    pub use crate::types::{IndexRatioPoint, IndexValuePoint, ItemId, Price, Timestamp, Transaction};
}
