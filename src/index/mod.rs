//! Chain-linked divisor index construction
//!
//! The heart of the library. `builder` produces the per-transaction index
//! value history, `ratios` reduces it to per-item index ratios and the TAMI
//! scalar, and `incremental` folds all of it into one O(n) pass.

pub mod builder;
pub mod incremental;
pub mod ratios;

pub use builder::IndexBuilder;
pub use incremental::IncrementalTami;
pub use ratios::{final_index_value, index_ratios, time_adjusted_market_index};
