//! Pipeline composition engine
//!
//! Wires the stages together in the canonical order (sort, extreme outliers,
//! validity, probable outliers, index) behind a validated configuration and
//! an injected clock. Every stage remains independently callable; the engine
//! is for callers that want the whole pipeline with one call and per-stage
//! visibility through [`TamiReport`].

use crate::calendar::{Clock, SystemClock};
use crate::error::{Result, TamiError};
use crate::index::{IncrementalTami, IndexBuilder};
use crate::index::ratios::{final_index_value, index_ratios, time_adjusted_market_index};
use crate::pipeline::ordering::sort_transactions;
use crate::pipeline::outliers::{
    ExtremeOutlierFilter, ProbableOutlierFilter, EXTREME_CUTOFF_RATIO, EXTREME_MIN_SAMPLE_SIZE,
    PROBABLE_LOWER_BAND, PROBABLE_TRUNCATION, PROBABLE_UPPER_BAND, PROBABLE_WINDOW_SIZE,
};
use crate::pipeline::validity::{
    ValidityFilter, DEFAULT_MIN_SALES, DEFAULT_RECENCY_MONTHS, DEFAULT_WINDOW_MONTHS,
};
use crate::types::{IndexRatioPoint, IndexValuePoint, Transaction};
use serde::{Deserialize, Serialize};

/// Tunable parameters for a full pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TamiConfig {
    /// Samples required before the extreme-outlier filter activates
    pub extreme_min_sample_size: usize,
    /// Extreme-outlier cutoff as a fraction of the trailing mean
    pub extreme_cutoff_ratio: f64,
    /// Probable-outlier window length
    pub probable_window: usize,
    /// Values trimmed from each end of the probable-outlier window
    pub probable_truncation: usize,
    /// Lower probable-outlier band as a fraction of the window average
    pub probable_lower_band: f64,
    /// Upper probable-outlier band as a fraction of the window average
    pub probable_upper_band: f64,
    /// Validity window in months
    pub validity_window_months: u32,
    /// Recency window in months
    pub recency_window_months: u32,
    /// Minimum sales inside the validity window
    pub min_sales: u32,
    /// Whether the probable-outlier stage runs at all
    pub apply_probable_filter: bool,
}

impl Default for TamiConfig {
    fn default() -> Self {
        Self {
            extreme_min_sample_size: EXTREME_MIN_SAMPLE_SIZE,
            extreme_cutoff_ratio: EXTREME_CUTOFF_RATIO,
            probable_window: PROBABLE_WINDOW_SIZE,
            probable_truncation: PROBABLE_TRUNCATION,
            probable_lower_band: PROBABLE_LOWER_BAND,
            probable_upper_band: PROBABLE_UPPER_BAND,
            validity_window_months: DEFAULT_WINDOW_MONTHS,
            recency_window_months: DEFAULT_RECENCY_MONTHS,
            min_sales: DEFAULT_MIN_SALES,
            apply_probable_filter: true,
        }
    }
}

/// Everything one pipeline run produced, stage by stage
#[derive(Debug, Clone, Serialize)]
pub struct TamiReport {
    pub input_count: usize,
    pub retained_after_extreme: usize,
    pub retained_after_validity: usize,
    pub retained_after_probable: usize,
    pub history: Vec<IndexValuePoint>,
    pub index_ratios: Vec<IndexRatioPoint>,
    pub index_value: Option<f64>,
    pub tami: Option<f64>,
}

/// Composes the pipeline stages into a single TAMI computation
pub struct TamiCalculator {
    extreme: ExtremeOutlierFilter,
    probable: ProbableOutlierFilter,
    validity: ValidityFilter,
    apply_probable_filter: bool,
    clock: Box<dyn Clock>,
}

impl TamiCalculator {
    /// Create a calculator from a validated configuration, reading "now" from
    /// the system clock
    pub fn new(config: TamiConfig) -> Result<Self> {
        Self::with_clock(config, Box::new(SystemClock))
    }

    /// Create a calculator with an explicit clock, for reproducible runs
    pub fn with_clock(config: TamiConfig, clock: Box<dyn Clock>) -> Result<Self> {
        Ok(Self {
            extreme: ExtremeOutlierFilter::new(
                config.extreme_min_sample_size,
                config.extreme_cutoff_ratio,
            )?,
            probable: ProbableOutlierFilter::new(
                config.probable_window,
                config.probable_truncation,
                config.probable_lower_band,
                config.probable_upper_band,
            )?,
            validity: ValidityFilter::new(
                config.validity_window_months,
                config.recency_window_months,
                config.min_sales,
            )?,
            apply_probable_filter: config.apply_probable_filter,
            clock,
        })
    }

    /// Compute the TAMI through the batch pipeline
    ///
    /// `Ok(None)` means no eligible transactions survived filtering - an
    /// index of zero would be a different statement entirely.
    pub fn compute(&self, transactions: &[Transaction]) -> Result<Option<f64>> {
        let eligible = self.run_filters(transactions)?;
        Ok(time_adjusted_market_index(&IndexBuilder::build(&eligible)))
    }

    /// Compute the TAMI through the single-pass incremental builder
    pub fn compute_incremental(&self, transactions: &[Transaction]) -> Result<Option<f64>> {
        let eligible = self.run_filters(transactions)?;
        Ok(IncrementalTami::compute(&eligible))
    }

    /// Run the full pipeline and keep every intermediate product
    pub fn report(&self, transactions: &[Transaction]) -> Result<TamiReport> {
        validate_input(transactions)?;

        log::info!("Computing TAMI over {} transactions", transactions.len());

        let sorted = sort_transactions(transactions);

        let after_extreme = self.extreme.filter(&sorted);
        log::debug!(
            "Extreme-outlier filter retained {} of {}",
            after_extreme.len(),
            sorted.len()
        );

        let after_validity = self.validity.filter(&after_extreme, self.clock.now());
        log::debug!(
            "Validity filter retained {} of {}",
            after_validity.len(),
            after_extreme.len()
        );

        let eligible = if self.apply_probable_filter {
            let after_probable = self.probable.filter(&after_validity);
            log::debug!(
                "Probable-outlier filter retained {} of {}",
                after_probable.len(),
                after_validity.len()
            );
            after_probable
        } else {
            after_validity.clone()
        };

        let history = IndexBuilder::build(&eligible);
        let ratios = index_ratios(&history);
        let index_value = final_index_value(&history);
        let tami = time_adjusted_market_index(&history);

        match tami {
            Some(value) => log::info!("TAMI: {:.4} over {} items", value, ratios.len()),
            None => log::info!("No eligible transactions; TAMI has no value"),
        }

        Ok(TamiReport {
            input_count: transactions.len(),
            retained_after_extreme: after_extreme.len(),
            retained_after_validity: after_validity.len(),
            retained_after_probable: eligible.len(),
            history,
            index_ratios: ratios,
            index_value,
            tami,
        })
    }

    fn run_filters(&self, transactions: &[Transaction]) -> Result<Vec<Transaction>> {
        validate_input(transactions)?;

        let sorted = sort_transactions(transactions);
        let after_extreme = self.extreme.filter(&sorted);
        let after_validity = self.validity.filter(&after_extreme, self.clock.now());

        if self.apply_probable_filter {
            Ok(self.probable.filter(&after_validity))
        } else {
            Ok(after_validity)
        }
    }
}

impl Default for TamiCalculator {
    fn default() -> Self {
        Self {
            extreme: ExtremeOutlierFilter::default(),
            probable: ProbableOutlierFilter::default(),
            validity: ValidityFilter::default(),
            apply_probable_filter: true,
            clock: Box::new(SystemClock),
        }
    }
}

/// Compute the TAMI with the standard configuration and the system clock
pub fn tami(transactions: &[Transaction]) -> Result<Option<f64>> {
    TamiCalculator::default().compute(transactions)
}

fn validate_input(transactions: &[Transaction]) -> Result<()> {
    for transaction in transactions {
        if !transaction.has_valid_price() {
            return Err(TamiError::InvalidTransaction {
                item_id: transaction.item_id.to_string(),
                reason: format!("price {} is not a positive finite number", transaction.price),
            });
        }
    }
    Ok(())
}
