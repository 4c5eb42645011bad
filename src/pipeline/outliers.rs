//! Outlier filters for sale histories
//!
//! Two independent policies. The extreme filter drops sales priced far below
//! the average of everything seen before them, suppressing wash trades and
//! zero-value artifacts against a global baseline. The probable filter drops
//! sales outside a band around a short trailing window average, catching
//! less extreme but still implausible prices against a local baseline.
//!
//! Both filters are order-dependent: every decision is made against the
//! transactions preceding it, and running statistics are fed by every
//! observed transaction whether or not it is retained.

use crate::error::{Result, TamiError};
use crate::types::Transaction;
use statrs::statistics::{Data, Distribution};
use std::collections::VecDeque;

/// Samples required before the extreme filter starts judging outliers
pub const EXTREME_MIN_SAMPLE_SIZE: usize = 100;
/// Fraction of the trailing mean below which a sale is an extreme outlier
pub const EXTREME_CUTOFF_RATIO: f64 = 0.05;

/// Trailing window length for the probable-outlier average
pub const PROBABLE_WINDOW_SIZE: usize = 50;
/// Values trimmed from each end of the window before averaging
pub const PROBABLE_TRUNCATION: usize = 3;
/// Lower acceptance band as a fraction of the window average
pub const PROBABLE_LOWER_BAND: f64 = 0.65;
/// Upper acceptance band as a fraction of the window average
pub const PROBABLE_UPPER_BAND: f64 = 1.75;

/// Drops sales priced far below the trailing average
#[derive(Debug, Clone)]
pub struct ExtremeOutlierFilter {
    min_sample_size: usize,
    cutoff_ratio: f64,
}

impl ExtremeOutlierFilter {
    /// Create a filter with a custom sample minimum and cutoff ratio
    pub fn new(min_sample_size: usize, cutoff_ratio: f64) -> Result<Self> {
        if min_sample_size == 0 {
            return Err(TamiError::InvalidConfig(
                "min_sample_size must be at least 1".to_string(),
            ));
        }
        if cutoff_ratio <= 0.0 || cutoff_ratio >= 1.0 {
            return Err(TamiError::InvalidConfig(format!(
                "cutoff_ratio must be in (0, 1), got {}",
                cutoff_ratio
            )));
        }

        Ok(Self {
            min_sample_size,
            cutoff_ratio,
        })
    }

    /// Drop transactions priced at or below `cutoff_ratio` times the mean of
    /// all preceding transactions
    ///
    /// Until `min_sample_size` transactions have been observed there is not
    /// enough signal to judge outliers, so everything passes through; inputs
    /// no longer than the minimum come back unchanged. The running mean is
    /// taken over the full antecedent history, dropped transactions
    /// included, so one rejection cannot shift the baseline for later
    /// decisions.
    pub fn filter(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        let mut kept = Vec::with_capacity(transactions.len());
        let mut running_sum = 0.0;
        let mut observed = 0usize;

        for transaction in transactions {
            if observed < self.min_sample_size {
                kept.push(transaction.clone());
            } else {
                let cutoff = self.cutoff_ratio * (running_sum / observed as f64);
                if transaction.price > cutoff {
                    kept.push(transaction.clone());
                }
            }

            running_sum += transaction.price;
            observed += 1;
        }

        kept
    }
}

impl Default for ExtremeOutlierFilter {
    fn default() -> Self {
        Self {
            min_sample_size: EXTREME_MIN_SAMPLE_SIZE,
            cutoff_ratio: EXTREME_CUTOFF_RATIO,
        }
    }
}

/// Filter with the standard policy: 5% of the trailing mean after 100 samples
pub fn filter_extreme_outliers(transactions: &[Transaction]) -> Vec<Transaction> {
    ExtremeOutlierFilter::default().filter(transactions)
}

/// Truncated (robust) moving average
///
/// A plain moving average is itself sensitive to the outliers it is supposed
/// to expose, so the highest and lowest `truncation` values of each window
/// are discarded before averaging. Truncation 0 yields the plain SMA.
#[derive(Debug, Clone)]
pub struct TruncatedMovingAverage {
    window: usize,
    truncation: usize,
    values: VecDeque<f64>,
}

impl TruncatedMovingAverage {
    /// Create a new average over `window` values, trimming `truncation` from
    /// each end
    pub fn new(window: usize, truncation: usize) -> Result<Self> {
        if window == 0 {
            return Err(TamiError::InvalidConfig(
                "window size must be greater than 0".to_string(),
            ));
        }
        if truncation * 2 >= window {
            return Err(TamiError::InvalidConfig(format!(
                "truncation {} leaves no values in a window of {}",
                truncation, window
            )));
        }

        Ok(Self {
            window,
            truncation,
            values: VecDeque::with_capacity(window),
        })
    }

    /// Add a value and return the updated average
    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);

        if self.values.len() > self.window {
            self.values.pop_front();
        }

        self.current()
    }

    /// Get current value (if the window is full)
    pub fn current(&self) -> Option<f64> {
        if self.values.len() < self.window {
            return None;
        }

        let mut sorted: Vec<f64> = self.values.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let trimmed = sorted[self.truncation..sorted.len() - self.truncation].to_vec();
        Data::new(trimmed).mean()
    }

    /// Compute the average series for a slice of values
    pub fn compute(window: usize, truncation: usize, values: &[f64]) -> Result<Vec<Option<f64>>> {
        let mut average = Self::new(window, truncation)?;
        Ok(values.iter().map(|&v| average.update(v)).collect())
    }
}

/// Drops sales outside a band around a trailing window average
#[derive(Debug, Clone)]
pub struct ProbableOutlierFilter {
    window: usize,
    truncation: usize,
    lower_band: f64,
    upper_band: f64,
}

impl ProbableOutlierFilter {
    /// Create a filter with custom window and band parameters
    pub fn new(window: usize, truncation: usize, lower_band: f64, upper_band: f64) -> Result<Self> {
        if lower_band <= 0.0 || lower_band >= upper_band {
            return Err(TamiError::InvalidConfig(format!(
                "bands must satisfy 0 < lower < upper, got {} and {}",
                lower_band, upper_band
            )));
        }
        // Window/truncation checks live with the accumulator
        TruncatedMovingAverage::new(window, truncation)?;

        Ok(Self {
            window,
            truncation,
            lower_band,
            upper_band,
        })
    }

    /// Keep transactions priced strictly inside the band around the average
    /// of the preceding window
    ///
    /// The window is fed by every transaction in sequence, retained or not.
    /// Output only starts once the window has filled: the first `window`
    /// transactions have no baseline and are dropped from this stage.
    pub fn filter(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        // Parameters were validated at construction
        let mut average = TruncatedMovingAverage {
            window: self.window,
            truncation: self.truncation,
            values: VecDeque::with_capacity(self.window),
        };

        let mut kept = Vec::new();

        for transaction in transactions {
            if let Some(mean) = average.current() {
                let lower = self.lower_band * mean;
                let upper = self.upper_band * mean;

                if transaction.price > lower && transaction.price < upper {
                    kept.push(transaction.clone());
                }
            }

            average.update(transaction.price);
        }

        kept
    }
}

impl Default for ProbableOutlierFilter {
    fn default() -> Self {
        Self {
            window: PROBABLE_WINDOW_SIZE,
            truncation: PROBABLE_TRUNCATION,
            lower_band: PROBABLE_LOWER_BAND,
            upper_band: PROBABLE_UPPER_BAND,
        }
    }
}

/// Filter with the standard policy: 65%-175% band around a truncated
/// 50-sale moving average
pub fn filter_probable_outliers(transactions: &[Transaction]) -> Vec<Transaction> {
    ProbableOutlierFilter::default().filter(transactions)
}
