//! Index ratios and TAMI aggregation
//!
//! Reduces an index value history to one record per item (its most recent
//! sale), tags each with its index ratio, and folds ratios into the final
//! Time-Adjusted Market Index scalar.

use crate::types::{IndexRatioPoint, IndexValuePoint, ItemId};
use hashbrown::HashMap;

/// Index ratio for each item's most recent sale
///
/// Later history entries replace earlier ones for the same item; output is in
/// first-seen item order, not chronological order. `index_ratio` is the
/// item's price divided by the index value at that sale.
pub fn index_ratios(history: &[IndexValuePoint]) -> Vec<IndexRatioPoint> {
    let mut positions: HashMap<ItemId, usize> = HashMap::new();
    let mut last_points: Vec<&IndexValuePoint> = Vec::new();

    for point in history {
        match positions.get(&point.item_id) {
            Some(&position) => last_points[position] = point,
            None => {
                positions.insert(point.item_id.clone(), last_points.len());
                last_points.push(point);
            }
        }
    }

    last_points
        .into_iter()
        .map(|point| IndexRatioPoint {
            item_id: point.item_id.clone(),
            price: point.price,
            index_value: point.index_value,
            index_ratio: point.price / point.index_value,
            transaction: point.transaction.clone(),
        })
        .collect()
}

/// Index value after the last sale in the history
pub fn final_index_value(history: &[IndexValuePoint]) -> Option<f64> {
    history.last().map(|point| point.index_value)
}

/// Time-Adjusted Market Index over a full index value history
///
/// Each item contributes `final_index_value * index_ratio`; the TAMI is the
/// sum of those time-adjusted values. `None` when the history is empty -
/// "no index could be computed" is distinct from an index of zero.
pub fn time_adjusted_market_index(history: &[IndexValuePoint]) -> Option<f64> {
    let final_value = final_index_value(history)?;

    let tami = index_ratios(history)
        .iter()
        .map(|point| final_value * point.index_ratio)
        .sum();

    Some(tami)
}
