use serde::Serialize;

use crate::features::policy::FeaturePolicy;
use crate::features::stats::{mean, population_stdev, ratio_or_zero};
use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmountFeatures {
    pub mean_amount: f64,
    pub stdev_amount: f64,
    pub amount_cv: f64,
    pub is_amount_stable: bool,
    pub min_amount: f64,
    pub max_amount: f64,
    /// `(max - min) / mean`, 0 for a single amount.
    pub amount_spread_ratio: f64,
}

pub fn analyze(members: &[&Transaction], policy: &FeaturePolicy) -> AmountFeatures {
    let amounts = members.iter().map(|row| row.amount).collect::<Vec<f64>>();
    let Some(first) = amounts.first().copied() else {
        return AmountFeatures {
            mean_amount: 0.0,
            stdev_amount: 0.0,
            amount_cv: 0.0,
            is_amount_stable: true,
            min_amount: 0.0,
            max_amount: 0.0,
            amount_spread_ratio: 0.0,
        };
    };

    let all_identical = amounts
        .iter()
        .all(|amount| amount.to_bits() == first.to_bits());
    // Identical amounts have exactly zero spread; skip the summation noise.
    let (mean_amount, stdev_amount) = if all_identical {
        (first, 0.0)
    } else {
        let center = mean(&amounts);
        (center, population_stdev(&amounts, center))
    };
    let amount_cv = ratio_or_zero(stdev_amount, mean_amount);
    let min_amount = amounts.iter().copied().fold(f64::INFINITY, f64::min);
    let max_amount = amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    AmountFeatures {
        mean_amount,
        stdev_amount,
        amount_cv,
        is_amount_stable: all_identical || policy.is_stable_cv(amount_cv),
        min_amount,
        max_amount,
        amount_spread_ratio: ratio_or_zero(max_amount - min_amount, mean_amount),
    }
}
