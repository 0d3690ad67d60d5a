//! Signals describing one transaction relative to its own peer group.

use serde::Serialize;

use crate::features::amount::AmountFeatures;
use crate::features::cadence::{Cadence, day_of_month_distance, days_between};
use crate::features::grouping::PeerGroup;
use crate::features::policy::{CadenceWindow, FeaturePolicy};
use crate::features::stats::{fraction, ratio_or_zero};
use crate::transaction::Transaction;

/// Cadences checked by the days-apart counters.
pub const DAYS_APART_CADENCES: [Cadence; 3] = [Cadence::Weekly, Cadence::Biweekly, Cadence::Monthly];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DaysApart {
    pub count: usize,
    pub share: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryFeatures {
    pub n_same_amount: usize,
    pub pct_same_amount: f64,
    /// Peers within `similar_amount_tolerance` of this amount, relatively.
    pub n_similar_amount: usize,
    pub pct_similar_amount: f64,
    /// Indexed like `DAYS_APART_CADENCES`.
    pub days_apart: [DaysApart; 3],
    pub n_same_day_of_month: usize,
    pub pct_same_day_of_month: f64,
    pub amount_z_score: f64,
    pub ends_in_99: bool,
    pub amount_consistency: f64,
    pub days_since_previous: i64,
    pub days_until_next: i64,
}

pub fn analyze(
    transaction: &Transaction,
    group: &PeerGroup<'_>,
    amounts: &AmountFeatures,
    policy: &FeaturePolicy,
) -> HistoryFeatures {
    let members = group.members();
    let total = members.len();

    let n_same_amount = members
        .iter()
        .filter(|peer| peer.amount.to_bits() == transaction.amount.to_bits())
        .count();
    let n_similar_amount = members
        .iter()
        .filter(|peer| {
            ratio_or_zero((peer.amount - transaction.amount).abs(), transaction.amount)
                <= policy.similar_amount_tolerance
        })
        .count();

    let days_apart = DAYS_APART_CADENCES.map(|cadence| {
        let count = policy
            .window(cadence)
            .map(|window| count_days_apart(transaction, members, window))
            .unwrap_or(0);
        DaysApart {
            count,
            share: fraction(count, total),
        }
    });

    let n_same_day_of_month = members
        .iter()
        .filter(|peer| {
            day_of_month_distance(peer.date, transaction.date) <= policy.same_day_tolerance
        })
        .count();

    HistoryFeatures {
        n_same_amount,
        pct_same_amount: fraction(n_same_amount, total),
        n_similar_amount,
        pct_similar_amount: fraction(n_similar_amount, total),
        days_apart,
        n_same_day_of_month,
        pct_same_day_of_month: fraction(n_same_day_of_month, total),
        amount_z_score: ratio_or_zero(transaction.amount - amounts.mean_amount, amounts.stdev_amount),
        ends_in_99: ends_in_99(transaction.amount),
        amount_consistency: amount_consistency(members, amounts.mean_amount, policy),
        days_since_previous: group
            .previous()
            .map(|previous| days_between(previous.date, transaction.date))
            .unwrap_or(0),
        days_until_next: group
            .next()
            .map(|next| days_between(transaction.date, next.date))
            .unwrap_or(0),
    }
}

/// Peers whose distance from `transaction` is within tolerance of a whole
/// number of periods. Distances shorter than one period minus tolerance
/// (including the transaction itself) never count.
fn count_days_apart(transaction: &Transaction, members: &[&Transaction], window: CadenceWindow) -> usize {
    let period = window.period_days;
    let tolerance = window.tolerance_days;
    members
        .iter()
        .filter(|peer| {
            let distance = days_between(transaction.date, peer.date).abs();
            if distance < period - tolerance {
                return false;
            }
            let remainder = distance % period;
            remainder <= tolerance || remainder >= period - tolerance
        })
        .count()
}

fn ends_in_99(amount: f64) -> bool {
    let cents = (amount * 100.0).round() as i64;
    cents % 100 == 99
}

/// Share of amounts close to the group mean, by absolute or relative
/// tolerance. Needs at least two amounts to say anything.
fn amount_consistency(members: &[&Transaction], mean_amount: f64, policy: &FeaturePolicy) -> f64 {
    if members.len() < 2 || mean_amount <= 0.0 {
        return 0.0;
    }
    let consistent = members
        .iter()
        .filter(|peer| {
            let difference = (peer.amount - mean_amount).abs();
            difference <= policy.consistency_abs_tolerance
                || difference / mean_amount <= policy.consistency_rel_tolerance
        })
        .count();
    fraction(consistent, members.len())
}
