use std::collections::BTreeMap;

use serde::Serialize;

use crate::features::amount::AmountFeatures;
use crate::features::cadence::Cadence;
use crate::features::grouping::PeerGroup;
use crate::features::history::HistoryFeatures;
use crate::features::interval::IntervalFeatures;
use crate::features::policy::FeaturePolicy;
use crate::features::stats::ratio_or_zero;
use crate::transaction::Transaction;

/// Every feature name, in the order `compose` emits them. Each vector carries
/// exactly this set; missing evidence is a 0.0 sentinel.
pub const FEATURE_NAMES: [&str; 53] = [
    "peer_group_size",
    "position_in_group",
    "is_first_in_group",
    "is_last_in_group",
    "is_middle_of_group",
    "n_intervals",
    "mean_interval_days",
    "stdev_interval_days",
    "interval_cv",
    "cadence_class_code",
    "cadence_confidence",
    "cadence_is_weekly",
    "cadence_is_biweekly",
    "cadence_is_monthly",
    "cadence_is_quarterly",
    "cadence_is_annual",
    "cadence_is_irregular",
    "cadence_is_insufficient",
    "modal_gap_days",
    "interval_consistency",
    "mean_month_interval",
    "n_missed_months",
    "amount",
    "mean_amount",
    "stdev_amount",
    "amount_cv",
    "min_amount",
    "max_amount",
    "amount_spread_ratio",
    "is_amount_stable",
    "amount_to_mean_ratio",
    "amount_z_score",
    "amount_consistency",
    "ends_in_99",
    "n_same_amount",
    "pct_same_amount",
    "n_similar_amount",
    "pct_similar_amount",
    "n_days_apart_weekly",
    "pct_days_apart_weekly",
    "n_days_apart_biweekly",
    "pct_days_apart_biweekly",
    "n_days_apart_monthly",
    "pct_days_apart_monthly",
    "n_same_day_of_month",
    "pct_same_day_of_month",
    "days_since_previous",
    "days_until_next",
    "looks_recurring",
    "is_monthly_with_missing",
    "same_amount_known_interval",
    "has_history",
    "group_span_days",
];

/// Fixed-shape mapping from feature name to value for one transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector(BTreeMap<&'static str, f64>);

impl FeatureVector {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn flag(&self, name: &str) -> bool {
        self.get(name).is_some_and(|value| value != 0.0)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.0.iter().map(|(name, value)| (*name, *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Regular cadence seen often enough, with stable amounts.
pub fn looks_recurring(interval: &IntervalFeatures, amount: &AmountFeatures, policy: &FeaturePolicy) -> bool {
    interval.cadence.is_regular()
        && policy.passes_confidence_gate(interval.cadence_confidence)
        && amount.is_amount_stable
}

/// Calendar-month gaps (missed months allowed) with a narrow amount range.
pub fn is_monthly_with_missing(
    interval: &IntervalFeatures,
    amount: &AmountFeatures,
    policy: &FeaturePolicy,
) -> bool {
    interval.months_aligned && amount.amount_spread_ratio <= policy.monthly_amount_spread
}

/// One repeated amount with at least one gap in a known billing range.
pub fn same_amount_known_interval(
    interval: &IntervalFeatures,
    amount: &AmountFeatures,
    policy: &FeaturePolicy,
) -> bool {
    interval.hits_known_interval
        && amount.max_amount - amount.min_amount < policy.same_amount_abs_tolerance
}

/// The single place where interval, amount and history results are combined.
pub fn compose(
    transaction: &Transaction,
    group: &PeerGroup<'_>,
    interval: &IntervalFeatures,
    amount: &AmountFeatures,
    history: &HistoryFeatures,
    policy: &FeaturePolicy,
) -> FeatureVector {
    let is_first = group.is_first();
    let is_last = group.is_last();
    let span_days = match (group.members().first(), group.members().last()) {
        (Some(first), Some(last)) => (last.date - first.date).num_days(),
        _ => 0,
    };
    let [weekly, biweekly, monthly] = history.days_apart;
    let one_hot = |cadence: Cadence| flag(interval.cadence == cadence);

    let entries: [(&'static str, f64); FEATURE_NAMES.len()] = [
        ("peer_group_size", group.len() as f64),
        ("position_in_group", group.position() as f64),
        ("is_first_in_group", flag(is_first)),
        ("is_last_in_group", flag(is_last)),
        ("is_middle_of_group", flag(!is_first && !is_last)),
        ("n_intervals", interval.n_intervals as f64),
        ("mean_interval_days", interval.mean_interval_days),
        ("stdev_interval_days", interval.stdev_interval_days),
        ("interval_cv", interval.interval_cv),
        ("cadence_class_code", f64::from(interval.cadence.code())),
        ("cadence_confidence", interval.cadence_confidence),
        (Cadence::Weekly.feature_name(), one_hot(Cadence::Weekly)),
        (Cadence::Biweekly.feature_name(), one_hot(Cadence::Biweekly)),
        (Cadence::Monthly.feature_name(), one_hot(Cadence::Monthly)),
        (Cadence::Quarterly.feature_name(), one_hot(Cadence::Quarterly)),
        (Cadence::Annual.feature_name(), one_hot(Cadence::Annual)),
        (Cadence::Irregular.feature_name(), one_hot(Cadence::Irregular)),
        (Cadence::Insufficient.feature_name(), one_hot(Cadence::Insufficient)),
        ("modal_gap_days", interval.modal_gap_days as f64),
        ("interval_consistency", interval.interval_consistency),
        ("mean_month_interval", interval.mean_month_interval),
        ("n_missed_months", interval.n_missed_months as f64),
        ("amount", transaction.amount),
        ("mean_amount", amount.mean_amount),
        ("stdev_amount", amount.stdev_amount),
        ("amount_cv", amount.amount_cv),
        ("min_amount", amount.min_amount),
        ("max_amount", amount.max_amount),
        ("amount_spread_ratio", amount.amount_spread_ratio),
        ("is_amount_stable", flag(amount.is_amount_stable)),
        (
            "amount_to_mean_ratio",
            ratio_or_zero(transaction.amount, amount.mean_amount),
        ),
        ("amount_z_score", history.amount_z_score),
        ("amount_consistency", history.amount_consistency),
        ("ends_in_99", flag(history.ends_in_99)),
        ("n_same_amount", history.n_same_amount as f64),
        ("pct_same_amount", history.pct_same_amount),
        ("n_similar_amount", history.n_similar_amount as f64),
        ("pct_similar_amount", history.pct_similar_amount),
        ("n_days_apart_weekly", weekly.count as f64),
        ("pct_days_apart_weekly", weekly.share),
        ("n_days_apart_biweekly", biweekly.count as f64),
        ("pct_days_apart_biweekly", biweekly.share),
        ("n_days_apart_monthly", monthly.count as f64),
        ("pct_days_apart_monthly", monthly.share),
        ("n_same_day_of_month", history.n_same_day_of_month as f64),
        ("pct_same_day_of_month", history.pct_same_day_of_month),
        ("days_since_previous", history.days_since_previous as f64),
        ("days_until_next", history.days_until_next as f64),
        ("looks_recurring", flag(looks_recurring(interval, amount, policy))),
        (
            "is_monthly_with_missing",
            flag(is_monthly_with_missing(interval, amount, policy)),
        ),
        (
            "same_amount_known_interval",
            flag(same_amount_known_interval(interval, amount, policy)),
        ),
        ("has_history", flag(group.len() > 1)),
        ("group_span_days", span_days as f64),
    ];

    FeatureVector(entries.into_iter().collect())
}
