use std::collections::BTreeMap;

use serde::Serialize;

use crate::features::cadence::{Cadence, days_between, months_between};
use crate::features::policy::FeaturePolicy;
use crate::features::stats::{fraction, mean, population_stdev, ratio_or_zero};
use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntervalFeatures {
    pub mean_interval_days: f64,
    pub stdev_interval_days: f64,
    pub interval_cv: f64,
    pub cadence: Cadence,
    pub cadence_confidence: f64,
    pub n_intervals: usize,
    /// Most frequent exact gap; ties go to the shorter gap.
    pub modal_gap_days: i64,
    /// Share of gaps near the modal gap, or 0 when the modal gap is not near
    /// any trusted billing interval.
    pub interval_consistency: f64,
    pub mean_month_interval: f64,
    /// Every calendar-month gap sits near a whole, non-zero number of months.
    pub months_aligned: bool,
    /// Months skipped between aligned payments; 0 unless `months_aligned`.
    pub n_missed_months: usize,
    /// Some gap falls in one of the policy's known billing ranges.
    pub hits_known_interval: bool,
}

impl IntervalFeatures {
    pub const INSUFFICIENT: IntervalFeatures = IntervalFeatures {
        mean_interval_days: 0.0,
        stdev_interval_days: 0.0,
        interval_cv: 0.0,
        cadence: Cadence::Insufficient,
        cadence_confidence: 0.0,
        n_intervals: 0,
        modal_gap_days: 0,
        interval_consistency: 0.0,
        mean_month_interval: 0.0,
        months_aligned: false,
        n_missed_months: 0,
        hits_known_interval: false,
    };
}

/// Day gaps between consecutive members of a date-ordered peer group.
pub fn gaps(members: &[&Transaction]) -> Vec<i64> {
    members
        .windows(2)
        .map(|pair| days_between(pair[0].date, pair[1].date))
        .collect()
}

pub fn analyze(members: &[&Transaction], policy: &FeaturePolicy) -> IntervalFeatures {
    let gaps = gaps(members);
    if gaps.is_empty() {
        return IntervalFeatures::INSUFFICIENT;
    }

    let (cadence, matching) = modal_cadence(&gaps, policy);
    let as_days = gaps.iter().map(|gap| *gap as f64).collect::<Vec<f64>>();
    let mean_interval_days = mean(&as_days);
    let stdev_interval_days = if gaps.len() > 1 {
        population_stdev(&as_days, mean_interval_days)
    } else {
        0.0
    };

    let modal_gap_days = modal_gap(&gaps);
    let month_gaps = members
        .windows(2)
        .map(|pair| months_between(pair[0].date, pair[1].date))
        .collect::<Vec<f64>>();
    let missed = missed_months(&month_gaps, policy.month_interval_tolerance);

    IntervalFeatures {
        mean_interval_days,
        stdev_interval_days,
        interval_cv: ratio_or_zero(stdev_interval_days, mean_interval_days),
        cadence,
        cadence_confidence: (matching as f64) / (gaps.len() as f64),
        n_intervals: gaps.len(),
        modal_gap_days,
        interval_consistency: interval_consistency(&gaps, modal_gap_days, policy),
        mean_month_interval: mean(&month_gaps),
        months_aligned: missed.is_some(),
        n_missed_months: missed.unwrap_or(0),
        hits_known_interval: gaps.iter().any(|gap| {
            policy
                .known_interval_ranges
                .iter()
                .any(|range| range.contains(*gap))
        }),
    }
}

fn modal_gap(gaps: &[i64]) -> i64 {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for gap in gaps {
        *counts.entry(*gap).or_default() += 1;
    }
    let mut best = (0, 0usize);
    // Ascending keys with a strict comparison keep the shorter gap on ties.
    for (gap, count) in counts {
        if count > best.1 {
            best = (gap, count);
        }
    }
    best.0
}

fn interval_consistency(gaps: &[i64], modal_gap_days: i64, policy: &FeaturePolicy) -> f64 {
    let tolerance = policy.interval_mode_tolerance_days;
    let trusted = policy
        .trusted_interval_days
        .iter()
        .any(|target| (modal_gap_days - target).abs() <= tolerance);
    if !trusted {
        return 0.0;
    }
    let near_mode = gaps
        .iter()
        .filter(|gap| (**gap - modal_gap_days).abs() <= tolerance)
        .count();
    fraction(near_mode, gaps.len())
}

/// Total skipped months when every gap is near a whole number of months,
/// `None` otherwise.
fn missed_months(month_gaps: &[f64], tolerance: f64) -> Option<usize> {
    if month_gaps.is_empty() {
        return None;
    }
    let mut missed = 0usize;
    for gap in month_gaps {
        let whole = gap.round();
        if whole < 1.0 || (gap - whole).abs() > tolerance {
            return None;
        }
        missed += whole as usize - 1;
    }
    Some(missed)
}

/// Most frequent gap bucket and how many gaps fell into it. Ties go to the
/// shorter canonical period; irregular only wins outright.
fn modal_cadence(gaps: &[i64], policy: &FeaturePolicy) -> (Cadence, usize) {
    let mut counts = [0usize; Cadence::ALL.len()];
    for gap in gaps {
        let bucket = policy.classify_gap(*gap);
        counts[usize::from(bucket.priority())] += 1;
    }

    let mut best = (Cadence::Irregular, 0usize);
    for cadence in Cadence::ALL {
        let count = counts[usize::from(cadence.priority())];
        // Strictly greater keeps the earlier (higher priority) cadence on ties.
        if count > best.1 {
            best = (cadence, count);
        }
    }
    best
}
