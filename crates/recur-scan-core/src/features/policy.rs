use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ScanError, ScanResult};
use crate::features::cadence::Cadence;

/// Identifier emitted alongside computed features so threshold changes stay
/// auditable when feature files are compared across runs.
pub const FEATURE_POLICY_VERSION: &str = "features/v1";

/// A canonical period and the ± tolerance (in days) a gap may deviate from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CadenceWindow {
    pub period_days: i64,
    pub tolerance_days: i64,
}

impl CadenceWindow {
    pub const fn new(period_days: i64, tolerance_days: i64) -> Self {
        Self {
            period_days,
            tolerance_days,
        }
    }

    pub fn contains(self, gap_days: i64) -> bool {
        (gap_days - self.period_days).abs() <= self.tolerance_days
    }
}

/// An inclusive range of gap lengths, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayRange {
    pub min_days: i64,
    pub max_days: i64,
}

impl DayRange {
    pub const fn new(min_days: i64, max_days: i64) -> Self {
        Self { min_days, max_days }
    }

    pub fn contains(self, gap_days: i64) -> bool {
        (self.min_days..=self.max_days).contains(&gap_days)
    }
}

/// Policy constants for feature extraction.
///
/// Every field can be overridden from a TOML file; fields left out keep the
/// `FEATURE_POLICY_V1` value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeaturePolicy {
    pub weekly: CadenceWindow,
    pub biweekly: CadenceWindow,
    pub monthly: CadenceWindow,
    pub quarterly: CadenceWindow,
    pub annual: CadenceWindow,
    /// Amounts are stable when their coefficient of variation is below this.
    pub amount_cv_threshold: f64,
    /// Minimum share of gaps in the modal cadence for `looks_recurring`.
    pub min_cadence_confidence: f64,
    /// Max day-of-month distance for two transactions to count as same-day.
    pub same_day_tolerance: u32,
    pub consistency_abs_tolerance: f64,
    pub consistency_rel_tolerance: f64,
    /// Gap lengths a modal gap must sit near to score interval consistency.
    pub trusted_interval_days: [i64; 12],
    pub interval_mode_tolerance_days: i64,
    /// Max distance of a calendar-month gap from a whole number of months.
    pub month_interval_tolerance: f64,
    /// Max `(max - min) / mean` for the monthly-with-missing-entries flag.
    pub monthly_amount_spread: f64,
    /// Relative tolerance for two amounts to count as similar.
    pub similar_amount_tolerance: f64,
    /// Max absolute spread for a group to count as one repeated amount.
    pub same_amount_abs_tolerance: f64,
    /// Billing gaps checked by `same_amount_known_interval`.
    pub known_interval_ranges: [DayRange; 3],
}

pub const FEATURE_POLICY_V1: FeaturePolicy = FeaturePolicy {
    weekly: CadenceWindow::new(7, 2),
    biweekly: CadenceWindow::new(14, 3),
    monthly: CadenceWindow::new(30, 4),
    quarterly: CadenceWindow::new(91, 7),
    annual: CadenceWindow::new(365, 10),
    amount_cv_threshold: 0.10,
    min_cadence_confidence: 0.75,
    same_day_tolerance: 2,
    consistency_abs_tolerance: 0.50,
    consistency_rel_tolerance: 0.05,
    trusted_interval_days: [7, 14, 17, 28, 30, 31, 45, 60, 90, 180, 365, 380],
    interval_mode_tolerance_days: 5,
    month_interval_tolerance: 0.2,
    monthly_amount_spread: 0.05,
    similar_amount_tolerance: 0.01,
    same_amount_abs_tolerance: 0.05,
    known_interval_ranges: [
        DayRange::new(15, 17),
        DayRange::new(27, 45),
        DayRange::new(379, 381),
    ],
};

impl Default for FeaturePolicy {
    fn default() -> Self {
        FEATURE_POLICY_V1
    }
}

impl FeaturePolicy {
    pub fn window(&self, cadence: Cadence) -> Option<CadenceWindow> {
        match cadence {
            Cadence::Weekly => Some(self.weekly),
            Cadence::Biweekly => Some(self.biweekly),
            Cadence::Monthly => Some(self.monthly),
            Cadence::Quarterly => Some(self.quarterly),
            Cadence::Annual => Some(self.annual),
            Cadence::Irregular | Cadence::Insufficient => None,
        }
    }

    /// Bucket a single gap. Windows are tried shortest period first, so
    /// overlapping custom windows resolve to the shorter cadence.
    pub fn classify_gap(&self, gap_days: i64) -> Cadence {
        Cadence::REGULAR
            .into_iter()
            .find(|cadence| {
                self.window(*cadence)
                    .is_some_and(|window| window.contains(gap_days))
            })
            .unwrap_or(Cadence::Irregular)
    }

    pub fn is_stable_cv(&self, amount_cv: f64) -> bool {
        amount_cv < self.amount_cv_threshold
    }

    pub fn passes_confidence_gate(&self, cadence_confidence: f64) -> bool {
        cadence_confidence >= self.min_cadence_confidence
    }

    pub fn validate(&self) -> ScanResult<()> {
        for cadence in Cadence::REGULAR {
            let Some(window) = self.window(cadence) else {
                continue;
            };
            let name = cadence.as_str();
            if window.period_days <= 0 {
                return Err(ScanError::invalid_policy(&format!(
                    "`{name}.period_days` must be positive; got {}.",
                    window.period_days
                )));
            }
            if window.tolerance_days < 0 || window.tolerance_days >= window.period_days {
                return Err(ScanError::invalid_policy(&format!(
                    "`{name}.tolerance_days` must be between 0 and period_days - 1; got {}.",
                    window.tolerance_days
                )));
            }
        }

        for (field, value) in [
            ("amount_cv_threshold", self.amount_cv_threshold),
            ("consistency_abs_tolerance", self.consistency_abs_tolerance),
            ("consistency_rel_tolerance", self.consistency_rel_tolerance),
            ("month_interval_tolerance", self.month_interval_tolerance),
            ("monthly_amount_spread", self.monthly_amount_spread),
            ("similar_amount_tolerance", self.similar_amount_tolerance),
            ("same_amount_abs_tolerance", self.same_amount_abs_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScanError::invalid_policy(&format!(
                    "`{field}` must be a finite, non-negative number; got {value}."
                )));
            }
        }

        if self.month_interval_tolerance >= 0.5 {
            return Err(ScanError::invalid_policy(&format!(
                "`month_interval_tolerance` must be below 0.5; got {}.",
                self.month_interval_tolerance
            )));
        }

        if self.interval_mode_tolerance_days < 0 {
            return Err(ScanError::invalid_policy(&format!(
                "`interval_mode_tolerance_days` must be non-negative; got {}.",
                self.interval_mode_tolerance_days
            )));
        }

        if let Some(target) = self.trusted_interval_days.iter().find(|days| **days <= 0) {
            return Err(ScanError::invalid_policy(&format!(
                "`trusted_interval_days` entries must be positive; got {target}."
            )));
        }

        if let Some(range) = self
            .known_interval_ranges
            .iter()
            .find(|range| range.min_days <= 0 || range.min_days > range.max_days)
        {
            return Err(ScanError::invalid_policy(&format!(
                "`known_interval_ranges` entries need 0 < min_days <= max_days; got {}..={}.",
                range.min_days, range.max_days
            )));
        }

        if !(0.0..=1.0).contains(&self.min_cadence_confidence) {
            return Err(ScanError::invalid_policy(&format!(
                "`min_cadence_confidence` must be within 0.0..=1.0; got {}.",
                self.min_cadence_confidence
            )));
        }

        Ok(())
    }

    pub fn from_toml_str(content: &str) -> ScanResult<Self> {
        let policy = toml::from_str::<FeaturePolicy>(content)
            .map_err(|error| ScanError::invalid_policy(&format!("Invalid policy file: {error}")))?;
        policy.validate()?;
        Ok(policy)
    }
}

/// Loads a policy override file, or the defaults when no path is given.
pub fn load_policy(path: Option<&Path>) -> ScanResult<FeaturePolicy> {
    let Some(path) = path else {
        return Ok(FEATURE_POLICY_V1);
    };
    let content = std::fs::read_to_string(path)
        .map_err(|error| ScanError::input_read_failed(path, &error.to_string()))?;
    let policy = FeaturePolicy::from_toml_str(&content)?;
    tracing::debug!(path = %path.display(), "loaded feature policy override");
    Ok(policy)
}
