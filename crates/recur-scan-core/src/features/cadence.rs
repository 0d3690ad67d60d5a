use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Annual,
    Irregular,
    Insufficient,
}

impl Cadence {
    /// Regular cadences, shortest canonical period first. Order doubles as
    /// the tie-break priority when two buckets are equally frequent.
    pub const REGULAR: [Cadence; 5] = [
        Self::Weekly,
        Self::Biweekly,
        Self::Monthly,
        Self::Quarterly,
        Self::Annual,
    ];

    /// Every class a gap or a group can be assigned, in feature order.
    pub const ALL: [Cadence; 7] = [
        Self::Weekly,
        Self::Biweekly,
        Self::Monthly,
        Self::Quarterly,
        Self::Annual,
        Self::Irregular,
        Self::Insufficient,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
            Self::Irregular => "irregular",
            Self::Insufficient => "insufficient",
        }
    }

    /// Name of the one-hot feature flagging this class.
    pub const fn feature_name(self) -> &'static str {
        match self {
            Self::Weekly => "cadence_is_weekly",
            Self::Biweekly => "cadence_is_biweekly",
            Self::Monthly => "cadence_is_monthly",
            Self::Quarterly => "cadence_is_quarterly",
            Self::Annual => "cadence_is_annual",
            Self::Irregular => "cadence_is_irregular",
            Self::Insufficient => "cadence_is_insufficient",
        }
    }

    /// Stable numeric code; `insufficient` is 0 so it doubles as the sentinel.
    pub const fn code(self) -> u8 {
        match self {
            Self::Insufficient => 0,
            Self::Weekly => 1,
            Self::Biweekly => 2,
            Self::Monthly => 3,
            Self::Quarterly => 4,
            Self::Annual => 5,
            Self::Irregular => 6,
        }
    }

    pub const fn canonical_days(self) -> Option<i64> {
        match self {
            Self::Weekly => Some(7),
            Self::Biweekly => Some(14),
            Self::Monthly => Some(30),
            Self::Quarterly => Some(91),
            Self::Annual => Some(365),
            Self::Irregular | Self::Insufficient => None,
        }
    }

    pub const fn is_regular(self) -> bool {
        self.canonical_days().is_some()
    }

    /// Lower wins ties. Irregular ranks after every regular cadence.
    pub const fn priority(self) -> u8 {
        match self {
            Self::Weekly => 0,
            Self::Biweekly => 1,
            Self::Monthly => 2,
            Self::Quarterly => 3,
            Self::Annual => 4,
            Self::Irregular => 5,
            Self::Insufficient => 6,
        }
    }
}

pub fn days_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (later - earlier).num_days()
}

/// Gap in calendar months: whole months (day clamped to month end, so Jan 31
/// to Feb 28 is exactly one) plus leftover days as a share of the month they
/// fall in. Gaps under a tenth of a month are 0.
pub fn months_between(earlier: NaiveDate, later: NaiveDate) -> f64 {
    if later <= earlier {
        return 0.0;
    }
    let whole = (later.year() - earlier.year()) * 12 + later.month() as i32 - earlier.month() as i32;
    let mut months = u32::try_from(whole).unwrap_or(0);
    let mut anchor = shift_months(earlier, months);
    while months > 0 && anchor > later {
        months -= 1;
        anchor = shift_months(earlier, months);
    }

    let value = f64::from(months) + days_between(anchor, later) as f64 / days_in_month(anchor) as f64;
    if value < 0.1 { 0.0 } else { value }
}

fn shift_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

fn days_in_month(date: NaiveDate) -> i64 {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .map(|next| days_between(first, next))
        .unwrap_or(31)
}

/// Distance between two days of the month, wrapping across month ends so the
/// 31st and the 1st are one day apart.
pub fn day_of_month_distance(left: NaiveDate, right: NaiveDate) -> u32 {
    let direct = left.day().abs_diff(right.day());
    direct.min(31 - direct)
}
