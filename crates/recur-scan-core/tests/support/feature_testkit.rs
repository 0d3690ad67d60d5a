#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use recur_scan_core::features::Cadence;
use recur_scan_core::{FeatureVector, Transaction, extract_all};

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or(NaiveDate::MIN)
}

pub fn transaction(id: u64, user_id: &str, name: &str, on: &str, amount: f64) -> Transaction {
    Transaction {
        id,
        user_id: user_id.to_string(),
        name: name.to_string(),
        amount,
        date: date(on),
    }
}

/// Builds one peer group whose consecutive dates are separated by `gaps`.
pub fn series(
    first_id: u64,
    user_id: &str,
    name: &str,
    start: &str,
    gaps: &[i64],
    amounts: &[f64],
) -> Vec<Transaction> {
    let mut on = date(start);
    amounts
        .iter()
        .enumerate()
        .map(|(index, amount)| {
            if index > 0 {
                on += Duration::days(gaps.get(index - 1).copied().unwrap_or(0));
            }
            Transaction {
                id: first_id + index as u64,
                user_id: user_id.to_string(),
                name: name.to_string(),
                amount: *amount,
                date: on,
            }
        })
        .collect()
}

pub fn run_scenario(input: &[Transaction]) -> BTreeMap<u64, FeatureVector> {
    let result = extract_all(input);
    assert!(result.is_ok(), "extraction failed: {result:?}");
    result.unwrap_or_default()
}

pub fn feature(mapping: &BTreeMap<u64, FeatureVector>, id: u64, name: &str) -> f64 {
    mapping
        .get(&id)
        .and_then(|vector| vector.get(name))
        .unwrap_or(f64::NAN)
}

pub fn cadence_of(mapping: &BTreeMap<u64, FeatureVector>, id: u64) -> Option<Cadence> {
    let vector = mapping.get(&id)?;
    Cadence::ALL
        .into_iter()
        .find(|cadence| vector.flag(cadence.feature_name()))
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
