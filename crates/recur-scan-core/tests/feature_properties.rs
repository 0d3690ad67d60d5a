mod support;

use std::collections::{BTreeMap, BTreeSet};

use chrono::Duration;
use proptest::prelude::*;
use recur_scan_core::features::{Cadence, FEATURE_NAMES, FeatureEngine};
use recur_scan_core::{FeatureVector, Transaction, extract_all};
use support::feature_testkit::{cadence_of, date, feature, run_scenario, series, transaction};

const USERS: [&str; 3] = ["u1", "u2", "u3"];
const VENDORS: [&str; 3] = ["Netflix", "Gym", "Electric Co"];

fn batch(rows: &[(usize, usize, u16, i64)]) -> Vec<Transaction> {
    let start = date("2025-01-01");
    rows.iter()
        .enumerate()
        .map(|(index, (user, vendor, cents, jitter))| Transaction {
            id: index as u64,
            user_id: USERS[*user].to_string(),
            name: VENDORS[*vendor].to_string(),
            amount: f64::from(*cents) / 100.0 + 1.0,
            // Distinct dates keep the in-group order independent of input order.
            date: start + Duration::days(index as i64 * 5 + jitter),
        })
        .collect()
}

/// Features that depend on where a member sits among same-date peers.
const TIE_POSITION_FEATURES: [&str; 6] = [
    "position_in_group",
    "is_first_in_group",
    "is_last_in_group",
    "is_middle_of_group",
    "days_since_previous",
    "days_until_next",
];

fn bits(vector: &FeatureVector) -> BTreeMap<&'static str, u64> {
    vector
        .iter()
        .map(|(name, value)| (name, value.to_bits()))
        .collect()
}

fn bits_without_tie_position(vector: &FeatureVector) -> BTreeMap<&'static str, u64> {
    let mut values = bits(vector);
    for name in TIE_POSITION_FEATURES {
        values.remove(name);
    }
    values
}

/// One user/vendor group whose members share a handful of dates.
fn crowded_group(rows: &[(i64, u32)]) -> Vec<Transaction> {
    let start = date("2026-01-01");
    rows.iter()
        .enumerate()
        .map(|(index, (slot, cents))| Transaction {
            id: index as u64,
            user_id: "u1".to_string(),
            name: "Corner Store".to_string(),
            amount: f64::from(*cents) / 100.0,
            date: start + Duration::days(slot * 10),
        })
        .collect()
}

fn batch_rows() -> impl Strategy<Value = Vec<(usize, usize, u16, i64)>> {
    prop::collection::vec((0..USERS.len(), 0..VENDORS.len(), 0u16..20_000, 0i64..5), 0..40)
}

proptest! {
    #[test]
    fn reordering_input_does_not_change_output(
        (rows, order) in batch_rows().prop_flat_map(|rows| {
            let order = Just((0..rows.len()).collect::<Vec<usize>>()).prop_shuffle();
            (Just(rows), order)
        })
    ) {
        let original = batch(&rows);
        let reordered = order
            .iter()
            .map(|at| original[*at].clone())
            .collect::<Vec<Transaction>>();

        let first = extract_all(&original);
        let second = extract_all(&reordered);
        prop_assert!(first.is_ok() && second.is_ok());
        if let (Ok(first), Ok(second)) = (first, second) {
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn shuffling_same_date_members_keeps_group_statistics_bit_identical(
        (rows, order) in prop::collection::vec((0i64..4, 1u32..100_000), 2..16)
            .prop_flat_map(|rows| {
                let order = Just((0..rows.len()).collect::<Vec<usize>>()).prop_shuffle();
                (Just(rows), order)
            })
    ) {
        let original = crowded_group(&rows);
        let reordered = order
            .iter()
            .map(|at| original[*at].clone())
            .collect::<Vec<Transaction>>();

        let first = extract_all(&original);
        let second = extract_all(&reordered);
        prop_assert!(first.is_ok() && second.is_ok());
        if let (Ok(first), Ok(second)) = (first, second) {
            for row in &original {
                let shares_date = original
                    .iter()
                    .any(|peer| peer.id != row.id && peer.date == row.date);
                let (Some(left), Some(right)) = (first.get(&row.id), second.get(&row.id)) else {
                    prop_assert!(false, "missing vector for id {}", row.id);
                    continue;
                };
                if shares_date {
                    prop_assert_eq!(bits_without_tie_position(left), bits_without_tie_position(right));
                } else {
                    prop_assert_eq!(bits(left), bits(right));
                }
            }
        }
    }

    #[test]
    fn every_vector_has_the_fixed_schema(rows in batch_rows()) {
        let input = batch(&rows);
        let mapping = extract_all(&input);
        prop_assert!(mapping.is_ok());
        if let Ok(mapping) = mapping {
            prop_assert_eq!(mapping.len(), input.len());
            let expected = FEATURE_NAMES.iter().copied().collect::<BTreeSet<&str>>();
            for vector in mapping.values() {
                prop_assert_eq!(vector.names().collect::<BTreeSet<&str>>(), expected.clone());
                prop_assert!(vector.iter().all(|(_, value)| value.is_finite()));
            }
        }
    }

    #[test]
    fn amount_cv_is_scale_invariant(
        cents in prop::collection::vec(100u32..100_000, 2..12),
        factor in 0.5f64..50.0,
    ) {
        let amounts = cents.iter().map(|value| f64::from(*value) / 100.0).collect::<Vec<f64>>();
        let scaled = amounts.iter().map(|amount| amount * factor).collect::<Vec<f64>>();
        let gaps = vec![30; amounts.len() - 1];

        let base = run_scenario(&series(0, "u1", "Vendor", "2026-01-01", &gaps, &amounts));
        let grown = run_scenario(&series(0, "u1", "Vendor", "2026-01-01", &gaps, &scaled));

        let base_cv = feature(&base, 0, "amount_cv");
        let grown_cv = feature(&grown, 0, "amount_cv");
        prop_assert!((base_cv - grown_cv).abs() < 1e-9);

        let threshold = FeatureEngine::default().policy().amount_cv_threshold;
        prop_assume!((base_cv - threshold).abs() > 1e-6);
        prop_assert_eq!(
            feature(&base, 0, "is_amount_stable"),
            feature(&grown, 0, "is_amount_stable")
        );
    }

    #[test]
    fn gaps_inside_the_monthly_window_are_fully_monthly(
        gaps in prop::collection::vec(26i64..=34, 1..10),
    ) {
        let amounts = vec![49.0; gaps.len() + 1];
        let mapping = run_scenario(&series(0, "u1", "Rent", "2026-01-01", &gaps, &amounts));
        for id in 0..amounts.len() as u64 {
            prop_assert_eq!(cadence_of(&mapping, id), Some(Cadence::Monthly));
            prop_assert!((feature(&mapping, id, "cadence_confidence") - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn singleton_groups_are_insufficient_and_stable(cents in 1u32..1_000_000) {
        let amount = f64::from(cents) / 100.0;
        let mapping = run_scenario(&series(9, "u1", "Once", "2026-05-05", &[], &[amount]));
        prop_assert_eq!(cadence_of(&mapping, 9), Some(Cadence::Insufficient));
        prop_assert!(feature(&mapping, 9, "n_intervals") == 0.0);
        prop_assert!(feature(&mapping, 9, "is_amount_stable") == 1.0);
        prop_assert!(feature(&mapping, 9, "amount_cv") == 0.0);
    }
}

#[test]
fn swapping_same_date_members_keeps_other_vectors_bit_identical() {
    let forward = vec![
        transaction(1, "u1", "Snack Bar", "2026-01-01", 0.1),
        transaction(2, "u1", "Snack Bar", "2026-02-01", 0.1),
        transaction(3, "u1", "Snack Bar", "2026-02-01", 1.0),
    ];
    let swapped = vec![forward[0].clone(), forward[2].clone(), forward[1].clone()];

    let first = run_scenario(&forward);
    let second = run_scenario(&swapped);
    assert_eq!(first.get(&1).map(bits), second.get(&1).map(bits));
    assert_eq!(
        first.get(&2).map(bits_without_tie_position),
        second.get(&2).map(bits_without_tie_position)
    );
    assert_eq!(
        feature(&first, 1, "mean_amount").to_bits(),
        feature(&second, 1, "mean_amount").to_bits()
    );
    assert_eq!(feature(&first, 2, "position_in_group"), 1.0);
    assert_eq!(feature(&second, 2, "position_in_group"), 2.0);
}

#[test]
fn running_twice_is_identical() {
    let input = batch(&[(0, 0, 1599, 0), (0, 0, 1599, 1), (1, 2, 8000, 3), (0, 1, 4000, 2)]);
    let first = extract_all(&input);
    let second = extract_all(&input);
    assert!(first.is_ok() && second.is_ok());
    if let (Ok(first), Ok(second)) = (first, second) {
        assert_eq!(first, second);
    }
}
