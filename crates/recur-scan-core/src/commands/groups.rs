use crate::ScanResult;
use crate::commands::{BatchOptions, load_batch};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::GroupsData;
use crate::features::{FEATURE_POLICY_VERSION, FeatureEngine, FeaturePolicy};
use crate::transaction::Transaction;

pub fn run(options: &BatchOptions) -> ScanResult<SuccessEnvelope> {
    let (policy, transactions) = load_batch(options)?;
    run_on(&transactions, &options.source.label(), policy)
}

#[doc(hidden)]
pub fn run_on(
    transactions: &[Transaction],
    source: &str,
    policy: FeaturePolicy,
) -> ScanResult<SuccessEnvelope> {
    let rows = FeatureEngine::new(policy)?.summarize_groups(transactions)?;
    let data = GroupsData {
        policy_version: FEATURE_POLICY_VERSION.to_string(),
        source: source.to_string(),
        transaction_count: transactions.len(),
        rows,
    };
    success("groups", data)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::run_on;
    use crate::features::FEATURE_POLICY_V1;
    use crate::transaction::Transaction;

    #[test]
    fn weekly_group_is_reported_as_recurring() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap_or(NaiveDate::MIN);
        let input = (0..5)
            .map(|index| Transaction {
                id: index,
                user_id: "u7".to_string(),
                name: "Dog Walker".to_string(),
                amount: 25.0,
                date: start + Duration::days(7 * index as i64),
            })
            .collect::<Vec<Transaction>>();
        let envelope = run_on(&input, "inline", FEATURE_POLICY_V1);
        assert!(envelope.is_ok());
        if let Ok(envelope) = envelope {
            assert_eq!(envelope.command, "groups");
            assert_eq!(envelope.data["rows"][0]["interval"]["cadence"], "weekly");
            assert_eq!(envelope.data["rows"][0]["looks_recurring"], true);
            assert_eq!(envelope.data["rows"][0]["size"], 5);
        }
    }
}
