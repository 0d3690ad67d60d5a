use crate::ScanResult;
use crate::commands::{BatchOptions, load_batch};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{FeatureRow, FeaturesData};
use crate::features::{FEATURE_NAMES, FEATURE_POLICY_VERSION, FeatureEngine, FeaturePolicy};
use crate::transaction::Transaction;

pub fn run(options: &BatchOptions) -> ScanResult<SuccessEnvelope> {
    let (policy, transactions) = load_batch(options)?;
    run_on(&transactions, &options.source.label(), policy)
}

/// Extracts features for an already-loaded batch. Rows keep input order.
#[doc(hidden)]
pub fn run_on(
    transactions: &[Transaction],
    source: &str,
    policy: FeaturePolicy,
) -> ScanResult<SuccessEnvelope> {
    let engine = FeatureEngine::new(policy)?;
    let batch = engine.extract_batch(transactions)?;
    let vectors = batch.vectors;
    let group_count = batch.group_count;

    let rows = transactions
        .iter()
        .filter_map(|transaction| {
            let vector = vectors.get(&transaction.id)?;
            Some(FeatureRow {
                id: transaction.id,
                user_id: transaction.user_id.clone(),
                name: transaction.name.clone(),
                date: transaction.date.format("%Y-%m-%d").to_string(),
                amount: transaction.amount,
                features: vector
                    .iter()
                    .map(|(name, value)| (name.to_string(), value))
                    .collect(),
            })
        })
        .collect::<Vec<FeatureRow>>();

    tracing::debug!(rows = rows.len(), group_count, "built feature rows");

    let data = FeaturesData {
        policy_version: FEATURE_POLICY_VERSION.to_string(),
        source: source.to_string(),
        transaction_count: transactions.len(),
        group_count,
        feature_names: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
        rows,
    };

    success("features", data)
}
