use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::error::{ScanError, ScanResult};
use crate::features::amount::{self, AmountFeatures};
use crate::features::composer::{self, FeatureVector, compose};
use crate::features::grouping::{GroupKey, GroupingIndex};
use crate::features::history;
use crate::features::interval::{self, IntervalFeatures};
use crate::features::policy::{FEATURE_POLICY_V1, FeaturePolicy};
use crate::transaction::Transaction;

/// Batches smaller than this are computed on the calling thread.
#[cfg(feature = "parallel")]
const PARALLEL_MIN_BATCH: usize = 512;

/// Per-peer-group results, without any per-transaction context.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub user_id: String,
    pub name: String,
    pub size: usize,
    pub first_date: String,
    pub last_date: String,
    pub interval: IntervalFeatures,
    pub amount: AmountFeatures,
    pub looks_recurring: bool,
}

/// Feature vectors for one batch, plus what the grouping pass learned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureBatch {
    pub vectors: BTreeMap<u64, FeatureVector>,
    pub group_count: usize,
}

/// Analyzer output shared by every member of one peer group.
#[derive(Debug, Clone, Copy)]
struct GroupStats {
    interval: IntervalFeatures,
    amount: AmountFeatures,
}

type StatsByGroup<'a> = BTreeMap<GroupKey<'a>, GroupStats>;

#[derive(Debug, Clone, Copy)]
pub struct FeatureEngine {
    policy: FeaturePolicy,
}

impl Default for FeatureEngine {
    fn default() -> Self {
        Self {
            policy: FEATURE_POLICY_V1,
        }
    }
}

impl FeatureEngine {
    pub fn new(policy: FeaturePolicy) -> ScanResult<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &FeaturePolicy {
        &self.policy
    }

    /// Computes one feature vector per transaction, keyed by id.
    ///
    /// The whole batch is checked first: one malformed record or a repeated
    /// id fails the call before any feature is computed.
    pub fn extract_all(&self, transactions: &[Transaction]) -> ScanResult<BTreeMap<u64, FeatureVector>> {
        Ok(self.extract_batch(transactions)?.vectors)
    }

    /// Like `extract_all`, also reporting how many peer groups the batch had.
    pub fn extract_batch(&self, transactions: &[Transaction]) -> ScanResult<FeatureBatch> {
        check_batch(transactions)?;
        let index = GroupingIndex::build(transactions);
        tracing::info!(
            transactions = index.len(),
            groups = index.group_count(),
            "extracting features"
        );

        let stats = self.analyze_groups(&index);
        let vectors = self.compute_vectors(&index, &stats, transactions)?;
        Ok(FeatureBatch {
            vectors: vectors.into_iter().collect(),
            group_count: index.group_count(),
        })
    }

    fn analyze_groups<'a>(&self, index: &GroupingIndex<'a>) -> StatsByGroup<'a> {
        index
            .groups()
            .map(|(key, members)| {
                let stats = GroupStats {
                    interval: interval::analyze(members, &self.policy),
                    amount: amount::analyze(members, &self.policy),
                };
                (key, stats)
            })
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn compute_vectors(
        &self,
        index: &GroupingIndex<'_>,
        stats: &StatsByGroup<'_>,
        transactions: &[Transaction],
    ) -> ScanResult<Vec<(u64, FeatureVector)>> {
        self.compute_sequential(index, stats, transactions)
    }

    #[cfg(feature = "parallel")]
    fn compute_vectors(
        &self,
        index: &GroupingIndex<'_>,
        stats: &StatsByGroup<'_>,
        transactions: &[Transaction],
    ) -> ScanResult<Vec<(u64, FeatureVector)>> {
        if transactions.len() < PARALLEL_MIN_BATCH {
            return self.compute_sequential(index, stats, transactions);
        }
        self.compute_parallel(index, stats, transactions)
    }

    fn compute_sequential(
        &self,
        index: &GroupingIndex<'_>,
        stats: &StatsByGroup<'_>,
        transactions: &[Transaction],
    ) -> ScanResult<Vec<(u64, FeatureVector)>> {
        transactions
            .iter()
            .map(|transaction| self.vector_for(index, stats, transaction))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn compute_parallel(
        &self,
        index: &GroupingIndex<'_>,
        stats: &StatsByGroup<'_>,
        transactions: &[Transaction],
    ) -> ScanResult<Vec<(u64, FeatureVector)>> {
        use rayon::prelude::*;

        transactions
            .par_iter()
            .map(|transaction| self.vector_for(index, stats, transaction))
            .collect()
    }

    fn vector_for(
        &self,
        index: &GroupingIndex<'_>,
        stats: &StatsByGroup<'_>,
        transaction: &Transaction,
    ) -> ScanResult<(u64, FeatureVector)> {
        let group = index.lookup(transaction)?;
        let shared = stats
            .get(&transaction.group_key())
            .ok_or_else(|| ScanError::transaction_not_in_index(transaction.id))?;
        let signals = history::analyze(transaction, &group, &shared.amount, &self.policy);
        let vector = compose(
            transaction,
            &group,
            &shared.interval,
            &shared.amount,
            &signals,
            &self.policy,
        );
        Ok((transaction.id, vector))
    }

    /// Interval and amount results for every peer group, in key order.
    pub fn summarize_groups(&self, transactions: &[Transaction]) -> ScanResult<Vec<GroupSummary>> {
        check_batch(transactions)?;
        let index = GroupingIndex::build(transactions);
        let stats = self.analyze_groups(&index);

        let summaries = index
            .groups()
            .filter_map(|(key, members)| {
                let first = members.first()?;
                let last = members.last()?;
                let GroupStats { interval, amount } = *stats.get(&key)?;
                Some(GroupSummary {
                    user_id: key.0.to_string(),
                    name: key.1.to_string(),
                    size: members.len(),
                    first_date: first.date.format("%Y-%m-%d").to_string(),
                    last_date: last.date.format("%Y-%m-%d").to_string(),
                    looks_recurring: composer::looks_recurring(&interval, &amount, &self.policy),
                    interval,
                    amount,
                })
            })
            .collect::<Vec<GroupSummary>>();

        tracing::info!(groups = summaries.len(), "summarized peer groups");
        Ok(summaries)
    }
}

/// Shorthand for `FeatureEngine::default().extract_all(...)`.
pub fn extract_all(transactions: &[Transaction]) -> ScanResult<BTreeMap<u64, FeatureVector>> {
    FeatureEngine::default().extract_all(transactions)
}

fn check_batch(transactions: &[Transaction]) -> ScanResult<()> {
    let mut seen = HashSet::with_capacity(transactions.len());
    for transaction in transactions {
        transaction.validate()?;
        if !seen.insert(transaction.id) {
            return Err(ScanError::invalid_transaction(
                transaction.id,
                "id appears more than once in the batch",
            ));
        }
    }
    Ok(())
}
