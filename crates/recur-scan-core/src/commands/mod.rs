pub mod features;
pub mod groups;
pub mod policy;

use std::path::PathBuf;

use crate::ScanResult;
use crate::features::{FeaturePolicy, load_policy};
use crate::ingest::{InputSource, read_transactions};
use crate::transaction::Transaction;

/// Inputs shared by the batch commands.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub source: InputSource,
    pub policy_path: Option<PathBuf>,
}

impl BatchOptions {
    pub fn new(path: &str, policy_path: Option<PathBuf>) -> Self {
        Self {
            source: InputSource::from_arg(path),
            policy_path,
        }
    }
}

fn load_batch(options: &BatchOptions) -> ScanResult<(FeaturePolicy, Vec<Transaction>)> {
    let policy = load_policy(options.policy_path.as_deref())?;
    let transactions = read_transactions(&options.source)?;
    Ok((policy, transactions))
}
