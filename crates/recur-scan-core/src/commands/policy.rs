use std::path::Path;

use crate::ScanResult;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::PolicyData;
use crate::features::{FEATURE_POLICY_VERSION, load_policy};

/// Prints the effective policy: the defaults, or a TOML override merged over them.
pub fn show(policy_path: Option<&Path>) -> ScanResult<SuccessEnvelope> {
    let policy = load_policy(policy_path)?;
    success(
        "policy",
        PolicyData {
            policy_version: FEATURE_POLICY_VERSION.to_string(),
            source: policy_path.map(|path| path.display().to_string()),
            policy,
        },
    )
}
