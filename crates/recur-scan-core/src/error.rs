use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

use crate::contracts::types::{InputIssue, InputSummary};

pub(crate) const INPUT_HELP_COMMAND: &str = "recur-scan features --help";

pub const INVALID_TRANSACTION: &str = "invalid_transaction";
pub const NOT_FOUND: &str = "not_found";
pub const INVALID_POLICY: &str = "invalid_policy";
pub const INVALID_INPUT: &str = "invalid_input";
pub const INPUT_VALIDATION_FAILED: &str = "input_validation_failed";
pub const INPUT_READ_FAILED: &str = "input_read_failed";
pub const INTERNAL_SERIALIZATION: &str = "internal_serialization_error";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ScanError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ScanError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Errors that indicate a bug in the engine rather than bad input.
    pub fn is_internal(&self) -> bool {
        self.code.starts_with("internal_") || self.code == NOT_FOUND
    }

    pub fn invalid_transaction(id: u64, detail: &str) -> Self {
        Self::new(
            INVALID_TRANSACTION,
            &format!("Transaction {id} is invalid: {detail}"),
            vec![
                "Reject malformed records before they reach the feature engine.".to_string(),
                "Amounts must be finite and positive; user_id and name must be non-empty."
                    .to_string(),
            ],
        )
        .with_data(json!({ "id": id }))
    }

    /// A transaction was looked up in an index it does not belong to.
    pub fn transaction_not_in_index(id: u64) -> Self {
        Self::new(
            NOT_FOUND,
            &format!("Transaction {id} is not part of the grouping index for this batch."),
            vec!["This is an internal invariant violation; please report it.".to_string()],
        )
        .with_data(json!({ "id": id }))
    }

    pub fn invalid_policy(message: &str) -> Self {
        Self::new(
            INVALID_POLICY,
            message,
            vec![
                "Run `recur-scan policy` to print the default policy.".to_string(),
                "Tolerances and thresholds must be finite and non-negative.".to_string(),
            ],
        )
    }

    pub fn invalid_input(message: &str) -> Self {
        Self::new(
            INVALID_INPUT,
            message,
            vec![format!("Run `{INPUT_HELP_COMMAND}` to review the input format.")],
        )
        .with_data(json!({ "help_command": INPUT_HELP_COMMAND }))
    }

    pub fn input_schema_mismatch(required_headers: Vec<String>, actual_headers: Vec<String>) -> Self {
        Self::new(
            INVALID_INPUT,
            "CSV headers do not satisfy the transaction schema.",
            vec![
                "Include all required headers: user_id, name, date, amount.".to_string(),
                "The id header is optional; row numbers are used when it is absent.".to_string(),
            ],
        )
        .with_data(json!({
            "required_headers": required_headers,
            "actual_headers": actual_headers,
            "help_command": INPUT_HELP_COMMAND,
        }))
    }

    pub fn input_validation_failed(summary: InputSummary, issues: Vec<InputIssue>) -> Self {
        let invalid = summary.rows_invalid;
        Self::new(
            INPUT_VALIDATION_FAILED,
            &format!("Input failed validation: {invalid} rows need fixes. No features were computed."),
            vec![
                "Fix the listed issues in your source file.".to_string(),
                "Rerun recur-scan features <path>.".to_string(),
            ],
        )
        .with_data(json!({
            "summary": summary,
            "issues": issues,
        }))
    }

    pub fn input_read_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            INPUT_READ_FAILED,
            &format!("Cannot read input at `{location}`: {detail}"),
            vec![format!("Check that `{location}` exists and is readable.")],
        )
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new(INTERNAL_SERIALIZATION, message, Vec::new())
    }
}

pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::{NOT_FOUND, ScanError};

    #[test]
    fn not_found_is_internal_but_invalid_transaction_is_not() {
        assert!(ScanError::transaction_not_in_index(7).is_internal());
        assert_eq!(ScanError::transaction_not_in_index(7).code, NOT_FOUND);
        assert!(!ScanError::invalid_transaction(7, "amount is NaN").is_internal());
        assert!(ScanError::internal_serialization("boom").is_internal());
    }

    #[test]
    fn invalid_transaction_carries_the_id() {
        let error = ScanError::invalid_transaction(42, "amount must be positive");
        assert_eq!(error.data.as_ref().and_then(|data| data["id"].as_u64()), Some(42));
        assert!(error.to_string().contains("amount must be positive"));
    }
}
