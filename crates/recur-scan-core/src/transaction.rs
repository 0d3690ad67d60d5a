use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ScanError, ScanResult};

/// One transaction as seen by the feature engine.
///
/// Records are owned by the caller and only ever borrowed by the engine.
/// `Transaction::new` validates its inputs; records produced any other way
/// (deserialization, struct literals) are re-checked by the engine before a
/// batch runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    pub user_id: String,
    pub name: String,
    pub amount: f64,
    pub date: NaiveDate,
}

impl Transaction {
    pub fn new(
        id: u64,
        user_id: impl Into<String>,
        name: impl Into<String>,
        amount: f64,
        date: NaiveDate,
    ) -> ScanResult<Self> {
        let transaction = Self {
            id,
            user_id: user_id.into(),
            name: name.into(),
            amount,
            date,
        };
        transaction.validate()?;
        Ok(transaction)
    }

    pub fn validate(&self) -> ScanResult<()> {
        if self.user_id.trim().is_empty() {
            return Err(ScanError::invalid_transaction(self.id, "user_id must be non-empty"));
        }
        if self.name.trim().is_empty() {
            return Err(ScanError::invalid_transaction(self.id, "name must be non-empty"));
        }
        if !self.amount.is_finite() {
            return Err(ScanError::invalid_transaction(self.id, "amount must be a finite number"));
        }
        if self.amount <= 0.0 {
            return Err(ScanError::invalid_transaction(self.id, "amount must be positive"));
        }
        Ok(())
    }

    /// Peer-group key: exact `(user_id, name)` match, no normalization.
    pub fn group_key(&self) -> (&str, &str) {
        (self.user_id.as_str(), self.name.as_str())
    }
}
