use std::collections::BTreeMap;

use serde::Serialize;

use crate::features::GroupSummary;

#[derive(Debug, Clone, Serialize)]
pub struct InputIssue {
    pub row: i64,
    pub field: String,
    pub code: String,
    pub description: String,
    pub expected: Option<String>,
    pub received: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct InputSummary {
    pub rows_read: i64,
    pub rows_valid: i64,
    pub rows_invalid: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureRow {
    pub id: u64,
    pub user_id: String,
    pub name: String,
    pub date: String,
    pub amount: f64,
    pub features: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeaturesData {
    pub policy_version: String,
    pub source: String,
    pub transaction_count: usize,
    pub group_count: usize,
    pub feature_names: Vec<String>,
    pub rows: Vec<FeatureRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupsData {
    pub policy_version: String,
    pub source: String,
    pub transaction_count: usize,
    pub rows: Vec<GroupSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicyData {
    pub policy_version: String,
    pub source: Option<String>,
    pub policy: crate::features::FeaturePolicy,
}
