use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::contracts::types::{InputIssue, InputSummary};
use crate::ingest::parse::ParsedRow;
use crate::transaction::Transaction;
use crate::{ScanError, ScanResult};

/// Turns parsed rows into transactions, or fails with every row issue found.
///
/// Rows without an `id` get their zero-based row index.
pub(crate) fn validate_rows(parsed_rows: Vec<ParsedRow>) -> ScanResult<Vec<Transaction>> {
    let total_rows = parsed_rows.len();
    let mut transactions = Vec::with_capacity(total_rows);
    let mut issues = Vec::new();
    let mut first_row_for_id: HashMap<u64, i64> = HashMap::new();

    for raw in parsed_rows {
        let mut row_issues = Vec::new();

        let id = validate_id(raw.row, raw.id, &mut row_issues);
        let user_id = validate_required_string(raw.row, "user_id", raw.user_id, &mut row_issues);
        let name = validate_required_string(raw.row, "name", raw.name, &mut row_issues);
        let date = validate_date(raw.row, raw.date, &mut row_issues);
        let amount = validate_amount(raw.row, raw.amount, &mut row_issues);

        if let Some(id_value) = id {
            if let Some(first_row) = first_row_for_id.get(&id_value) {
                row_issues.push(InputIssue {
                    row: raw.row,
                    field: "id".to_string(),
                    code: "duplicate_id".to_string(),
                    description: format!("id {id_value} was already used by row {first_row}."),
                    expected: Some("unique id".to_string()),
                    received: Some(id_value.to_string()),
                });
            } else {
                first_row_for_id.insert(id_value, raw.row);
            }
        }

        match (id, user_id, name, date, amount) {
            (Some(id), Some(user_id), Some(name), Some(date), Some(amount))
                if row_issues.is_empty() =>
            {
                transactions.push(Transaction {
                    id,
                    user_id,
                    name,
                    amount,
                    date,
                });
            }
            _ => issues.extend(row_issues),
        }
    }

    let summary = InputSummary {
        rows_read: total_rows as i64,
        rows_valid: transactions.len() as i64,
        rows_invalid: issues
            .iter()
            .map(|issue| issue.row)
            .collect::<HashSet<i64>>()
            .len() as i64,
    };

    if !issues.is_empty() {
        tracing::warn!(
            rows_invalid = summary.rows_invalid,
            issues = issues.len(),
            "input failed validation"
        );
        return Err(ScanError::input_validation_failed(summary, issues));
    }

    Ok(transactions)
}

fn validate_id(row: i64, value: Option<String>, issues: &mut Vec<InputIssue>) -> Option<u64> {
    let Some(candidate) = normalize_optional(value) else {
        return u64::try_from(row - 1).ok();
    };
    match candidate.parse::<u64>() {
        Ok(id) => Some(id),
        Err(_) => {
            issues.push(InputIssue {
                row,
                field: "id".to_string(),
                code: "invalid_id".to_string(),
                description: format!("id must be a non-negative integer; got \"{candidate}\""),
                expected: Some("integer (e.g. 42)".to_string()),
                received: Some(candidate),
            });
            None
        }
    }
}

fn validate_required_string(
    row: i64,
    field: &str,
    value: Option<String>,
    issues: &mut Vec<InputIssue>,
) -> Option<String> {
    let normalized = normalize_optional(value);
    if normalized.is_none() {
        issues.push(missing_field(row, field, "non-empty string"));
    }
    normalized
}

fn validate_date(row: i64, value: Option<String>, issues: &mut Vec<InputIssue>) -> Option<NaiveDate> {
    let Some(candidate) = normalize_optional(value) else {
        issues.push(missing_field(row, "date", "YYYY-MM-DD"));
        return None;
    };

    match NaiveDate::parse_from_str(&candidate, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            issues.push(InputIssue {
                row,
                field: "date".to_string(),
                code: "invalid_date".to_string(),
                description: format!("date must be a real YYYY-MM-DD calendar date; got \"{candidate}\""),
                expected: Some("YYYY-MM-DD".to_string()),
                received: Some(candidate),
            });
            None
        }
    }
}

fn validate_amount(row: i64, value: Option<String>, issues: &mut Vec<InputIssue>) -> Option<f64> {
    let Some(candidate) = normalize_optional(value) else {
        issues.push(missing_field(row, "amount", "positive number (e.g. 15.99)"));
        return None;
    };

    let parsed = candidate.parse::<f64>().ok().filter(|amount| amount.is_finite());
    let Some(amount) = parsed else {
        issues.push(InputIssue {
            row,
            field: "amount".to_string(),
            code: "invalid_number".to_string(),
            description: format!("amount must be numeric; got \"{candidate}\""),
            expected: Some("positive number (e.g. 15.99)".to_string()),
            received: Some(candidate),
        });
        return None;
    };

    if amount <= 0.0 {
        issues.push(InputIssue {
            row,
            field: "amount".to_string(),
            code: "non_positive_amount".to_string(),
            description: format!("amount must be greater than zero; got {candidate}"),
            expected: Some("positive number (e.g. 15.99)".to_string()),
            received: Some(candidate),
        });
        return None;
    }

    Some(amount)
}

fn missing_field(row: i64, field: &str, expected: &str) -> InputIssue {
    InputIssue {
        row,
        field: field.to_string(),
        code: "missing_required_field".to_string(),
        description: format!("{field} must be present and non-empty."),
        expected: Some(expected.to_string()),
        received: Some(String::new()),
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    let raw = value?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::validate_rows;
    use crate::error::INPUT_VALIDATION_FAILED;
    use crate::ingest::parse::ParsedRow;

    fn row(index: i64, id: Option<&str>, date: &str, amount: &str) -> ParsedRow {
        ParsedRow {
            row: index,
            id: id.map(str::to_string),
            user_id: Some("u1".to_string()),
            name: Some("Netflix".to_string()),
            date: Some(date.to_string()),
            amount: Some(amount.to_string()),
        }
    }

    #[test]
    fn missing_ids_fall_back_to_zero_based_row_index() {
        let result = validate_rows(vec![
            row(1, None, "2026-01-01", "15.99"),
            row(2, None, "2026-01-31", "15.99"),
        ]);
        assert!(result.is_ok());
        if let Ok(transactions) = result {
            assert_eq!(transactions[0].id, 0);
            assert_eq!(transactions[1].id, 1);
            assert!((transactions[1].amount - 15.99).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn collects_every_issue_before_failing() {
        let result = validate_rows(vec![
            row(1, Some("1"), "2026-02-30", "15.99"),
            row(2, Some("2"), "2026-01-31", "-3"),
            row(3, Some("abc"), "2026-01-31", "NaN"),
            row(4, Some("4"), "2026-03-01", "1.00"),
        ]);
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, INPUT_VALIDATION_FAILED);
            let data = error.data.unwrap_or_default();
            assert_eq!(data["summary"]["rows_invalid"], 3);
            assert_eq!(data["summary"]["rows_read"], 4);
            let codes = data["issues"]
                .as_array()
                .map(|issues| {
                    issues
                        .iter()
                        .filter_map(|issue| issue["code"].as_str().map(str::to_string))
                        .collect::<Vec<String>>()
                })
                .unwrap_or_default();
            assert!(codes.contains(&"invalid_date".to_string()));
            assert!(codes.contains(&"non_positive_amount".to_string()));
            assert!(codes.contains(&"invalid_id".to_string()));
            assert!(codes.contains(&"invalid_number".to_string()));
        }
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let result = validate_rows(vec![
            row(1, Some("9"), "2026-01-01", "15.99"),
            row(2, Some("9"), "2026-01-31", "15.99"),
        ]);
        assert!(result.is_err());
        if let Err(error) = result {
            let data = error.data.unwrap_or_default();
            assert_eq!(data["issues"][0]["code"], "duplicate_id");
            assert_eq!(data["issues"][0]["row"], 2);
        }
    }

    #[test]
    fn blank_required_fields_are_missing() {
        let mut blank = row(1, None, "2026-01-01", "10");
        blank.name = Some("   ".to_string());
        let result = validate_rows(vec![blank]);
        assert!(result.is_err_and(|error| {
            error
                .data
                .is_some_and(|data| data["issues"][0]["code"] == "missing_required_field")
        }));
    }
}
