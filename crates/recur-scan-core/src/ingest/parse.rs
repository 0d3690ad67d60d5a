use std::collections::HashMap;

use serde_json::Value;

use crate::{ScanError, ScanResult};

pub(crate) const REQUIRED_HEADERS: [&str; 4] = ["user_id", "name", "date", "amount"];

#[derive(Debug, Clone, Default)]
pub(crate) struct ParsedRow {
    pub(crate) row: i64,
    pub(crate) id: Option<String>,
    pub(crate) user_id: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) date: Option<String>,
    pub(crate) amount: Option<String>,
}

/// Accepts either a JSON array of transaction objects or a CSV with a header
/// row. Columns other than the transaction fields (labels, notes) are ignored.
pub(crate) fn parse_source(content: &str) -> ScanResult<Vec<ParsedRow>> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ScanError::invalid_input("Input source is empty."));
    }

    if trimmed.starts_with('[') {
        return parse_json_array(trimmed);
    }

    if trimmed.starts_with('{') {
        return Err(ScanError::invalid_input(
            "JSON input must be a top-level array of transaction objects.",
        ));
    }

    parse_csv(trimmed)
}

fn parse_json_array(content: &str) -> ScanResult<Vec<ParsedRow>> {
    let parsed = serde_json::from_str::<Value>(content)
        .map_err(|_| ScanError::invalid_input("Invalid JSON input. Provide a valid JSON array."))?;

    let Some(items) = parsed.as_array() else {
        return Err(ScanError::invalid_input(
            "JSON input must be a top-level array of transaction objects.",
        ));
    };

    let mut rows = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Some(object) = item.as_object() else {
            return Err(ScanError::invalid_input(
                "JSON array entries must all be objects with transaction fields.",
            ));
        };

        rows.push(ParsedRow {
            row: (index as i64) + 1,
            id: read_optional_string(object.get("id")),
            user_id: read_optional_string(object.get("user_id")),
            name: read_optional_string(object.get("name")),
            date: read_optional_string(object.get("date")),
            amount: read_optional_string(object.get("amount")),
        });
    }

    Ok(rows)
}

fn parse_csv(content: &str) -> ScanResult<Vec<ParsedRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|_| ScanError::invalid_input("CSV header row is missing or unreadable."))?
        .iter()
        .map(|value| value.trim().to_string())
        .collect::<Vec<String>>();

    if !REQUIRED_HEADERS
        .iter()
        .all(|required| headers.iter().any(|header| header == required))
    {
        return Err(ScanError::input_schema_mismatch(
            REQUIRED_HEADERS.iter().map(|name| name.to_string()).collect(),
            headers,
        ));
    }

    let index_by_name = headers
        .iter()
        .enumerate()
        .map(|(index, name)| (name.to_string(), index))
        .collect::<HashMap<String, usize>>();

    let mut rows = Vec::new();
    for (row_index, result_row) in reader.records().enumerate() {
        let record = result_row
            .map_err(|_| ScanError::invalid_input("CSV rows are malformed or not UTF-8."))?;

        rows.push(ParsedRow {
            row: (row_index as i64) + 1,
            id: value_for(&record, &index_by_name, "id"),
            user_id: value_for(&record, &index_by_name, "user_id"),
            name: value_for(&record, &index_by_name, "name"),
            date: value_for(&record, &index_by_name, "date"),
            amount: value_for(&record, &index_by_name, "amount"),
        });
    }

    Ok(rows)
}

fn value_for(
    record: &csv::StringRecord,
    index_by_name: &HashMap<String, usize>,
    field_name: &str,
) -> Option<String> {
    let index = index_by_name.get(field_name)?;
    let value = record.get(*index)?;
    Some(value.to_string())
}

fn read_optional_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}
