use std::io;

use serde_json::Value;

/// One row per transaction: identity columns followed by every feature in
/// `feature_names` order.
pub fn render_features_csv(data: &Value) -> io::Result<String> {
    let names = data
        .get("feature_names")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("features output requires feature_names"))?
        .iter()
        .filter_map(Value::as_str)
        .collect::<Vec<&str>>();
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("features output requires rows"))?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["id", "user_id", "name", "date", "amount"];
    header.extend(names.iter().copied());
    writer.write_record(&header).map_err(io::Error::other)?;

    for row in rows {
        let mut record = vec![
            cell(row.get("id")),
            cell(row.get("user_id")),
            cell(row.get("name")),
            cell(row.get("date")),
            cell(row.get("amount")),
        ];
        for name in &names {
            record.push(cell(row.get("features").and_then(|features| features.get(*name))));
        }
        writer.write_record(&record).map_err(io::Error::other)?;
    }

    let bytes = writer.into_inner().map_err(|error| io::Error::other(error.to_string()))?;
    let text = String::from_utf8(bytes).map_err(io::Error::other)?;
    Ok(text.trim_end().to_string())
}

fn cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
