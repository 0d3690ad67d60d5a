use std::io;

use serde_json::Value;

use super::format::{self, Align, Column, format_amount, format_ratio};

pub fn render_features(data: &Value) -> io::Result<String> {
    let rows = rows_of(data, "features")?;
    if rows.is_empty() {
        return Ok("No transactions in input; no features computed.".to_string());
    }

    let recurring = rows
        .iter()
        .filter(|row| feature(row, "looks_recurring") != 0.0)
        .count();
    let mut lines = vec![
        format!(
            "Computed {} features for {} transactions in {} groups ({recurring} look recurring).",
            data.get("feature_names")
                .and_then(Value::as_array)
                .map(Vec::len)
                .unwrap_or(0),
            rows.len(),
            number(data, "group_count"),
        ),
        String::new(),
    ];

    let columns = [
        column("Id", Align::Right),
        column("User", Align::Left),
        column("Name", Align::Left),
        column("Date", Align::Left),
        column("Amount", Align::Right),
        column("Group", Align::Right),
        column("Cadence", Align::Left),
        column("Confidence", Align::Right),
        column("Recurring", Align::Left),
    ];
    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                number(row, "id").to_string(),
                text(row, "user_id"),
                text(row, "name"),
                text(row, "date"),
                format_amount(float(row, "amount")),
                format!(
                    "{}/{}",
                    feature(row, "position_in_group") as u64 + 1,
                    feature(row, "peer_group_size") as u64
                ),
                cadence_label(row).to_string(),
                format_ratio(feature(row, "cadence_confidence")),
                yes_no(feature(row, "looks_recurring") != 0.0).to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    lines.extend(format::render_table(&columns, &table_rows));
    lines.push(String::new());
    lines.push("Use --json or --csv for every feature column.".to_string());
    Ok(lines.join("\n"))
}

pub fn render_groups(data: &Value) -> io::Result<String> {
    let rows = rows_of(data, "groups")?;
    if rows.is_empty() {
        return Ok("No transactions in input; no groups found.".to_string());
    }

    let mut lines = vec![
        format!(
            "{} groups across {} transactions.",
            rows.len(),
            number(data, "transaction_count")
        ),
        String::new(),
    ];

    let columns = [
        column("User", Align::Left),
        column("Name", Align::Left),
        column("Size", Align::Right),
        column("First", Align::Left),
        column("Last", Align::Left),
        column("Cadence", Align::Left),
        column("Confidence", Align::Right),
        column("Mean", Align::Right),
        column("CV", Align::Right),
        column("Recurring", Align::Left),
    ];
    let table_rows = rows
        .iter()
        .map(|row| {
            let interval = row.get("interval").unwrap_or(&Value::Null);
            let amount = row.get("amount").unwrap_or(&Value::Null);
            vec![
                text(row, "user_id"),
                text(row, "name"),
                number(row, "size").to_string(),
                text(row, "first_date"),
                text(row, "last_date"),
                text(interval, "cadence"),
                format_ratio(float(interval, "cadence_confidence")),
                format_amount(float(amount, "mean_amount")),
                format_ratio(float(amount, "amount_cv")),
                yes_no(row.get("looks_recurring").and_then(Value::as_bool).unwrap_or(false))
                    .to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    lines.extend(format::render_table(&columns, &table_rows));
    Ok(lines.join("\n"))
}

pub fn render_policy(data: &Value) -> io::Result<String> {
    let policy = data
        .get("policy")
        .ok_or_else(|| io::Error::other("policy output requires policy"))?;

    let source = data
        .get("source")
        .and_then(Value::as_str)
        .map(|path| format!("defaults overridden by {path}"))
        .unwrap_or_else(|| "built-in defaults".to_string());

    let mut lines = vec![
        format!("Feature policy {} ({source})", text(data, "policy_version")),
        String::new(),
        "Cadence windows:".to_string(),
    ];

    let windows = ["weekly", "biweekly", "monthly", "quarterly", "annual"]
        .iter()
        .map(|name| {
            let window = policy.get(*name).unwrap_or(&Value::Null);
            (
                *name,
                format!(
                    "{} ± {} days",
                    number(window, "period_days"),
                    number(window, "tolerance_days")
                ),
            )
        })
        .collect::<Vec<(&str, String)>>();
    lines.extend(format::key_value_rows(&windows, 2));

    lines.push(String::new());
    lines.push("Thresholds:".to_string());
    let thresholds = [
        "amount_cv_threshold",
        "min_cadence_confidence",
        "same_day_tolerance",
        "consistency_abs_tolerance",
        "consistency_rel_tolerance",
        "interval_mode_tolerance_days",
        "month_interval_tolerance",
        "monthly_amount_spread",
        "similar_amount_tolerance",
        "same_amount_abs_tolerance",
    ]
    .iter()
    .map(|name| {
        (
            *name,
            policy
                .get(*name)
                .map(Value::to_string)
                .unwrap_or_else(|| "unset".to_string()),
        )
    })
    .collect::<Vec<(&str, String)>>();
    lines.extend(format::key_value_rows(&thresholds, 2));

    Ok(lines.join("\n"))
}

fn column(name: &str, align: Align) -> Column<'_> {
    Column { name, align }
}

fn rows_of<'a>(data: &'a Value, command: &str) -> io::Result<&'a Vec<Value>> {
    data.get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other(format!("{command} output requires rows")))
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

fn number(value: &Value, key: &str) -> i64 {
    value.get(key).and_then(Value::as_i64).unwrap_or(0)
}

fn float(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn feature(row: &Value, name: &str) -> f64 {
    row.get("features")
        .and_then(|features| features.get(name))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

fn cadence_label(row: &Value) -> &'static str {
    const LABELS: [(&str, &str); 7] = [
        ("cadence_is_weekly", "weekly"),
        ("cadence_is_biweekly", "biweekly"),
        ("cadence_is_monthly", "monthly"),
        ("cadence_is_quarterly", "quarterly"),
        ("cadence_is_annual", "annual"),
        ("cadence_is_irregular", "irregular"),
        ("cadence_is_insufficient", "insufficient"),
    ];
    LABELS
        .iter()
        .find(|(name, _)| feature(row, name) != 0.0)
        .map(|(_, label)| *label)
        .unwrap_or("unknown")
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
