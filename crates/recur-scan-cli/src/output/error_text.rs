use recur_scan_core::ScanError;
use serde_json::Value;

/// Validation issues beyond this count are summarized rather than listed.
const MAX_LISTED_ISSUES: usize = 20;

pub fn render_error(error: &ScanError) -> String {
    let mut lines = vec![
        "recur-scan could not finish.".to_string(),
        String::new(),
        format!("  Error:    {}", error.code),
        format!("  Details:  {}", error.message),
    ];

    let issues = error
        .data
        .as_ref()
        .and_then(|data| data.get("issues"))
        .and_then(Value::as_array);
    if let Some(issues) = issues
        && !issues.is_empty()
    {
        lines.push(String::new());
        lines.push("Issues:".to_string());
        for issue in issues.iter().take(MAX_LISTED_ISSUES) {
            let row = issue.get("row").and_then(Value::as_i64).unwrap_or(0);
            let field = issue.get("field").and_then(Value::as_str).unwrap_or("?");
            let description = issue
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("invalid value");
            lines.push(format!("  row {row} [{field}] {description}"));
        }
        if issues.len() > MAX_LISTED_ISSUES {
            lines.push(format!("  ... and {} more", issues.len() - MAX_LISTED_ISSUES));
        }
    }

    lines.push(String::new());
    lines.push("What to do next:".to_string());
    if error.recovery_steps.is_empty() {
        lines.push("  1. Retry the command.".to_string());
    } else {
        for (index, step) in error.recovery_steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", index + 1));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use recur_scan_core::ScanError;
    use recur_scan_core::contracts::types::{InputIssue, InputSummary};

    use super::render_error;

    #[test]
    fn renders_code_details_and_steps() {
        let error = ScanError::invalid_input("Input source is empty.");
        let rendered = render_error(&error);
        assert!(rendered.contains("  Error:    invalid_input"));
        assert!(rendered.contains("  Details:  Input source is empty."));
        assert!(rendered.contains("What to do next:"));
        assert!(rendered.contains("  1. Run `recur-scan features --help`"));
    }

    #[test]
    fn lists_validation_issues_by_row() {
        let error = ScanError::input_validation_failed(
            InputSummary {
                rows_read: 2,
                rows_valid: 1,
                rows_invalid: 1,
            },
            vec![InputIssue {
                row: 2,
                field: "date".to_string(),
                code: "invalid_date".to_string(),
                description: "date must be a real YYYY-MM-DD calendar date".to_string(),
                expected: None,
                received: None,
            }],
        );
        let rendered = render_error(&error);
        assert!(rendered.contains("Issues:"));
        assert!(rendered.contains("  row 2 [date] date must be a real YYYY-MM-DD calendar date"));
    }
}
